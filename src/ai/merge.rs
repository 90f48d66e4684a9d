use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::candidate::{AiCandidate, ParsedBatch};
use crate::canvas::CanvasSession;
use crate::entity::{CanvasEntry, ItemId, ItemKind, RatedItem, Rating};
use crate::notice::{Notice, Notifier};

type DedupKey = (String, Rating);

fn dedup_key(content: &str, rating: Rating) -> DedupKey {
    (content.trim().to_string(), rating)
}

/// Outcome of importing one batch of suggestions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub added: Vec<ItemId>,
    pub duplicates: usize,
    pub rejected: usize,
}

impl MergeReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
    }
}

/// Imports AI suggestions into a session, each `(content, rating)` pair at most once per category.
pub struct AiResultMerger {
    seen: HashMap<ItemKind, HashSet<DedupKey>>,
    notifier: Arc<dyn Notifier>,
}

impl AiResultMerger {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            seen: HashMap::new(),
            notifier,
        }
    }

    /// Has this pair already been imported or found on the canvas?
    pub fn has_seen(&self, kind: ItemKind, content: &str, rating: Rating) -> bool {
        self.seen
            .get(&kind)
            .is_some_and(|keys| keys.contains(&dedup_key(content, rating)))
    }

    fn remember_existing(&mut self, session: &CanvasSession) {
        fn collect<T: RatedItem>(items: &[T]) -> impl Iterator<Item = DedupKey> + '_ {
            items.iter().map(|item| dedup_key(item.content(), item.rating()))
        }

        let canvas = session.canvas();
        self.seen
            .entry(ItemKind::Job)
            .or_default()
            .extend(collect(&canvas.customer_jobs));
        self.seen
            .entry(ItemKind::Pain)
            .or_default()
            .extend(collect(&canvas.customer_pains));
        self.seen
            .entry(ItemKind::Gain)
            .or_default()
            .extend(collect(&canvas.customer_gains));
    }

    /// Add every candidate not already present as an AI-generated item.
    pub fn merge(&mut self, session: &mut CanvasSession, batch: ParsedBatch) -> MergeReport {
        self.remember_existing(session);

        let mut report = MergeReport {
            rejected: batch.rejected,
            ..MergeReport::default()
        };

        for candidate in batch.candidates {
            let kind = candidate.kind();
            let key = dedup_key(candidate.content(), candidate.rating());
            if !self.seen.entry(kind).or_default().insert(key) {
                report.duplicates += 1;
                continue;
            }

            let content = candidate.content().trim().to_string();
            if let Some(id) = session.add_rated(kind, content, candidate.rating(), true) {
                report.added.push(id);
            }
        }

        tracing::info!(
            strategy_id = %session.strategy_id(),
            added = report.added.len(),
            duplicates = report.duplicates,
            rejected = report.rejected,
            "merged AI suggestions"
        );

        if report.is_empty() {
            self.notifier.notify(Notice::AlreadyAdded);
        } else {
            self.notifier.notify(Notice::Imported {
                count: report.added.len(),
            });
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::RecordingNotifier;

    fn job(content: &str, priority: Rating) -> AiCandidate {
        AiCandidate::Job {
            content: content.to_string(),
            priority,
        }
    }

    fn batch(candidates: Vec<AiCandidate>) -> ParsedBatch {
        ParsedBatch {
            candidates,
            rejected: 0,
        }
    }

    fn merger() -> (AiResultMerger, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        (AiResultMerger::new(notifier.clone()), notifier)
    }

    #[test]
    fn test_manual_item_blocks_identical_suggestion() {
        let (mut merger, notifier) = merger();
        let mut session = CanvasSession::new("s1");
        session.add_job("Book a flight".to_string(), Rating::High, false);

        let report = merger.merge(&mut session, batch(vec![job("Book a flight", Rating::High)]));

        assert!(report.is_empty());
        assert_eq!(report.duplicates, 1);
        assert_eq!(session.canvas().customer_jobs.len(), 1);
        assert!(!session.canvas().customer_jobs[0].is_ai_generated);
        assert_eq!(notifier.last(), Some(Notice::AlreadyAdded));
    }

    #[test]
    fn test_same_content_different_rating_is_distinct() {
        let (mut merger, _notifier) = merger();
        let mut session = CanvasSession::new("s1");
        session.add_job("Book a flight".to_string(), Rating::High, false);

        let report = merger.merge(&mut session, batch(vec![job("Book a flight", Rating::Low)]));
        assert_eq!(report.added.len(), 1);
        assert_eq!(session.canvas().customer_jobs.len(), 2);
    }

    #[test]
    fn test_overlapping_batches_in_either_order() {
        let first = vec![job("a", Rating::High), job("b", Rating::Low)];
        let second = vec![job("b", Rating::Low), job("c", Rating::Medium), job("a ", Rating::High)];

        for (one, two) in [(first.clone(), second.clone()), (second, first)] {
            let (mut merger, _notifier) = merger();
            let mut session = CanvasSession::new("s1");
            merger.merge(&mut session, batch(one));
            merger.merge(&mut session, batch(two));

            let mut pairs: Vec<(String, Rating)> = session
                .canvas()
                .customer_jobs
                .iter()
                .map(|j| (j.content.clone(), j.priority))
                .collect();
            pairs.sort_by(|x, y| x.0.cmp(&y.0));
            assert_eq!(
                pairs,
                vec![
                    ("a".to_string(), Rating::High),
                    ("b".to_string(), Rating::Low),
                    ("c".to_string(), Rating::Medium),
                ]
            );
            assert!(session.canvas().customer_jobs.iter().all(|j| j.is_ai_generated));
        }
    }

    #[test]
    fn test_duplicates_within_one_batch() {
        let (mut merger, notifier) = merger();
        let mut session = CanvasSession::new("s1");
        let report = merger.merge(
            &mut session,
            batch(vec![job("a", Rating::High), job("a", Rating::High)]),
        );
        assert_eq!(report.added.len(), 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(notifier.last(), Some(Notice::Imported { count: 1 }));
    }

    #[test]
    fn test_categories_are_deduped_separately() {
        let (mut merger, _notifier) = merger();
        let mut session = CanvasSession::new("s1");
        let report = merger.merge(
            &mut session,
            batch(vec![
                job("Waiting", Rating::High),
                AiCandidate::Pain {
                    content: "Waiting".to_string(),
                    severity: Rating::High,
                },
            ]),
        );
        assert_eq!(report.added.len(), 2);
        assert!(merger.has_seen(ItemKind::Pain, "Waiting", Rating::High));
        assert!(!merger.has_seen(ItemKind::Gain, "Waiting", Rating::High));
    }

    #[test]
    fn test_deleted_item_stays_seen() {
        let (mut merger, _notifier) = merger();
        let mut session = CanvasSession::new("s1");
        let report = merger.merge(&mut session, batch(vec![job("a", Rating::High)]));
        session.delete_job(&report.added[0]);

        let again = merger.merge(&mut session, batch(vec![job("a", Rating::High)]));
        assert!(again.is_empty());
        assert!(session.canvas().customer_jobs.is_empty());
    }

    #[test]
    fn test_rejected_count_is_carried() {
        let (mut merger, notifier) = merger();
        let mut session = CanvasSession::new("s1");
        let report = merger.merge(
            &mut session,
            ParsedBatch {
                candidates: Vec::new(),
                rejected: 3,
            },
        );
        assert_eq!(report.rejected, 3);
        assert_eq!(notifier.last(), Some(Notice::AlreadyAdded));
    }
}
