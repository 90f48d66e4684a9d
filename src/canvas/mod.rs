//! In-memory canvas editing.
//!
//! A [`CanvasSession`] owns one strategy's canvas. The add/update/delete/
//! reorder operations live in `profile.rs` (jobs, pains, gains) and
//! `value_map.rs` (services, relievers, creators). None of them fail:
//! unknown ids are ignored. Every change marks the session unsaved and,
//! when a local mirror is attached, writes the snapshot through to it.

mod items;
mod profile;
pub mod relations;
mod value_map;

use crate::entity::{CanvasHistoryEntry, CanvasItem, ItemId, ItemKind, UspCanvas};
use crate::storage::{LocalCanvasStorage, LocalSnapshot};

pub struct CanvasSession {
    strategy_id: String,
    canvas: UspCanvas,
    history: Vec<CanvasHistoryEntry>,
    is_saved: bool,
    version: i64,
    mirror: Option<LocalCanvasStorage>,
}

impl CanvasSession {
    /// Empty canvas for a strategy, with nothing to save.
    pub fn new(strategy_id: impl Into<String>) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            canvas: UspCanvas::new(),
            history: Vec::new(),
            is_saved: true,
            version: 0,
            mirror: None,
        }
    }

    /// Write every change through to `mirror`.
    pub fn with_mirror(mut self, mirror: LocalCanvasStorage) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn strategy_id(&self) -> &str {
        &self.strategy_id
    }

    pub fn canvas(&self) -> &UspCanvas {
        &self.canvas
    }

    /// Snapshots saved from this session, newest first.
    pub fn history(&self) -> &[CanvasHistoryEntry] {
        &self.history
    }

    /// False after any change that has not reached the remote store.
    pub fn is_saved(&self) -> bool {
        self.is_saved
    }

    /// Remote row version this session last saw (0 when never stored).
    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn mirror(&self) -> Option<&LocalCanvasStorage> {
        self.mirror.as_ref()
    }

    pub fn items(&self, kind: ItemKind) -> Vec<CanvasItem> {
        self.canvas.items(kind)
    }

    pub fn find(&self, id: &ItemId) -> Option<CanvasItem> {
        self.canvas.find(id)
    }

    /// Delete an item of any category.
    pub fn delete_item(&mut self, kind: ItemKind, id: &ItemId) -> bool {
        match kind {
            ItemKind::Job => self.delete_job(id),
            ItemKind::Pain => self.delete_pain(id),
            ItemKind::Gain => self.delete_gain(id),
            ItemKind::Service => self.delete_service(id),
            ItemKind::Reliever => self.delete_reliever(id),
            ItemKind::Creator => self.delete_creator(id),
        }
    }

    /// Empty the canvas and drop the local mirror's copy.
    pub fn reset(&mut self) {
        self.canvas = UspCanvas::new();
        self.history.clear();
        self.is_saved = false;
        if let Some(mirror) = &self.mirror {
            mirror.clear(&self.strategy_id);
        }
        tracing::debug!(strategy_id = %self.strategy_id, "canvas reset");
    }

    /// Install a canvas read from storage.
    pub fn restore(&mut self, snapshot: LocalSnapshot, version: i64, is_saved: bool) {
        self.canvas = snapshot.canvas;
        self.history = snapshot.history;
        self.version = version;
        self.is_saved = is_saved;
        let pruned = relations::prune_dangling(&mut self.canvas);
        if pruned > 0 {
            tracing::debug!(strategy_id = %self.strategy_id, pruned, "dropped dangling links");
        }
    }

    /// Record a successful remote save.
    pub fn mark_saved(&mut self, version: i64, entry: CanvasHistoryEntry) {
        self.version = version;
        self.history.insert(0, entry);
        self.is_saved = true;
        self.mirror_snapshot();
    }

    /// Take on a stored version without marking the session saved.
    pub(crate) fn adopt_version(&mut self, version: i64) {
        self.version = version;
    }

    /// Write the current state to the local mirror, if any.
    pub fn mirror_snapshot(&self) -> bool {
        match &self.mirror {
            Some(mirror) => mirror.save(&self.strategy_id, &self.canvas, &self.history),
            None => false,
        }
    }

    fn touch(&mut self) {
        self.is_saved = false;
        self.mirror_snapshot();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Rating;
    use crate::storage::MemoryKeyValueStore;
    use std::sync::Arc;

    fn mirrored() -> (CanvasSession, LocalCanvasStorage) {
        let mirror = LocalCanvasStorage::new(Arc::new(MemoryKeyValueStore::new()));
        let session = CanvasSession::new("s1").with_mirror(mirror.clone());
        (session, mirror)
    }

    #[test]
    fn test_new_session_is_saved_and_empty() {
        let session = CanvasSession::new("s1");
        assert!(session.is_saved());
        assert!(session.canvas().is_empty());
        assert_eq!(session.version(), 0);
        assert!(!session.mirror_snapshot());
    }

    #[test]
    fn test_mutation_mirrors_locally() {
        let (mut session, mirror) = mirrored();
        session.add_job("Book a flight".to_string(), Rating::High, false);
        assert!(!session.is_saved());

        let stored = mirror.load("s1").unwrap();
        assert_eq!(&stored.canvas, session.canvas());
    }

    #[test]
    fn test_reset_clears_mirror() {
        let (mut session, mirror) = mirrored();
        session.add_pain("Hidden fees".to_string(), Rating::Medium, false);
        session.reset();
        assert!(session.canvas().is_empty());
        assert!(mirror.load("s1").is_none());
    }

    #[test]
    fn test_delete_item_dispatches_on_kind() {
        let mut session = CanvasSession::new("s1");
        let gain = session.add_gain("Save time".to_string(), Rating::Low, false);
        assert!(!session.delete_item(ItemKind::Job, &gain.id));
        assert!(session.delete_item(ItemKind::Gain, &gain.id));
        assert!(session.canvas().customer_gains.is_empty());
    }

    #[test]
    fn test_mark_saved_prepends_history() {
        let mut session = CanvasSession::new("s1");
        session.add_job("a".to_string(), Rating::Low, false);
        let first = CanvasHistoryEntry::new(session.canvas().clone(), false);
        let second = CanvasHistoryEntry::new(session.canvas().clone(), true);
        session.mark_saved(1, first.clone());
        session.mark_saved(2, second.clone());

        assert!(session.is_saved());
        assert_eq!(session.version(), 2);
        assert_eq!(session.history()[0].id, second.id);
        assert_eq!(session.history()[1].id, first.id);
    }

    #[test]
    fn test_restore_prunes_dangling_links() {
        let mut canvas = UspCanvas::new();
        canvas.product_services.push(crate::entity::ProductService::new(
            "Fare alerts".to_string(),
            vec![ItemId::from("deleted-job")],
            false,
        ));
        let mut session = CanvasSession::new("s1");
        session.restore(
            LocalSnapshot {
                canvas,
                history: Vec::new(),
            },
            3,
            true,
        );
        assert!(session.canvas().product_services[0].related_job_ids.is_empty());
        assert_eq!(session.version(), 3);
    }
}
