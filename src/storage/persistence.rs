//! Saving and loading a [`CanvasSession`] against the remote store.
//!
//! Nothing here returns an error. Outcomes are a `bool` or a value plus a
//! [`Notice`]; failures leave the session unsaved so the caller can retry.

use std::sync::Arc;

use super::local::LocalSnapshot;
use super::repository::{CanvasRepository, ResultLogEntry};
use crate::canvas::CanvasSession;
use crate::config::ConflictPolicy;
use crate::entity::CanvasHistoryEntry;
use crate::error::{CanvasError, Result};
use crate::notice::{Notice, Notifier};

/// Where [`CanvasPersistence::load`] found the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Unsaved edits from the local mirror
    Local,
    /// The stored remote row
    Remote,
    /// Nothing stored anywhere
    Empty,
}

pub struct CanvasPersistence {
    repository: Arc<dyn CanvasRepository>,
    notifier: Arc<dyn Notifier>,
    policy: ConflictPolicy,
    author: Option<String>,
}

impl CanvasPersistence {
    pub fn new(repository: Arc<dyn CanvasRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository,
            notifier,
            policy: ConflictPolicy::default(),
            author: None,
        }
    }

    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Name recorded in the metadata of saved snapshots.
    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }

    /// Fill `session` from storage.
    ///
    /// The local mirror wins when it has a snapshot, since it carries edits
    /// not yet saved remotely. The remote row's version is always adopted.
    pub async fn load(&self, session: &mut CanvasSession) -> LoadSource {
        let strategy_id = session.strategy_id().to_string();

        let remote = match self.repository.fetch_canvas(&strategy_id).await {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(%strategy_id, error = %e, "failed to load remote canvas");
                self.notifier.notify(Notice::LoadFailed {
                    message: e.to_string(),
                });
                None
            }
        };
        let local = session.mirror().and_then(|mirror| mirror.load(&strategy_id));
        let version = remote.as_ref().map(|row| row.version).unwrap_or(0);

        match (local, remote) {
            (Some(snapshot), remote) => {
                let is_saved = match &remote {
                    Some(row) => row.canvas == snapshot.canvas,
                    None => snapshot.canvas.is_empty(),
                };
                session.restore(snapshot, version, is_saved);
                tracing::debug!(%strategy_id, is_saved, "loaded canvas from local mirror");
                LoadSource::Local
            }
            (None, Some(row)) => {
                session.restore(
                    LocalSnapshot {
                        canvas: row.canvas,
                        history: Vec::new(),
                    },
                    version,
                    true,
                );
                session.mirror_snapshot();
                tracing::debug!(%strategy_id, version, "loaded canvas from remote store");
                LoadSource::Remote
            }
            (None, None) => {
                session.restore(LocalSnapshot::default(), version, true);
                LoadSource::Empty
            }
        }
    }

    /// Save a draft: upsert the canvas row and append a log entry.
    pub async fn save_canvas(&self, session: &mut CanvasSession) -> bool {
        match self.write(session, false).await {
            Ok(()) => {
                self.notifier.notify(Notice::Saved);
                true
            }
            Err(e) => self.save_failed(session, e),
        }
    }

    /// Save the authoritative final version.
    ///
    /// Refused without touching the remote store when the customer profile
    /// has no jobs, pains or gains.
    pub async fn save_final_version(&self, session: &mut CanvasSession) -> bool {
        if session.canvas().is_profile_empty() {
            tracing::info!(
                strategy_id = %session.strategy_id(),
                "refusing to save empty final canvas"
            );
            self.notifier.notify(Notice::EmptyCanvas);
            return false;
        }

        match self.write(session, true).await {
            Ok(()) => {
                self.notifier.notify(Notice::FinalSaved);
                true
            }
            Err(e) => self.save_failed(session, e),
        }
    }

    /// Every saved snapshot of a strategy, newest first.
    pub async fn history(&self, strategy_id: &str) -> Vec<CanvasHistoryEntry> {
        let rows = match self.repository.list_results(strategy_id).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(%strategy_id, error = %e, "failed to load canvas history");
                self.notifier.notify(Notice::LoadFailed {
                    message: e.to_string(),
                });
                return Vec::new();
            }
        };

        rows.iter()
            .filter_map(|row| match row.to_history() {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(id = %row.id, error = %e, "skipping unreadable history entry");
                    None
                }
            })
            .collect()
    }

    /// Empty the canvas and its local copy. With `discard_remote` the stored
    /// row is deleted too; the result log is kept.
    pub async fn reset(&self, session: &mut CanvasSession, discard_remote: bool) -> bool {
        session.reset();
        if !discard_remote {
            return true;
        }

        match self.repository.delete_canvas(session.strategy_id()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    strategy_id = %session.strategy_id(),
                    error = %e,
                    "failed to delete remote canvas"
                );
                false
            }
        }
    }

    async fn write(&self, session: &mut CanvasSession, is_final: bool) -> Result<()> {
        let strategy_id = session.strategy_id().to_string();
        let expected = match self.policy {
            ConflictPolicy::LastWriteWins => None,
            ConflictPolicy::RejectStale => Some(session.version()),
        };

        let entry = CanvasHistoryEntry::new(session.canvas().clone(), is_final)
            .with_author(self.author.clone());
        let log_entry = ResultLogEntry::from_history(&strategy_id, &entry)?;

        let saved = self
            .repository
            .save_snapshot(&strategy_id, session.canvas(), expected, &log_entry)
            .await;
        let version = match saved {
            Ok(version) => version,
            Err(e) => {
                // The row moved on even though the save as a whole failed.
                if let CanvasError::HistoryNotRecorded { version, .. } = &e {
                    session.adopt_version(*version);
                }
                return Err(e);
            }
        };

        tracing::info!(%strategy_id, version, is_final, "canvas saved");
        session.mark_saved(version, entry);
        Ok(())
    }

    fn save_failed(&self, session: &CanvasSession, error: CanvasError) -> bool {
        tracing::warn!(
            strategy_id = %session.strategy_id(),
            error = %error,
            "failed to save canvas"
        );
        self.notifier.notify(Notice::SaveFailed {
            message: error.to_string(),
        });
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Rating, UspCanvas};
    use crate::notice::RecordingNotifier;
    use crate::storage::{
        CanvasRow, LocalCanvasStorage, MemoryKeyValueStore, SqliteCanvasRepository,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Remote store that is always unreachable, counting attempted writes.
    #[derive(Default)]
    struct OfflineRepository {
        writes: AtomicUsize,
    }

    #[async_trait]
    impl CanvasRepository for OfflineRepository {
        async fn fetch_canvas(&self, _strategy_id: &str) -> Result<Option<CanvasRow>> {
            Err(CanvasError::Storage("network unreachable".to_string()))
        }

        async fn upsert_canvas(
            &self,
            _strategy_id: &str,
            _canvas: &UspCanvas,
            _expected_version: Option<i64>,
        ) -> Result<i64> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Err(CanvasError::Storage("network unreachable".to_string()))
        }

        async fn delete_canvas(&self, _strategy_id: &str) -> Result<()> {
            Err(CanvasError::Storage("network unreachable".to_string()))
        }

        async fn append_result(&self, _entry: &ResultLogEntry) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Err(CanvasError::Storage("network unreachable".to_string()))
        }

        async fn list_results(&self, _strategy_id: &str) -> Result<Vec<ResultLogEntry>> {
            Err(CanvasError::Storage("network unreachable".to_string()))
        }
    }

    /// SQLite store whose next log insert fails.
    struct FlakyLogRepository {
        inner: SqliteCanvasRepository,
        fail_next_append: AtomicBool,
    }

    impl FlakyLogRepository {
        fn new() -> Self {
            Self {
                inner: SqliteCanvasRepository::in_memory().unwrap(),
                fail_next_append: AtomicBool::new(true),
            }
        }
    }

    #[async_trait]
    impl CanvasRepository for FlakyLogRepository {
        async fn fetch_canvas(&self, strategy_id: &str) -> Result<Option<CanvasRow>> {
            self.inner.fetch_canvas(strategy_id).await
        }

        async fn upsert_canvas(
            &self,
            strategy_id: &str,
            canvas: &UspCanvas,
            expected_version: Option<i64>,
        ) -> Result<i64> {
            self.inner
                .upsert_canvas(strategy_id, canvas, expected_version)
                .await
        }

        async fn delete_canvas(&self, strategy_id: &str) -> Result<()> {
            self.inner.delete_canvas(strategy_id).await
        }

        async fn append_result(&self, entry: &ResultLogEntry) -> Result<()> {
            if self.fail_next_append.swap(false, Ordering::SeqCst) {
                return Err(CanvasError::Storage("log table locked".to_string()));
            }
            self.inner.append_result(entry).await
        }

        async fn list_results(&self, strategy_id: &str) -> Result<Vec<ResultLogEntry>> {
            self.inner.list_results(strategy_id).await
        }
    }

    fn setup() -> (CanvasPersistence, Arc<SqliteCanvasRepository>, Arc<RecordingNotifier>) {
        let repo = Arc::new(SqliteCanvasRepository::in_memory().unwrap());
        let notifier = Arc::new(RecordingNotifier::new());
        let persistence = CanvasPersistence::new(repo.clone(), notifier.clone());
        (persistence, repo, notifier)
    }

    #[tokio::test]
    async fn test_save_canvas_writes_row_and_log() {
        let (persistence, repo, notifier) = setup();
        let mut session = CanvasSession::new("s1");
        session.add_job("Book a flight".to_string(), Rating::High, false);

        assert!(persistence.save_canvas(&mut session).await);
        assert!(session.is_saved());
        assert_eq!(session.version(), 1);
        assert_eq!(notifier.last(), Some(Notice::Saved));

        let row = repo.fetch_canvas("s1").await.unwrap().unwrap();
        assert_eq!(&row.canvas, session.canvas());

        let log = repo.list_results("s1").await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].metadata.entry_type, "usp_canvas");
        assert!(!log[0].metadata.is_final);
    }

    #[tokio::test]
    async fn test_final_save_of_empty_profile_is_refused() {
        let repo = Arc::new(OfflineRepository::default());
        let notifier = Arc::new(RecordingNotifier::new());
        let persistence = CanvasPersistence::new(repo.clone(), notifier.clone());

        let mut session = CanvasSession::new("s1");
        session.add_service("Fare search".to_string(), Vec::new(), false);

        assert!(!persistence.save_final_version(&mut session).await);
        assert_eq!(repo.writes.load(Ordering::SeqCst), 0);
        assert_eq!(notifier.last(), Some(Notice::EmptyCanvas));
        assert!(!session.is_saved());
    }

    #[tokio::test]
    async fn test_final_save_tags_log_entry() {
        let (persistence, repo, notifier) = setup();
        let mut session = CanvasSession::new("s1");
        session.add_gain("Peace of mind".to_string(), Rating::High, false);

        assert!(persistence.save_final_version(&mut session).await);
        assert_eq!(notifier.last(), Some(Notice::FinalSaved));

        let history = persistence.history("s1").await;
        assert_eq!(history.len(), 1);
        assert!(history[0].is_final);
        assert_eq!(history[0].metadata.entry_type, "usp_canvas_final");
        assert!(repo.fetch_canvas("s1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_save_leaves_session_dirty() {
        let notifier = Arc::new(RecordingNotifier::new());
        let persistence =
            CanvasPersistence::new(Arc::new(OfflineRepository::default()), notifier.clone());
        let mut session = CanvasSession::new("s1");
        session.add_pain("Hidden fees".to_string(), Rating::High, false);

        assert!(!persistence.save_canvas(&mut session).await);
        assert!(!session.is_saved());
        assert!(session.history().is_empty());
        assert!(matches!(notifier.last(), Some(Notice::SaveFailed { .. })));
    }

    #[tokio::test]
    async fn test_history_is_newest_first() {
        let (persistence, _repo, _notifier) = setup();
        let mut session = CanvasSession::new("s1");
        session.add_job("a".to_string(), Rating::Low, false);
        persistence.save_canvas(&mut session).await;
        session.add_job("b".to_string(), Rating::Low, false);
        persistence.save_final_version(&mut session).await;

        let history = persistence.history("s1").await;
        assert_eq!(history.len(), 2);
        assert!(history[0].is_final);
        assert_eq!(history[0].data.customer_jobs.len(), 2);
        assert_eq!(history[1].data.customer_jobs.len(), 1);
        assert_eq!(session.history()[0].id, history[0].id);
    }

    #[tokio::test]
    async fn test_history_failure_yields_empty_list() {
        let notifier = Arc::new(RecordingNotifier::new());
        let persistence =
            CanvasPersistence::new(Arc::new(OfflineRepository::default()), notifier.clone());
        assert!(persistence.history("s1").await.is_empty());
        assert!(matches!(notifier.last(), Some(Notice::LoadFailed { .. })));
    }

    #[tokio::test]
    async fn test_load_prefers_local_mirror() {
        let (persistence, _repo, _notifier) = setup();
        let mirror = LocalCanvasStorage::new(Arc::new(MemoryKeyValueStore::new()));

        let mut first = CanvasSession::new("s1").with_mirror(mirror.clone());
        first.add_job("saved".to_string(), Rating::Low, false);
        persistence.save_canvas(&mut first).await;
        first.add_job("unsaved".to_string(), Rating::Low, false);

        let mut second = CanvasSession::new("s1").with_mirror(mirror);
        assert_eq!(persistence.load(&mut second).await, LoadSource::Local);
        assert_eq!(second.canvas(), first.canvas());
        assert!(!second.is_saved());
        assert_eq!(second.version(), 1);
        assert_eq!(second.history().len(), 1);
    }

    #[tokio::test]
    async fn test_load_falls_back_to_remote() {
        let (persistence, _repo, _notifier) = setup();
        let mut first = CanvasSession::new("s1");
        first.add_pain("Hidden fees".to_string(), Rating::High, false);
        persistence.save_canvas(&mut first).await;

        let mirror = LocalCanvasStorage::new(Arc::new(MemoryKeyValueStore::new()));
        let mut second = CanvasSession::new("s1").with_mirror(mirror.clone());
        assert_eq!(persistence.load(&mut second).await, LoadSource::Remote);
        assert_eq!(second.canvas(), first.canvas());
        assert!(second.is_saved());
        // The remote copy is mirrored for the next load
        assert_eq!(&mirror.load("s1").unwrap().canvas, first.canvas());
    }

    #[tokio::test]
    async fn test_load_with_remote_down_uses_local() {
        let notifier = Arc::new(RecordingNotifier::new());
        let persistence =
            CanvasPersistence::new(Arc::new(OfflineRepository::default()), notifier.clone());
        let mirror = LocalCanvasStorage::new(Arc::new(MemoryKeyValueStore::new()));

        let mut first = CanvasSession::new("s1").with_mirror(mirror.clone());
        first.add_gain("Save time".to_string(), Rating::Medium, false);

        let mut second = CanvasSession::new("s1").with_mirror(mirror);
        assert_eq!(persistence.load(&mut second).await, LoadSource::Local);
        assert_eq!(second.canvas(), first.canvas());
        assert!(matches!(notifier.notices()[0], Notice::LoadFailed { .. }));
    }

    #[tokio::test]
    async fn test_load_nothing_stored() {
        let (persistence, _repo, _notifier) = setup();
        let mut session = CanvasSession::new("fresh");
        assert_eq!(persistence.load(&mut session).await, LoadSource::Empty);
        assert!(session.canvas().is_empty());
        assert!(session.is_saved());
    }

    #[tokio::test]
    async fn test_reject_stale_policy() {
        let repo = Arc::new(SqliteCanvasRepository::in_memory().unwrap());
        let notifier = Arc::new(RecordingNotifier::new());
        let persistence = CanvasPersistence::new(repo.clone(), notifier.clone())
            .with_policy(ConflictPolicy::RejectStale);

        let mut tab_a = CanvasSession::new("s1");
        let mut tab_b = CanvasSession::new("s1");
        persistence.load(&mut tab_a).await;
        persistence.load(&mut tab_b).await;

        tab_a.add_job("from a".to_string(), Rating::Low, false);
        assert!(persistence.save_canvas(&mut tab_a).await);

        tab_b.add_job("from b".to_string(), Rating::Low, false);
        assert!(!persistence.save_canvas(&mut tab_b).await);
        assert!(!tab_b.is_saved());
        match notifier.last() {
            Some(Notice::SaveFailed { message }) => assert!(message.contains("Version conflict")),
            other => panic!("expected save failure, got {:?}", other),
        }

        let row = repo.fetch_canvas("s1").await.unwrap().unwrap();
        assert_eq!(row.canvas.customer_jobs[0].content, "from a");
    }

    #[tokio::test]
    async fn test_last_write_wins_policy() {
        let (persistence, repo, _notifier) = setup();
        let mut tab_a = CanvasSession::new("s1");
        let mut tab_b = CanvasSession::new("s1");

        tab_a.add_job("from a".to_string(), Rating::Low, false);
        persistence.save_canvas(&mut tab_a).await;
        tab_b.add_job("from b".to_string(), Rating::Low, false);
        assert!(persistence.save_canvas(&mut tab_b).await);

        let row = repo.fetch_canvas("s1").await.unwrap().unwrap();
        assert_eq!(row.canvas.customer_jobs[0].content, "from b");
        assert_eq!(row.version, 2);
    }

    #[tokio::test]
    async fn test_reset_with_remote_discard() {
        let (persistence, repo, _notifier) = setup();
        let mut session = CanvasSession::new("s1");
        session.add_job("a".to_string(), Rating::Low, false);
        persistence.save_canvas(&mut session).await;

        assert!(persistence.reset(&mut session, true).await);
        assert!(session.canvas().is_empty());
        assert!(repo.fetch_canvas("s1").await.unwrap().is_none());
        // The log is append-only
        assert_eq!(repo.list_results("s1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_author_recorded_in_metadata() {
        let (persistence, _repo, _notifier) = setup();
        let persistence = persistence.with_author(Some("Dana".to_string()));
        let mut session = CanvasSession::new("s1");
        session.add_job("a".to_string(), Rating::Low, false);
        persistence.save_canvas(&mut session).await;

        let history = persistence.history("s1").await;
        assert_eq!(history[0].metadata.created_by.as_deref(), Some("Dana"));
    }

    #[tokio::test]
    async fn test_retry_after_log_failure_succeeds_under_reject_stale() {
        let repo = Arc::new(FlakyLogRepository::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let persistence = CanvasPersistence::new(repo.clone(), notifier.clone())
            .with_policy(ConflictPolicy::RejectStale);
        let mut session = CanvasSession::new("s1");
        session.add_job("Book a flight".to_string(), Rating::High, false);

        assert!(!persistence.save_canvas(&mut session).await);
        assert!(!session.is_saved());
        assert!(session.history().is_empty());
        assert!(matches!(notifier.last(), Some(Notice::SaveFailed { .. })));
        // The row was stored, and the session knows its version
        let row = repo.fetch_canvas("s1").await.unwrap().unwrap();
        assert_eq!(row.version, 1);
        assert_eq!(session.version(), 1);

        assert!(persistence.save_canvas(&mut session).await);
        assert!(session.is_saved());
        assert_eq!(session.version(), 2);
        assert_eq!(persistence.history("s1").await.len(), 1);
    }
}
