//! Port for the authoritative remote canvas store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entity::{CanvasHistoryEntry, HistoryMetadata, UspCanvas};
use crate::error::{CanvasError, Result};

/// The single stored canvas row of a strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasRow {
    pub strategy_id: String,
    pub canvas: UspCanvas,
    pub updated_at: DateTime<Utc>,
    /// Incremented on every upsert, starting at 1.
    pub version: i64,
}

/// One row of the append-only result log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLogEntry {
    pub id: Uuid,
    pub strategy_id: String,
    /// Serialized canvas
    pub content: String,
    pub metadata: HistoryMetadata,
    pub created_at: DateTime<Utc>,
}

impl ResultLogEntry {
    pub fn from_history(strategy_id: &str, entry: &CanvasHistoryEntry) -> Result<Self> {
        Ok(Self {
            id: entry.id,
            strategy_id: strategy_id.to_string(),
            content: serde_json::to_string(&entry.data)?,
            metadata: entry.metadata.clone(),
            created_at: entry.timestamp,
        })
    }

    /// Rebuild the history entry; fails if `content` is not a canvas.
    pub fn to_history(&self) -> Result<CanvasHistoryEntry> {
        let data: UspCanvas = serde_json::from_str(&self.content)?;
        Ok(CanvasHistoryEntry {
            id: self.id,
            timestamp: self.created_at,
            data,
            is_final: self.metadata.is_final,
            metadata: self.metadata.clone(),
        })
    }
}

#[async_trait]
pub trait CanvasRepository: Send + Sync {
    /// Fetch the stored canvas for a strategy.
    async fn fetch_canvas(&self, strategy_id: &str) -> Result<Option<CanvasRow>>;

    /// Insert or replace the strategy's canvas and return the new version.
    ///
    /// With `expected_version` set, the write only happens when the stored
    /// version (0 when no row exists) matches; otherwise it fails with
    /// `CanvasError::VersionConflict`.
    async fn upsert_canvas(
        &self,
        strategy_id: &str,
        canvas: &UspCanvas,
        expected_version: Option<i64>,
    ) -> Result<i64>;

    async fn delete_canvas(&self, strategy_id: &str) -> Result<()>;

    /// Append to the result log. Existing entries are never touched.
    async fn append_result(&self, entry: &ResultLogEntry) -> Result<()>;

    /// All log entries of a strategy, newest first.
    async fn list_results(&self, strategy_id: &str) -> Result<Vec<ResultLogEntry>>;

    /// Store the canvas and its log entry together; returns the new version.
    ///
    /// The default runs the two writes one after the other. If the log write
    /// fails once the canvas is stored, the error is
    /// `CanvasError::HistoryNotRecorded` carrying the stored version.
    /// Adapters that can run both in one transaction override this.
    async fn save_snapshot(
        &self,
        strategy_id: &str,
        canvas: &UspCanvas,
        expected_version: Option<i64>,
        entry: &ResultLogEntry,
    ) -> Result<i64> {
        let version = self
            .upsert_canvas(strategy_id, canvas, expected_version)
            .await?;
        if let Err(e) = self.append_result(entry).await {
            return Err(CanvasError::HistoryNotRecorded {
                version,
                message: e.to_string(),
            });
        }
        Ok(version)
    }
}
