// src/entity/history.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UspCanvas;

pub const ENTRY_TYPE_DRAFT: &str = "usp_canvas";
pub const ENTRY_TYPE_FINAL: &str = "usp_canvas_final";

/// Metadata stored alongside a saved snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMetadata {
    #[serde(rename = "type")]
    pub entry_type: String,
    pub is_final: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// One saved snapshot of a canvas. Entries are never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasHistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub data: UspCanvas,
    pub is_final: bool,
    pub metadata: HistoryMetadata,
}

impl CanvasHistoryEntry {
    pub fn new(data: UspCanvas, is_final: bool) -> Self {
        let now = Utc::now();
        let entry_type = if is_final {
            ENTRY_TYPE_FINAL
        } else {
            ENTRY_TYPE_DRAFT
        };
        Self {
            id: Uuid::new_v4(),
            timestamp: now,
            data,
            is_final,
            metadata: HistoryMetadata {
                entry_type: entry_type.to_string(),
                is_final,
                created_at: now,
                created_by: None,
            },
        }
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.metadata.created_by = author;
        self
    }
}
