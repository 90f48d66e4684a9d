//! Advisory local mirror of a canvas.
//!
//! Every failure here is logged and swallowed: the local copy is never
//! authoritative, so a bad write or unreadable payload must not disturb the
//! in-memory canvas.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::kv::KeyValueStore;
use crate::entity::{CanvasHistoryEntry, UspCanvas};

const KEY_PREFIX: &str = "usp_canvas_";

/// Local storage key for a strategy's canvas
pub fn canvas_key(strategy_id: &str) -> String {
    format!("{}{}", KEY_PREFIX, strategy_id)
}

/// Local storage key for a strategy's cached AI results
pub fn ai_results_key(strategy_id: &str) -> String {
    format!("{}{}_ai_results", KEY_PREFIX, strategy_id)
}

/// Payload stored under [`canvas_key`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSnapshot {
    pub canvas: UspCanvas,
    #[serde(default)]
    pub history: Vec<CanvasHistoryEntry>,
}

#[derive(Clone)]
pub struct LocalCanvasStorage {
    store: Arc<dyn KeyValueStore>,
}

impl LocalCanvasStorage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    /// Read the mirrored snapshot. Missing or unreadable data yields `None`.
    pub fn load(&self, strategy_id: &str) -> Option<LocalSnapshot> {
        let key = canvas_key(strategy_id);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(%key, error = %e, "failed to read local canvas");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(%key, error = %e, "ignoring unparsable local canvas");
                None
            }
        }
    }

    /// Mirror a snapshot. Returns whether the write happened.
    pub fn save(
        &self,
        strategy_id: &str,
        canvas: &UspCanvas,
        history: &[CanvasHistoryEntry],
    ) -> bool {
        #[derive(Serialize)]
        struct Payload<'a> {
            canvas: &'a UspCanvas,
            history: &'a [CanvasHistoryEntry],
        }

        let key = canvas_key(strategy_id);
        let raw = match serde_json::to_string(&Payload { canvas, history }) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(%key, error = %e, "failed to serialize local canvas");
                return false;
            }
        };

        match self.store.set(&key, &raw) {
            Ok(()) => {
                tracing::debug!(%key, bytes = raw.len(), "mirrored canvas locally");
                true
            }
            Err(e) => {
                tracing::warn!(%key, error = %e, "failed to write local canvas");
                false
            }
        }
    }

    pub fn clear(&self, strategy_id: &str) {
        let key = canvas_key(strategy_id);
        if let Err(e) = self.store.remove(&key) {
            tracing::warn!(%key, error = %e, "failed to clear local canvas");
        }
    }
}
