//! Last generation result per strategy, kept in the local store so a
//! reload does not need another generation call.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::wire::GenerationResponse;
use crate::storage::{ai_results_key, KeyValueStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedAiResults {
    pub data: Value,
    #[serde(default, rename = "debugInfo")]
    pub debug_info: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AiResultCache {
    store: Arc<dyn KeyValueStore>,
}

impl AiResultCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Cache a successful response. Responses without data are ignored.
    pub fn store(&self, strategy_id: &str, response: &GenerationResponse) -> bool {
        let Some(data) = response.data.clone().filter(|d| !d.is_null()) else {
            return false;
        };
        let entry = CachedAiResults {
            data,
            debug_info: response.debug_info.clone(),
            timestamp: Utc::now(),
        };

        let key = ai_results_key(strategy_id);
        let written = serde_json::to_string(&entry)
            .map_err(crate::error::CanvasError::from)
            .and_then(|raw| self.store.set(&key, &raw));
        match written {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(%key, error = %e, "failed to cache AI results");
                false
            }
        }
    }

    pub fn load(&self, strategy_id: &str) -> Option<CachedAiResults> {
        let key = ai_results_key(strategy_id);
        let raw = match self.store.get(&key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(%key, error = %e, "failed to read cached AI results");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(%key, error = %e, "ignoring unparsable cached AI results");
                None
            }
        }
    }

    pub fn clear(&self, strategy_id: &str) {
        let key = ai_results_key(strategy_id);
        if let Err(e) = self.store.remove(&key) {
            tracing::warn!(%key, error = %e, "failed to clear cached AI results");
        }
    }
}
