use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const CONFIG_FILE: &str = "config.json";

/// How a remote save treats a row changed by someone else since it was loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Overwrite whatever is stored.
    #[default]
    LastWriteWins,
    /// Refuse the save when the stored version moved on.
    RejectStale,
}

impl std::fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictPolicy::LastWriteWins => write!(f, "last_write_wins"),
            ConflictPolicy::RejectStale => write!(f, "reject_stale"),
        }
    }
}

/// Project configuration, stored as `.usp-canvas/config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub conflict_policy: ConflictPolicy,
    /// Strategy used when the CLI is not given one.
    pub default_strategy: String,
    /// Fallback log filter when RUST_LOG is unset.
    pub log_filter: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            conflict_policy: ConflictPolicy::default(),
            default_strategy: "default".to_string(),
            log_filter: "warn".to_string(),
        }
    }
}

impl CanvasConfig {
    /// Load from `dir/config.json`. A missing file yields the defaults.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(dir.join(CONFIG_FILE), raw)?;
        Ok(())
    }
}
