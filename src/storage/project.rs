use std::fs;
use std::path::{Path, PathBuf};

use crate::config::CanvasConfig;
use crate::error::{CanvasError, Result};

pub const PROJECT_DIR: &str = ".usp-canvas";
const LOCAL_DIR: &str = "local";
const REMOTE_DB: &str = "remote.db";

/// On-disk layout of a usp-canvas project
#[derive(Debug, Clone)]
pub struct Project {
    dir: PathBuf,
}

impl Project {
    /// Initialize a new project under `root`
    pub fn init(root: &Path) -> Result<Self> {
        let dir = root.join(PROJECT_DIR);

        if dir.exists() {
            return Err(CanvasError::AlreadyInitialized);
        }

        fs::create_dir_all(dir.join(LOCAL_DIR))?;
        CanvasConfig::default().save(&dir)?;

        Ok(Self { dir })
    }

    /// Open an existing project under `root`
    pub fn open(root: &Path) -> Result<Self> {
        let dir = root.join(PROJECT_DIR);

        if !dir.is_dir() {
            return Err(CanvasError::NotInitialized);
        }

        Ok(Self { dir })
    }

    /// Walk up from `start` until a directory holding `.usp-canvas/` is found.
    pub fn discover(start: &Path) -> Result<Self> {
        let mut current = start;
        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Self::open(current);
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return Err(CanvasError::NotInitialized),
            }
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Directory backing the local key/value store
    pub fn local_dir(&self) -> PathBuf {
        self.dir.join(LOCAL_DIR)
    }

    /// SQLite file standing in for the remote store
    pub fn remote_db(&self) -> PathBuf {
        self.dir.join(REMOTE_DB)
    }

    pub fn config(&self) -> Result<CanvasConfig> {
        CanvasConfig::load(&self.dir)
    }
}
