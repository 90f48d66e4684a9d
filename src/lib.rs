pub mod ai;
pub mod canvas;
pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod notice;
pub mod storage;

pub use canvas::CanvasSession;
pub use config::{CanvasConfig, ConflictPolicy};
pub use error::{CanvasError, Result};
pub use storage::{CanvasPersistence, SqliteCanvasRepository};
