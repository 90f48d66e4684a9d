mod kv;
mod local;
mod persistence;
mod project;
mod repository;
mod sqlite;

pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use local::{ai_results_key, canvas_key, LocalCanvasStorage, LocalSnapshot};
pub use persistence::{CanvasPersistence, LoadSource};
pub use project::{Project, PROJECT_DIR};
pub use repository::{CanvasRepository, CanvasRow, ResultLogEntry};
pub use sqlite::SqliteCanvasRepository;
