mod canvas;
mod history;
mod item;
mod profile;
mod rating;
mod value_map;

pub use canvas::UspCanvas;
pub use history::{CanvasHistoryEntry, HistoryMetadata, ENTRY_TYPE_DRAFT, ENTRY_TYPE_FINAL};
pub use item::{CanvasItem, ItemKind};
pub use profile::{CustomerGain, CustomerJob, CustomerPain, RatedItem};
pub use rating::Rating;
pub use value_map::{GainCreator, LinkedItem, PainReliever, ProductService};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque item identifier. Carries no information about the item's category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Fresh unique id for a newly created item
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Fields every canvas item has
pub trait CanvasEntry: Clone {
    fn id(&self) -> &ItemId;

    fn content(&self) -> &str;
}
