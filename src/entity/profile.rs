// src/entity/profile.rs
//! Customer profile items: the jobs, pains and gains side of the canvas.

use serde::{Deserialize, Serialize};

use super::{CanvasEntry, ItemId, Rating};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerJob {
    pub id: ItemId,
    pub content: String,
    pub priority: Rating,
    #[serde(default, rename = "isAIGenerated")]
    pub is_ai_generated: bool,
}

impl CustomerJob {
    pub fn new(content: String, priority: Rating, is_ai_generated: bool) -> Self {
        Self {
            id: ItemId::generate(),
            content,
            priority,
            is_ai_generated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPain {
    pub id: ItemId,
    pub content: String,
    pub severity: Rating,
    #[serde(default, rename = "isAIGenerated")]
    pub is_ai_generated: bool,
}

impl CustomerPain {
    pub fn new(content: String, severity: Rating, is_ai_generated: bool) -> Self {
        Self {
            id: ItemId::generate(),
            content,
            severity,
            is_ai_generated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerGain {
    pub id: ItemId,
    pub content: String,
    pub importance: Rating,
    #[serde(default, rename = "isAIGenerated")]
    pub is_ai_generated: bool,
}

impl CustomerGain {
    pub fn new(content: String, importance: Rating, is_ai_generated: bool) -> Self {
        Self {
            id: ItemId::generate(),
            content,
            importance,
            is_ai_generated,
        }
    }
}

/// A profile item carrying a single rating.
pub trait RatedItem: CanvasEntry {
    fn rating(&self) -> Rating;

    fn set(&mut self, content: String, rating: Rating);
}

macro_rules! rated_item {
    ($ty:ty, $field:ident) => {
        impl CanvasEntry for $ty {
            fn id(&self) -> &ItemId {
                &self.id
            }

            fn content(&self) -> &str {
                &self.content
            }
        }

        impl RatedItem for $ty {
            fn rating(&self) -> Rating {
                self.$field
            }

            fn set(&mut self, content: String, rating: Rating) {
                self.content = content;
                self.$field = rating;
            }
        }
    };
}

rated_item!(CustomerJob, priority);
rated_item!(CustomerPain, severity);
rated_item!(CustomerGain, importance);
