// src/entity/value_map.rs
//! Value map items: what the offering does for the customer profile.

use serde::{Deserialize, Serialize};

use super::{CanvasEntry, ItemId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductService {
    pub id: ItemId,
    pub content: String,
    #[serde(default)]
    pub related_job_ids: Vec<ItemId>,
    #[serde(default, rename = "isAIGenerated")]
    pub is_ai_generated: bool,
}

impl ProductService {
    pub fn new(content: String, related_job_ids: Vec<ItemId>, is_ai_generated: bool) -> Self {
        Self {
            id: ItemId::generate(),
            content,
            related_job_ids,
            is_ai_generated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PainReliever {
    pub id: ItemId,
    pub content: String,
    #[serde(default)]
    pub related_pain_ids: Vec<ItemId>,
    #[serde(default, rename = "isAIGenerated")]
    pub is_ai_generated: bool,
}

impl PainReliever {
    pub fn new(content: String, related_pain_ids: Vec<ItemId>, is_ai_generated: bool) -> Self {
        Self {
            id: ItemId::generate(),
            content,
            related_pain_ids,
            is_ai_generated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GainCreator {
    pub id: ItemId,
    pub content: String,
    #[serde(default)]
    pub related_gain_ids: Vec<ItemId>,
    #[serde(default, rename = "isAIGenerated")]
    pub is_ai_generated: bool,
}

impl GainCreator {
    pub fn new(content: String, related_gain_ids: Vec<ItemId>, is_ai_generated: bool) -> Self {
        Self {
            id: ItemId::generate(),
            content,
            related_gain_ids,
            is_ai_generated,
        }
    }
}

/// A value map item pointing at items on the customer profile side.
pub trait LinkedItem: CanvasEntry {
    fn related_ids(&self) -> &[ItemId];

    fn related_ids_mut(&mut self) -> &mut Vec<ItemId>;

    fn set(&mut self, content: String, related_ids: Vec<ItemId>);
}

macro_rules! linked_item {
    ($ty:ty, $field:ident) => {
        impl CanvasEntry for $ty {
            fn id(&self) -> &ItemId {
                &self.id
            }

            fn content(&self) -> &str {
                &self.content
            }
        }

        impl LinkedItem for $ty {
            fn related_ids(&self) -> &[ItemId] {
                &self.$field
            }

            fn related_ids_mut(&mut self) -> &mut Vec<ItemId> {
                &mut self.$field
            }

            fn set(&mut self, content: String, related_ids: Vec<ItemId>) {
                self.content = content;
                self.$field = related_ids;
            }
        }
    };
}

linked_item!(ProductService, related_job_ids);
linked_item!(PainReliever, related_pain_ids);
linked_item!(GainCreator, related_gain_ids);
