// src/entity/canvas.rs
use serde::{Deserialize, Serialize};

use super::{
    CanvasItem, CustomerGain, CustomerJob, CustomerPain, GainCreator, ItemId, ItemKind,
    PainReliever, ProductService,
};

/// The whole value proposition canvas for one strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UspCanvas {
    pub customer_jobs: Vec<CustomerJob>,
    pub customer_pains: Vec<CustomerPain>,
    pub customer_gains: Vec<CustomerGain>,
    pub product_services: Vec<ProductService>,
    pub pain_relievers: Vec<PainReliever>,
    pub gain_creators: Vec<GainCreator>,
}

impl UspCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when there are no jobs, pains or gains.
    pub fn is_profile_empty(&self) -> bool {
        self.customer_jobs.is_empty()
            && self.customer_pains.is_empty()
            && self.customer_gains.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.is_profile_empty()
            && self.product_services.is_empty()
            && self.pain_relievers.is_empty()
            && self.gain_creators.is_empty()
    }

    pub fn len(&self, kind: ItemKind) -> usize {
        match kind {
            ItemKind::Job => self.customer_jobs.len(),
            ItemKind::Pain => self.customer_pains.len(),
            ItemKind::Gain => self.customer_gains.len(),
            ItemKind::Service => self.product_services.len(),
            ItemKind::Reliever => self.pain_relievers.len(),
            ItemKind::Creator => self.gain_creators.len(),
        }
    }

    pub fn total_items(&self) -> usize {
        ItemKind::ALL.iter().map(|kind| self.len(*kind)).sum()
    }

    /// All items of one category, wrapped in the tagged union.
    pub fn items(&self, kind: ItemKind) -> Vec<CanvasItem> {
        match kind {
            ItemKind::Job => self.customer_jobs.iter().cloned().map(CanvasItem::Job).collect(),
            ItemKind::Pain => self.customer_pains.iter().cloned().map(CanvasItem::Pain).collect(),
            ItemKind::Gain => self.customer_gains.iter().cloned().map(CanvasItem::Gain).collect(),
            ItemKind::Service => self
                .product_services
                .iter()
                .cloned()
                .map(CanvasItem::Service)
                .collect(),
            ItemKind::Reliever => self
                .pain_relievers
                .iter()
                .cloned()
                .map(CanvasItem::Reliever)
                .collect(),
            ItemKind::Creator => self
                .gain_creators
                .iter()
                .cloned()
                .map(CanvasItem::Creator)
                .collect(),
        }
    }

    /// Look an item up by id across all categories.
    pub fn find(&self, id: &ItemId) -> Option<CanvasItem> {
        ItemKind::ALL
            .iter()
            .flat_map(|kind| self.items(*kind))
            .find(|item| item.id() == id)
    }

    pub fn contains(&self, kind: ItemKind, id: &ItemId) -> bool {
        self.items(kind).iter().any(|item| item.id() == id)
    }
}
