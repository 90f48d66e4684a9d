use serde::{Deserialize, Serialize};

use super::{
    CustomerGain, CustomerJob, CustomerPain, GainCreator, ItemId, PainReliever, ProductService,
};

/// The six canvas categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Job,
    Pain,
    Gain,
    Service,
    Reliever,
    Creator,
}

impl ItemKind {
    pub const ALL: [ItemKind; 6] = [
        ItemKind::Job,
        ItemKind::Pain,
        ItemKind::Gain,
        ItemKind::Service,
        ItemKind::Reliever,
        ItemKind::Creator,
    ];

    /// Jobs, pains and gains make up the customer profile.
    pub fn is_profile(&self) -> bool {
        matches!(self, ItemKind::Job | ItemKind::Pain | ItemKind::Gain)
    }

    /// The profile kind a value map kind links to.
    pub fn linked_profile_kind(&self) -> Option<ItemKind> {
        match self {
            ItemKind::Service => Some(ItemKind::Job),
            ItemKind::Reliever => Some(ItemKind::Pain),
            ItemKind::Creator => Some(ItemKind::Gain),
            _ => None,
        }
    }

    /// Human label for the rating field of profile kinds.
    pub fn rating_label(&self) -> Option<&'static str> {
        match self {
            ItemKind::Job => Some("priority"),
            ItemKind::Pain => Some("severity"),
            ItemKind::Gain => Some("importance"),
            _ => None,
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Job => write!(f, "job"),
            ItemKind::Pain => write!(f, "pain"),
            ItemKind::Gain => write!(f, "gain"),
            ItemKind::Service => write!(f, "service"),
            ItemKind::Reliever => write!(f, "reliever"),
            ItemKind::Creator => write!(f, "creator"),
        }
    }
}

impl std::str::FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "job" | "jobs" | "customer_job" => Ok(ItemKind::Job),
            "pain" | "pains" | "customer_pain" => Ok(ItemKind::Pain),
            "gain" | "gains" | "customer_gain" => Ok(ItemKind::Gain),
            "service" | "services" | "product_service" => Ok(ItemKind::Service),
            "reliever" | "relievers" | "pain_reliever" => Ok(ItemKind::Reliever),
            "creator" | "creators" | "gain_creator" => Ok(ItemKind::Creator),
            _ => Err(format!("Unknown item kind: {}", s)),
        }
    }
}

/// Any canvas item, tagged with its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CanvasItem {
    Job(CustomerJob),
    Pain(CustomerPain),
    Gain(CustomerGain),
    Service(ProductService),
    Reliever(PainReliever),
    Creator(GainCreator),
}

impl CanvasItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            CanvasItem::Job(_) => ItemKind::Job,
            CanvasItem::Pain(_) => ItemKind::Pain,
            CanvasItem::Gain(_) => ItemKind::Gain,
            CanvasItem::Service(_) => ItemKind::Service,
            CanvasItem::Reliever(_) => ItemKind::Reliever,
            CanvasItem::Creator(_) => ItemKind::Creator,
        }
    }

    pub fn id(&self) -> &ItemId {
        match self {
            CanvasItem::Job(item) => &item.id,
            CanvasItem::Pain(item) => &item.id,
            CanvasItem::Gain(item) => &item.id,
            CanvasItem::Service(item) => &item.id,
            CanvasItem::Reliever(item) => &item.id,
            CanvasItem::Creator(item) => &item.id,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            CanvasItem::Job(item) => &item.content,
            CanvasItem::Pain(item) => &item.content,
            CanvasItem::Gain(item) => &item.content,
            CanvasItem::Service(item) => &item.content,
            CanvasItem::Reliever(item) => &item.content,
            CanvasItem::Creator(item) => &item.content,
        }
    }
}
