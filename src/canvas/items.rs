//! Replace-by-id helpers shared by every category.

use crate::entity::{CanvasEntry, ItemId, LinkedItem, RatedItem, Rating};

pub(crate) fn update_rated<T: RatedItem>(
    items: &mut [T],
    id: &ItemId,
    content: String,
    rating: Rating,
) -> bool {
    match items.iter_mut().find(|item| item.id() == id) {
        Some(item) => {
            item.set(content, rating);
            true
        }
        None => false,
    }
}

pub(crate) fn update_linked<T: LinkedItem>(
    items: &mut [T],
    id: &ItemId,
    content: String,
    related_ids: Vec<ItemId>,
) -> bool {
    match items.iter_mut().find(|item| item.id() == id) {
        Some(item) => {
            item.set(content, related_ids);
            true
        }
        None => false,
    }
}

pub(crate) fn remove_by_id<T: CanvasEntry>(items: &mut Vec<T>, id: &ItemId) -> bool {
    let before = items.len();
    items.retain(|item| item.id() != id);
    items.len() != before
}
