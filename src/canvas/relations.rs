//! Keeping value map links pointed at items that still exist.

use std::collections::HashSet;

use crate::entity::{ItemId, ItemKind, LinkedItem, UspCanvas};

fn prune<T: LinkedItem>(items: &mut [T], id: &ItemId) -> usize {
    let mut removed = 0;
    for item in items.iter_mut() {
        let ids = item.related_ids_mut();
        let before = ids.len();
        ids.retain(|related| related != id);
        removed += before - ids.len();
    }
    removed
}

/// Remove every link to a deleted profile item. Returns the number of links dropped.
pub fn prune_references(canvas: &mut UspCanvas, kind: ItemKind, id: &ItemId) -> usize {
    match kind {
        ItemKind::Job => prune(&mut canvas.product_services, id),
        ItemKind::Pain => prune(&mut canvas.pain_relievers, id),
        ItemKind::Gain => prune(&mut canvas.gain_creators, id),
        _ => 0,
    }
}

fn retain_known<T: LinkedItem>(items: &mut [T], known: &HashSet<ItemId>) -> usize {
    let mut removed = 0;
    for item in items.iter_mut() {
        let ids = item.related_ids_mut();
        let before = ids.len();
        ids.retain(|related| known.contains(related));
        removed += before - ids.len();
    }
    removed
}

/// Drop links whose target is gone, e.g. in a canvas loaded from storage.
pub fn prune_dangling(canvas: &mut UspCanvas) -> usize {
    let jobs: HashSet<ItemId> = canvas.customer_jobs.iter().map(|j| j.id.clone()).collect();
    let pains: HashSet<ItemId> = canvas.customer_pains.iter().map(|p| p.id.clone()).collect();
    let gains: HashSet<ItemId> = canvas.customer_gains.iter().map(|g| g.id.clone()).collect();

    retain_known(&mut canvas.product_services, &jobs)
        + retain_known(&mut canvas.pain_relievers, &pains)
        + retain_known(&mut canvas.gain_creators, &gains)
}
