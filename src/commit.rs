//! Best-effort batch commit of pending edits in a subtree.
//!
//! Every dirty assignable is applied exactly once, each with its own
//! outcome; clean items are not touched. Applies run concurrently
//! across items — each worker owns the `&mut` to exactly one proxy, so
//! two applies can never target the same item. A stalled backend call
//! parks only its own worker. No rollback: this is not a transaction.

use crate::bus::{ApplyError, ObjectBus};
use crate::proxy::AssignableProxy;
use crate::tree::{CapabilityNode, NodeItem};

#[derive(Debug)]
pub struct CommitOutcome {
    pub path: String,
    pub result: Result<(), ApplyError>,
}

/// Apply all dirty items under `root`, one independent outcome per
/// item.
pub fn commit(root: &mut CapabilityNode, bus: &dyn ObjectBus) -> Vec<CommitOutcome> {
    let mut dirty: Vec<&mut AssignableProxy> = Vec::new();
    collect_dirty(root, &mut dirty);

    if dirty.is_empty() {
        log::debug!("Commit requested with no pending edits");
        return Vec::new();
    }
    log::info!("Committing {} pending edit(s)", dirty.len());

    std::thread::scope(|scope| {
        let handles: Vec<_> = dirty
            .into_iter()
            .map(|proxy| {
                scope.spawn(move || {
                    let path = proxy.path().to_string();
                    let result = proxy.apply(bus);
                    if let Err(e) = &result {
                        log::warn!("Apply failed for {path}: {e}");
                    }
                    CommitOutcome { path, result }
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("apply worker panicked"))
            .collect()
    })
}

fn collect_dirty<'a>(node: &'a mut CapabilityNode, out: &mut Vec<&'a mut AssignableProxy>) {
    if let Some(NodeItem::Assignable(proxy)) = &mut node.item {
        if proxy.is_dirty() {
            out.push(proxy);
        }
    }
    for child in &mut node.children {
        collect_dirty(child, out);
    }
}
