//! Walks the remote object tree and builds the local capability tree.
//!
//! Each descriptor is visited exactly once, children in the order the
//! service listed them. A failing per-node query leaves that node
//! without an item but never aborts the walk; siblings and children are
//! still discovered.

use crate::bus::{BusError, ObjectBus, ObjectDescriptor};
use crate::model::ValueDomain;
use crate::proxy::{AssignableProxy, DynamicReadableProxy};
use crate::tree::{CapabilityKind, CapabilityNode, NodeItem};

/// Build the capability tree from the service's current object tree.
/// Only an unreachable root is fatal.
pub fn build(bus: &dyn ObjectBus) -> Result<CapabilityNode, BusError> {
    let root = bus.root()?;
    Ok(build_node(bus, &root))
}

fn build_node(bus: &dyn ObjectBus, desc: &ObjectDescriptor) -> CapabilityNode {
    let kind = CapabilityKind::from_interface(&desc.interface);
    let name = match bus.node_name(&desc.path) {
        Ok(name) => name,
        Err(e) => {
            log::warn!("Name query failed for {}: {e}", desc.path);
            fallback_name(&desc.path)
        }
    };

    let item = match kind {
        CapabilityKind::Assignable => setup_assignable(bus, &desc.path),
        CapabilityKind::DynamicReadable => setup_dynamic(bus, &desc.path),
        CapabilityKind::StaticReadable => setup_static(bus, &desc.path),
        CapabilityKind::Unknown => None,
    };

    let children = desc
        .children
        .iter()
        .map(|child| build_node(bus, child))
        .collect();

    CapabilityNode {
        path: desc.path.clone(),
        name,
        kind,
        item,
        children,
    }
}

fn fallback_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

fn setup_assignable(bus: &dyn ObjectBus, path: &str) -> Option<NodeItem> {
    let domain = match bus.assignable_info(path) {
        Ok(domain) => domain,
        Err(e) => {
            log::warn!("assignableInfo query failed for {path}: {e}");
            return None;
        }
    };
    // A missing unit is normal; only log query failures.
    let unit = match bus.unit(path) {
        Ok(unit) => unit,
        Err(e) => {
            log::debug!("Unit query failed for {path}: {e}");
            None
        }
    };

    // One-time seed read. A value whose shape does not fit the domain
    // leaves the proxy without a displayed value instead of failing.
    let seed = match bus.current_value(path) {
        Ok(value) => match &domain {
            ValueDomain::Enumeration { .. } if value.as_key().is_none() => {
                log::warn!("Current value of {path} does not fit its enumeration");
                None
            }
            _ => Some(value),
        },
        Err(e) => {
            log::warn!("Current value read failed for {path}: {e}");
            None
        }
    };

    Some(NodeItem::Assignable(AssignableProxy::new(
        path, domain, unit, seed,
    )))
}

fn setup_dynamic(bus: &dyn ObjectBus, path: &str) -> Option<NodeItem> {
    let updates = match bus.subscribe(path) {
        Ok(rx) => rx,
        Err(e) => {
            log::warn!("Subscription failed for {path}: {e}");
            return None;
        }
    };
    let unit = bus.unit(path).unwrap_or_default();
    Some(NodeItem::Dynamic(DynamicReadableProxy::new(
        path, unit, updates,
    )))
}

fn setup_static(bus: &dyn ObjectBus, path: &str) -> Option<NodeItem> {
    let value = match bus.static_value(path) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Static value read failed for {path}: {e}");
            return None;
        }
    };
    // Unit is appended once; static values never update afterwards.
    let text = match bus.unit(path) {
        Ok(Some(unit)) => format!("{value} {unit}"),
        _ => value,
    };
    Some(NodeItem::Static(text))
}
