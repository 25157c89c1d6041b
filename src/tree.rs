use crate::constants::interfaces;
use crate::proxy::{AssignableProxy, DynamicReadableProxy};

/// Role a remote object declared for itself, resolved once at
/// discovery. Unrecognized interfaces map to `Unknown` and stay in the
/// tree for navigation only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapabilityKind {
    Assignable,
    DynamicReadable,
    StaticReadable,
    Unknown,
}

impl CapabilityKind {
    pub fn from_interface(interface: &str) -> Self {
        match interface {
            interfaces::ASSIGNABLE => CapabilityKind::Assignable,
            interfaces::DYNAMIC_READABLE => CapabilityKind::DynamicReadable,
            interfaces::STATIC_READABLE => CapabilityKind::StaticReadable,
            _ => CapabilityKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityKind::Assignable => "assignable",
            CapabilityKind::DynamicReadable => "dynamic",
            CapabilityKind::StaticReadable => "static",
            CapabilityKind::Unknown => "unknown",
        }
    }
}

/// Payload attached to a node, when its capability could be set up.
#[derive(Debug)]
pub enum NodeItem {
    Assignable(AssignableProxy),
    Dynamic(DynamicReadableProxy),
    /// Read once at discovery and formatted permanently.
    Static(String),
}

/// One node of the discovered capability tree. Children keep the order
/// the service listed them in; it is display order only.
#[derive(Debug)]
pub struct CapabilityNode {
    pub path: String,
    pub name: String,
    pub kind: CapabilityKind,
    /// Unset for navigation-only nodes and for nodes whose setup
    /// failed during discovery.
    pub item: Option<NodeItem>,
    pub children: Vec<CapabilityNode>,
}

impl CapabilityNode {
    pub fn find(&self, path: &str) -> Option<&CapabilityNode> {
        if self.path == path {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(path))
    }

    pub fn find_mut(&mut self, path: &str) -> Option<&mut CapabilityNode> {
        if self.path == path {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(path))
    }

    /// Depth-first traversal, parents before children.
    pub fn walk(&self, f: &mut impl FnMut(&CapabilityNode)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    pub fn assignable(&self) -> Option<&AssignableProxy> {
        match &self.item {
            Some(NodeItem::Assignable(proxy)) => Some(proxy),
            _ => None,
        }
    }

    pub fn assignable_mut(&mut self) -> Option<&mut AssignableProxy> {
        match &mut self.item {
            Some(NodeItem::Assignable(proxy)) => Some(proxy),
            _ => None,
        }
    }

    /// All dynamic proxies in this subtree, for the consumer's poll
    /// loop.
    pub fn dynamic_proxies_mut(&mut self) -> Vec<&mut DynamicReadableProxy> {
        let mut out = Vec::new();
        collect_dynamic(self, &mut out);
        out
    }

    /// All assignable proxies in this subtree.
    pub fn assignable_proxies_mut(&mut self) -> Vec<&mut AssignableProxy> {
        let mut out = Vec::new();
        collect_assignable(self, &mut out);
        out
    }
}

fn collect_assignable<'a>(
    node: &'a mut CapabilityNode,
    out: &mut Vec<&'a mut AssignableProxy>,
) {
    if let Some(NodeItem::Assignable(proxy)) = &mut node.item {
        out.push(proxy);
    }
    for child in &mut node.children {
        collect_assignable(child, out);
    }
}

fn collect_dynamic<'a>(
    node: &'a mut CapabilityNode,
    out: &mut Vec<&'a mut DynamicReadableProxy>,
) {
    if let Some(NodeItem::Dynamic(proxy)) = &mut node.item {
        out.push(proxy);
    }
    for child in &mut node.children {
        collect_dynamic(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_resolution_is_closed() {
        assert_eq!(
            CapabilityKind::from_interface("io.tunectl.Assignable"),
            CapabilityKind::Assignable
        );
        assert_eq!(
            CapabilityKind::from_interface("io.tunectl.DynamicReadable"),
            CapabilityKind::DynamicReadable
        );
        assert_eq!(
            CapabilityKind::from_interface("io.tunectl.StaticReadable"),
            CapabilityKind::StaticReadable
        );
        assert_eq!(
            CapabilityKind::from_interface("org.example.SomethingElse"),
            CapabilityKind::Unknown
        );
    }

    #[test]
    fn unrecognized_kind_renders_as_unknown() {
        assert_eq!(CapabilityKind::Unknown.as_str(), "unknown");
        assert_eq!(CapabilityKind::Assignable.as_str(), "assignable");
    }
}
