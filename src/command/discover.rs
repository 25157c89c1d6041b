use anyhow::Result;
use serde_json::json;

use tunectl::discovery;
use tunectl::tree::{CapabilityNode, NodeItem};

use crate::argsets::DiscoverArgs;

use super::open_bus;

pub fn discover(args: DiscoverArgs) -> Result<()> {
    let bus = open_bus();
    let tree = discovery::build(&bus)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&to_json(&tree))?);
    } else {
        print_node(&tree, 0);
    }
    Ok(())
}

fn node_text(node: &CapabilityNode) -> Option<String> {
    match &node.item {
        Some(NodeItem::Assignable(proxy)) => proxy.display_text(),
        Some(NodeItem::Dynamic(proxy)) => proxy.latest_text(),
        Some(NodeItem::Static(text)) => Some(text.clone()),
        None => None,
    }
}

fn print_node(node: &CapabilityNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match node_text(node) {
        Some(text) => println!("{indent}{} [{}]: {text}", node.name, node.kind.as_str()),
        None => println!("{indent}{} [{}]", node.name, node.kind.as_str()),
    }
    for child in &node.children {
        print_node(child, depth + 1);
    }
}

fn to_json(node: &CapabilityNode) -> serde_json::Value {
    json!({
        "path": node.path,
        "name": node.name,
        "kind": node.kind.as_str(),
        "value": node_text(node),
        "children": node.children.iter().map(to_json).collect::<Vec<_>>(),
    })
}
