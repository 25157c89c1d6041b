use anyhow::{anyhow, Result};
use itertools::Itertools;

use tunectl::commit::{commit, CommitOutcome};
use tunectl::discovery;
use tunectl::model::Value;

use crate::argsets::SetArgs;

use super::open_bus;

/// Stage one value on an assignable node, then commit the whole tree.
pub fn set_value(args: SetArgs) -> Result<()> {
    let bus = open_bus();
    let mut tree = discovery::build(&bus)?;

    let node = tree
        .find_mut(&args.path)
        .ok_or_else(|| anyhow!("No node at path '{}'", args.path))?;
    let proxy = node
        .assignable_mut()
        .ok_or_else(|| anyhow!("Node '{}' is not assignable", args.path))?;

    let value = parse_value(&args.value)?;
    proxy.set_pending(value)?;

    let outcomes = commit(&mut tree, &bus);
    println!("{}", render_outcomes(&outcomes));
    Ok(())
}

pub(crate) fn parse_value(raw: &str) -> Result<Value> {
    if let Ok(i) = raw.parse::<i64>() {
        return Ok(Value::Int(i));
    }
    if let Ok(d) = raw.parse::<f64>() {
        return Ok(Value::Double(d));
    }
    Err(anyhow!("'{raw}' is not a numeric value or enumeration key"))
}

pub(crate) fn render_outcomes(outcomes: &[CommitOutcome]) -> String {
    if outcomes.is_empty() {
        return "Nothing to commit".to_string();
    }
    outcomes
        .iter()
        .map(|o| match &o.result {
            Ok(()) => format!("{}: applied", o.path),
            Err(e) => format!("{}: {e}", o.path),
        })
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ints_and_doubles() {
        assert_eq!(parse_value("-50").unwrap(), Value::Int(-50));
        assert_eq!(parse_value("1").unwrap(), Value::Int(1));
        assert_eq!(parse_value("0.5").unwrap(), Value::Double(0.5));
        assert!(parse_value("fast").is_err());
    }
}
