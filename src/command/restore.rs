use anyhow::{anyhow, Result};

use tunectl::commit::commit;
use tunectl::discovery;

use crate::argsets::RestoreArgs;

use super::open_bus;
use super::set_value::render_outcomes;

/// Stage every assignable under a subtree back to its discovery-time
/// value, then commit.
pub fn restore(args: RestoreArgs) -> Result<()> {
    let bus = open_bus();
    let mut tree = discovery::build(&bus)?;

    {
        let subtree = tree
            .find_mut(&args.path)
            .ok_or_else(|| anyhow!("No node at path '{}'", args.path))?;
        for proxy in subtree.assignable_proxies_mut() {
            if let Err(e) = proxy.restore_initial() {
                log::warn!("Cannot restore {}: {e}", proxy.path());
            }
        }
    }

    let outcomes = commit(&mut tree, &bus);
    println!("{}", render_outcomes(&outcomes));
    Ok(())
}
