mod argsets;
mod command;

use anyhow::{anyhow, Result};
use dotenv::dotenv;
use env_logger::Env;

use tunectl::constants::{defaults, envvars};

const CMD_DISCOVER: &str = "discover";
const CMD_WATCH: &str = "watch";
const CMD_SET: &str = "set";
const CMD_RESTORE: &str = "restore";

fn main() -> Result<()> {
    let _ = dotenv();
    env_logger::Builder::from_env(
        Env::default().filter_or(envvars::LOG_LEVEL, defaults::LOG_LEVEL),
    )
    .init();

    let mut args = pico_args::Arguments::from_env();
    match args.subcommand()?.as_deref() {
        Some(CMD_DISCOVER) => command::discover(argsets::DiscoverArgs {
            json: args.contains("--json"),
        }),
        Some(CMD_WATCH) => command::watch(argsets::WatchArgs {
            seconds: args.free_from_str()?,
        }),
        Some(CMD_SET) => command::set_value(argsets::SetArgs {
            path: args.free_from_str()?,
            value: args.free_from_str()?,
        }),
        Some(CMD_RESTORE) => command::restore(argsets::RestoreArgs {
            path: args.free_from_str()?,
        }),
        _ => Err(anyhow!(
            "Subcommand must be one of 'discover', 'watch', 'set', 'restore'"
        )),
    }
}
