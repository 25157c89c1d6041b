mod discover;
mod restore;
mod set_value;
mod watch;

pub use discover::discover;
pub use restore::restore;
pub use set_value::set_value;
pub use watch::watch;

use std::env;
use std::sync::Arc;

use once_cell::sync::Lazy;

use tunectl::bus::local::LocalBus;
use tunectl::constants::{defaults, envvars};
use tunectl::hw::sim::SimBackend;
use tunectl::registry::AttributeRegistry;

static SIM_DEVICES: Lazy<usize> = Lazy::new(|| {
    env::var(envvars::SIM_DEVICES)
        .ok()
        .and_then(|count| count.parse::<usize>().ok())
        .unwrap_or(defaults::SIM_DEVICES)
});

pub(crate) static TICK_MS: Lazy<u64> = Lazy::new(|| {
    env::var(envvars::TICK_MS)
        .ok()
        .and_then(|ms| ms.parse::<u64>().ok())
        .unwrap_or(defaults::TICK_MS)
});

/// Bus over the simulated backend; the demo stand-in for a live
/// control service connection.
pub(crate) fn open_bus() -> LocalBus {
    let registry = AttributeRegistry::initialize(Arc::new(SimBackend::new(*SIM_DEVICES)));
    LocalBus::new(Arc::new(registry))
}
