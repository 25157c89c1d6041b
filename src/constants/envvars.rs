pub const LOG_LEVEL: &str = "LOGGING_LEVEL";

pub const SIM_DEVICES: &str = "TUNECTL_SIM_DEVICES";
pub const TICK_MS: &str = "TUNECTL_TICK_MS";
