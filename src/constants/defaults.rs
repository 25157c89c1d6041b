pub const LOG_LEVEL: &str = "INFO";

pub const SIM_DEVICES: usize = 1;
pub const TICK_MS: u64 = 500;
