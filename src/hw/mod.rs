pub mod sim;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Value;

/// Tunable or observable attribute of one physical device.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum Attribute {
    VoltageOffset,
    CoreClockOffset,
    MemClockOffset,
    PowerLimit,
    FanSpeed,
    FanControlMode,
    CoreClock,
    MemClock,
    Temperature,
    Voltage,
    FanRpm,
}

impl Attribute {
    pub const ALL: [Attribute; 11] = [
        Attribute::VoltageOffset,
        Attribute::CoreClockOffset,
        Attribute::MemClockOffset,
        Attribute::PowerLimit,
        Attribute::FanSpeed,
        Attribute::FanControlMode,
        Attribute::CoreClock,
        Attribute::MemClock,
        Attribute::Temperature,
        Attribute::Voltage,
        Attribute::FanRpm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::VoltageOffset => "voltage_offset",
            Attribute::CoreClockOffset => "core_clock_offset",
            Attribute::MemClockOffset => "mem_clock_offset",
            Attribute::PowerLimit => "power_limit",
            Attribute::FanSpeed => "fan_speed",
            Attribute::FanControlMode => "fan_control_mode",
            Attribute::CoreClock => "core_clock",
            Attribute::MemClock => "mem_clock",
            Attribute::Temperature => "temperature",
            Attribute::Voltage => "voltage",
            Attribute::FanRpm => "fan_rpm",
        }
    }

    /// Attributes whose value changes on its own and is worth streaming.
    pub fn is_dynamic(&self) -> bool {
        matches!(
            self,
            Attribute::CoreClock
                | Attribute::MemClock
                | Attribute::Temperature
                | Attribute::Voltage
                | Attribute::FanRpm
        )
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Per-attribute permission bitmask as reported by the backend.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Permissions: u8 {
        const READ = 0b01;
        const WRITE = 0b10;
    }
}

/// Legal-value description for a writable attribute, straight from the
/// backend. The registry turns this into a `ValueDomain`.
#[derive(Clone, Debug, PartialEq)]
pub enum BoundsSpec {
    Interval { min: f64, max: f64 },
    Choices(Vec<(u64, String)>),
}

#[derive(Error, Debug)]
pub enum HwError {
    #[error("no device with index {0}")]
    UnknownDevice(usize),
    #[error("attribute {0} not supported by this device")]
    Unsupported(Attribute),
    #[error("hardware rejected the write")]
    Rejected,
    #[error("hardware communication failed: {0}")]
    Comm(String),
}

/// Vendor-neutral contract the attribute registry is built on. One
/// implementation per hardware family; all calls are blocking.
pub trait HardwareBackend: Send + Sync {
    fn device_count(&self) -> usize;
    fn device_name(&self, dev: usize) -> Result<String, HwError>;
    fn device_uuid(&self, dev: usize) -> Result<String, HwError>;

    fn permissions(&self, dev: usize, attr: Attribute) -> Result<Permissions, HwError>;
    /// Only meaningful for write-capable attributes.
    fn bounds(&self, dev: usize, attr: Attribute) -> Result<BoundsSpec, HwError>;
    /// Physical unit, if the attribute has one.
    fn unit(&self, dev: usize, attr: Attribute) -> Result<Option<String>, HwError>;

    fn read(&self, dev: usize, attr: Attribute) -> Result<Value, HwError>;
    fn write(&self, dev: usize, attr: Attribute, value: Value) -> Result<(), HwError>;

    /// Toggle manual control of actuator attributes (cooling).
    fn set_manual_control(&self, dev: usize, on: bool) -> Result<(), HwError>;
    fn manual_control(&self, dev: usize) -> Result<bool, HwError>;
}
