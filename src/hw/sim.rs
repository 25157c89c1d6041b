use std::sync::Mutex;

use rand::Rng;

use crate::model::Value;

use super::{Attribute, BoundsSpec, HardwareBackend, HwError, Permissions};

/// Simulated GPU backend. Stands in for a vendor driver during development
/// and in tests; semantics mirror a real discrete GPU: offset attributes
/// carry discovered ranges, the fan only accepts a speed while manual
/// control is on, and current core/memory clocks live in one packed
/// 32-bit register.
pub struct SimBackend {
    devices: Mutex<Vec<SimGpu>>,
}

struct SimGpu {
    name: String,
    uuid: String,
    voltage_offset: i64,
    core_clock_offset: i64,
    mem_clock_offset: i64,
    power_limit: u64,
    fan_speed: u64,
    fan_control_mode: u64,
    manual_fan: bool,
    /// Core clock in the upper 16 bits, memory clock in the lower 16.
    packed_clocks: u32,
    base_temp: i64,
    base_voltage: i64,
    base_fan_rpm: i64,
}

/// Core clock is the upper 16 bits, memory clock the lower 16.
pub(crate) fn unpack_clocks(packed: u32) -> (u64, u64) {
    let core = (packed >> 16) as u64;
    let mem = (packed & 0xFFFF) as u64;
    (core, mem)
}

impl SimGpu {
    fn new(index: usize) -> Self {
        SimGpu {
            name: format!("SimGPU {index}"),
            uuid: format!("GPU-SIM-{index:08x}"),
            voltage_offset: 0,
            core_clock_offset: 0,
            mem_clock_offset: 0,
            power_limit: 250,
            fan_speed: 35,
            fan_control_mode: 0,
            manual_fan: false,
            packed_clocks: (1850 << 16) | 7001,
            base_temp: 52,
            base_voltage: 1050,
            base_fan_rpm: 1400,
        }
    }
}

impl SimBackend {
    pub fn new(device_count: usize) -> Self {
        let devices = (0..device_count).map(SimGpu::new).collect();
        SimBackend {
            devices: Mutex::new(devices),
        }
    }

    fn with_device<T>(
        &self,
        dev: usize,
        f: impl FnOnce(&mut SimGpu) -> Result<T, HwError>,
    ) -> Result<T, HwError> {
        let mut devices = self.devices.lock().unwrap();
        let gpu = devices.get_mut(dev).ok_or(HwError::UnknownDevice(dev))?;
        f(gpu)
    }
}

fn jitter(base: i64, spread: i64) -> i64 {
    base + rand::thread_rng().gen_range(-spread..=spread)
}

impl HardwareBackend for SimBackend {
    fn device_count(&self) -> usize {
        self.devices.lock().unwrap().len()
    }

    fn device_name(&self, dev: usize) -> Result<String, HwError> {
        self.with_device(dev, |gpu| Ok(gpu.name.clone()))
    }

    fn device_uuid(&self, dev: usize) -> Result<String, HwError> {
        self.with_device(dev, |gpu| Ok(gpu.uuid.clone()))
    }

    fn permissions(&self, dev: usize, attr: Attribute) -> Result<Permissions, HwError> {
        self.with_device(dev, |_| {
            let perms = match attr {
                Attribute::VoltageOffset
                | Attribute::CoreClockOffset
                | Attribute::MemClockOffset
                | Attribute::PowerLimit
                | Attribute::FanSpeed
                | Attribute::FanControlMode => Permissions::READ | Permissions::WRITE,
                Attribute::CoreClock
                | Attribute::MemClock
                | Attribute::Temperature
                | Attribute::Voltage
                | Attribute::FanRpm => Permissions::READ,
            };
            Ok(perms)
        })
    }

    fn bounds(&self, dev: usize, attr: Attribute) -> Result<BoundsSpec, HwError> {
        self.with_device(dev, |_| match attr {
            Attribute::VoltageOffset => Ok(BoundsSpec::Interval {
                min: -200.0,
                max: 200.0,
            }),
            Attribute::CoreClockOffset => Ok(BoundsSpec::Interval {
                min: -300.0,
                max: 1200.0,
            }),
            Attribute::MemClockOffset => Ok(BoundsSpec::Interval {
                min: -2000.0,
                max: 2000.0,
            }),
            Attribute::PowerLimit => Ok(BoundsSpec::Interval {
                min: 100.0,
                max: 350.0,
            }),
            Attribute::FanSpeed => Ok(BoundsSpec::Interval { min: 0.0, max: 100.0 }),
            Attribute::FanControlMode => Ok(BoundsSpec::Choices(vec![
                (0, "Auto".to_string()),
                (1, "Manual".to_string()),
            ])),
            _ => Err(HwError::Unsupported(attr)),
        })
    }

    fn unit(&self, dev: usize, attr: Attribute) -> Result<Option<String>, HwError> {
        self.with_device(dev, |_| {
            let unit = match attr {
                Attribute::VoltageOffset | Attribute::Voltage => Some("mV"),
                Attribute::CoreClockOffset
                | Attribute::MemClockOffset
                | Attribute::CoreClock
                | Attribute::MemClock => Some("MHz"),
                Attribute::PowerLimit => Some("W"),
                Attribute::FanSpeed => Some("%"),
                Attribute::Temperature => Some("°C"),
                Attribute::FanRpm => Some("RPM"),
                Attribute::FanControlMode => None,
            };
            Ok(unit.map(String::from))
        })
    }

    fn read(&self, dev: usize, attr: Attribute) -> Result<Value, HwError> {
        self.with_device(dev, |gpu| match attr {
            Attribute::VoltageOffset => Ok(Value::Int(gpu.voltage_offset)),
            Attribute::CoreClockOffset => Ok(Value::Int(gpu.core_clock_offset)),
            Attribute::MemClockOffset => Ok(Value::Int(gpu.mem_clock_offset)),
            Attribute::PowerLimit => Ok(Value::Uint(gpu.power_limit)),
            Attribute::FanSpeed => Ok(Value::Uint(gpu.fan_speed)),
            Attribute::FanControlMode => Ok(Value::Uint(gpu.fan_control_mode)),
            Attribute::CoreClock => {
                let (core, _) = unpack_clocks(gpu.packed_clocks);
                Ok(Value::Uint(core + jitter(0, 25).unsigned_abs()))
            }
            Attribute::MemClock => {
                let (_, mem) = unpack_clocks(gpu.packed_clocks);
                Ok(Value::Uint(mem))
            }
            Attribute::Temperature => Ok(Value::Int(jitter(gpu.base_temp, 3))),
            Attribute::Voltage => Ok(Value::Int(jitter(gpu.base_voltage, 12))),
            Attribute::FanRpm => Ok(Value::Int(jitter(gpu.base_fan_rpm, 60))),
        })
    }

    fn write(&self, dev: usize, attr: Attribute, value: Value) -> Result<(), HwError> {
        self.with_device(dev, |gpu| match attr {
            Attribute::VoltageOffset => {
                gpu.voltage_offset = value.as_f64() as i64;
                Ok(())
            }
            Attribute::CoreClockOffset => {
                gpu.core_clock_offset = value.as_f64() as i64;
                Ok(())
            }
            Attribute::MemClockOffset => {
                gpu.mem_clock_offset = value.as_f64() as i64;
                Ok(())
            }
            Attribute::PowerLimit => {
                gpu.power_limit = value.as_f64() as u64;
                Ok(())
            }
            Attribute::FanSpeed => {
                // The cooler only takes a target level under manual control.
                if !gpu.manual_fan {
                    return Err(HwError::Rejected);
                }
                gpu.fan_speed = value.as_f64() as u64;
                Ok(())
            }
            Attribute::FanControlMode => {
                let key = value.as_key().ok_or(HwError::Rejected)?;
                if key > 1 {
                    return Err(HwError::Rejected);
                }
                gpu.fan_control_mode = key;
                gpu.manual_fan = key == 1;
                Ok(())
            }
            _ => Err(HwError::Unsupported(attr)),
        })
    }

    fn set_manual_control(&self, dev: usize, on: bool) -> Result<(), HwError> {
        self.with_device(dev, |gpu| {
            gpu.manual_fan = on;
            gpu.fan_control_mode = u64::from(on);
            Ok(())
        })
    }

    fn manual_control(&self, dev: usize) -> Result<bool, HwError> {
        self.with_device(dev, |gpu| Ok(gpu.manual_fan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpack_core_high_mem_low() {
        let packed = (1850u32 << 16) | 7001;
        assert_eq!(unpack_clocks(packed), (1850, 7001));
    }

    #[test]
    fn fan_speed_write_needs_manual_control() {
        let backend = SimBackend::new(1);
        assert!(matches!(
            backend.write(0, Attribute::FanSpeed, Value::Uint(60)),
            Err(HwError::Rejected)
        ));
        backend.set_manual_control(0, true).unwrap();
        backend.write(0, Attribute::FanSpeed, Value::Uint(60)).unwrap();
        assert_eq!(backend.read(0, Attribute::FanSpeed).unwrap(), Value::Uint(60));
    }

    #[test]
    fn fan_mode_write_flips_manual_control() {
        let backend = SimBackend::new(1);
        backend
            .write(0, Attribute::FanControlMode, Value::Uint(1))
            .unwrap();
        assert!(backend.manual_control(0).unwrap());
    }

    #[test]
    fn unknown_device_is_an_error() {
        let backend = SimBackend::new(1);
        assert!(matches!(
            backend.read(3, Attribute::Temperature),
            Err(HwError::UnknownDevice(3))
        ));
    }
}
