use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use crate::hw::{Attribute, BoundsSpec, HardwareBackend, HwError, Permissions};
use crate::model::{EnumEntry, ValidationError, Value, ValueDomain};

/// Hardware-reported capability of one device attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    None,
    ReadOnly,
    ReadWrite,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AttributeCapability {
    pub permission: Permission,
    /// Present iff the attribute is write-capable.
    pub domain: Option<ValueDomain>,
    /// Whether the actuator behind this attribute is under manual control.
    pub manual_control: bool,
}

#[derive(Clone, Debug)]
pub struct DeviceInfo {
    pub index: usize,
    pub name: String,
    pub uuid: String,
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("attribute {0} is unavailable on this device")]
    Unavailable(Attribute),
    #[error("attribute {0} is read-only")]
    ReadOnly(Attribute),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("hardware rejected the write: {0}")]
    Hardware(#[from] HwError),
}

/// Per-device, per-attribute capability table over one hardware backend.
///
/// Capabilities are queried once at initialization and only re-queried on
/// an explicit `reinitialize`. Writes are validated against the discovered
/// domain before the backend is contacted.
pub struct AttributeRegistry {
    backend: Arc<dyn HardwareBackend>,
    devices: Vec<DeviceInfo>,
    caps: RwLock<HashMap<(usize, Attribute), AttributeCapability>>,
}

impl AttributeRegistry {
    pub fn initialize(backend: Arc<dyn HardwareBackend>) -> Self {
        let mut registry = AttributeRegistry {
            backend,
            devices: Vec::new(),
            caps: RwLock::new(HashMap::new()),
        };
        registry.scan();
        registry
    }

    pub fn reinitialize(&mut self) {
        self.scan();
    }

    fn scan(&mut self) {
        let mut caps = HashMap::new();
        let mut devices = Vec::new();

        for dev in 0..self.backend.device_count() {
            let name = match self.backend.device_name(dev) {
                Ok(name) => name,
                Err(e) => {
                    log::warn!("Failed to query name for device {dev}: {e}");
                    format!("device {dev}")
                }
            };
            let uuid = self.backend.device_uuid(dev).unwrap_or_default();
            devices.push(DeviceInfo {
                index: dev,
                name,
                uuid,
            });

            for attr in Attribute::ALL {
                match self.discover_one(dev, attr) {
                    Ok(cap) => {
                        caps.insert((dev, attr), cap);
                    }
                    Err(e) => {
                        // One broken attribute must not stop the scan.
                        log::warn!("Capability query failed for device {dev} {attr}: {e}");
                    }
                }
            }
        }

        self.devices = devices;
        *self.caps.write().unwrap() = caps;
    }

    fn discover_one(
        &self,
        dev: usize,
        attr: Attribute,
    ) -> Result<AttributeCapability, HwError> {
        let perms = self.backend.permissions(dev, attr)?;
        let manual_control = match attr {
            Attribute::FanSpeed => self.backend.manual_control(dev).unwrap_or(false),
            _ => false,
        };

        if perms.contains(Permissions::WRITE) {
            let unit = self.backend.unit(dev, attr)?;
            // min and max are stored independently; never derive one
            // from the other.
            let domain = match self.backend.bounds(dev, attr)? {
                BoundsSpec::Interval { min, max } => ValueDomain::Range { min, max, unit },
                BoundsSpec::Choices(choices) => ValueDomain::Enumeration {
                    entries: choices
                        .into_iter()
                        .map(|(key, label)| EnumEntry { key, label })
                        .collect(),
                },
            };
            Ok(AttributeCapability {
                permission: Permission::ReadWrite,
                domain: Some(domain),
                manual_control,
            })
        } else if perms.contains(Permissions::READ) {
            Ok(AttributeCapability {
                permission: Permission::ReadOnly,
                domain: None,
                manual_control,
            })
        } else {
            Ok(AttributeCapability {
                permission: Permission::None,
                domain: None,
                manual_control,
            })
        }
    }

    pub fn devices(&self) -> &[DeviceInfo] {
        &self.devices
    }

    /// Capability for one attribute, if it is available at all.
    pub fn capability(&self, dev: usize, attr: Attribute) -> Option<AttributeCapability> {
        let caps = self.caps.read().unwrap();
        caps.get(&(dev, attr))
            .filter(|c| c.permission != Permission::None)
            .cloned()
    }

    pub fn unit(&self, dev: usize, attr: Attribute) -> Result<Option<String>, RegistryError> {
        match self.capability(dev, attr) {
            Some(_) => Ok(self.backend.unit(dev, attr)?),
            None => Err(RegistryError::Unavailable(attr)),
        }
    }

    pub fn read(&self, dev: usize, attr: Attribute) -> Result<Value, RegistryError> {
        match self.capability(dev, attr) {
            Some(_) => Ok(self.backend.read(dev, attr)?),
            None => Err(RegistryError::Unavailable(attr)),
        }
    }

    /// Bounded write. Values that fail domain validation are rejected
    /// locally and never reach the backend.
    pub fn write(&self, dev: usize, attr: Attribute, value: Value) -> Result<(), RegistryError> {
        let cap = self
            .capability(dev, attr)
            .ok_or(RegistryError::Unavailable(attr))?;
        match cap.permission {
            Permission::ReadWrite => {}
            Permission::ReadOnly => return Err(RegistryError::ReadOnly(attr)),
            Permission::None => return Err(RegistryError::Unavailable(attr)),
        }
        if let Some(domain) = &cap.domain {
            domain.validate(&value)?;
        }
        self.backend.write(dev, attr, value)?;
        Ok(())
    }

    pub fn set_manual_control(&self, dev: usize, on: bool) -> Result<(), RegistryError> {
        self.backend.set_manual_control(dev, on)?;
        Ok(())
    }
}
