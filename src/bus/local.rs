use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::constants::interfaces;
use crate::hw::Attribute;
use crate::model::{Value, ValueDomain};
use crate::registry::{AttributeRegistry, Permission, RegistryError};

use super::{ApplyError, BusError, ObjectBus, ObjectDescriptor};

/// In-process bus serving registry-backed objects. This is the service
/// side of the object tree: one group node per device, capability group
/// nodes under it, one leaf object per available attribute.
#[derive(Clone)]
pub struct LocalBus {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Arc<AttributeRegistry>,
    root: ObjectDescriptor,
    objects: HashMap<String, ObjectRef>,
    names: HashMap<String, String>,
    subscribers: Mutex<HashMap<String, Vec<flume::Sender<Value>>>>,
}

#[derive(Clone, Copy, Debug)]
enum ObjectRef {
    Group,
    Uuid(usize),
    Attr { dev: usize, attr: Attribute },
}

const SIGNAL_BUFFER: usize = 16;

fn attr_display_name(attr: Attribute) -> &'static str {
    match attr {
        Attribute::VoltageOffset => "Voltage offset",
        Attribute::CoreClockOffset => "Core clock offset",
        Attribute::MemClockOffset => "Memory clock offset",
        Attribute::PowerLimit => "Power limit",
        Attribute::FanSpeed => "Fan speed",
        Attribute::FanControlMode => "Fan control mode",
        Attribute::CoreClock => "Core clock",
        Attribute::MemClock => "Memory clock",
        Attribute::Temperature => "Temperature",
        Attribute::Voltage => "Core voltage",
        Attribute::FanRpm => "Fan RPM",
    }
}

/// Capability groups as they appear under each device node, in display
/// order.
const GROUPS: [(&str, &str, &[Attribute]); 3] = [
    (
        "clocks",
        "Clocks",
        &[
            Attribute::CoreClockOffset,
            Attribute::MemClockOffset,
            Attribute::CoreClock,
            Attribute::MemClock,
        ],
    ),
    (
        "power",
        "Power",
        &[
            Attribute::PowerLimit,
            Attribute::VoltageOffset,
            Attribute::Voltage,
        ],
    ),
    (
        "cooling",
        "Cooling",
        &[
            Attribute::FanControlMode,
            Attribute::FanSpeed,
            Attribute::FanRpm,
            Attribute::Temperature,
        ],
    ),
];

impl LocalBus {
    pub fn new(registry: Arc<AttributeRegistry>) -> Self {
        let mut objects = HashMap::new();
        let mut names = HashMap::new();
        let mut root = ObjectDescriptor::new("/", interfaces::GROUP);
        names.insert("/".to_string(), "root".to_string());

        for device in registry.devices() {
            let dev = device.index;
            let dev_path = format!("/gpu{dev}");
            let mut dev_node = ObjectDescriptor::new(&dev_path, interfaces::GROUP);
            objects.insert(dev_path.clone(), ObjectRef::Group);
            names.insert(dev_path.clone(), device.name.clone());

            let uuid_path = format!("{dev_path}/uuid");
            dev_node
                .children
                .push(ObjectDescriptor::new(&uuid_path, interfaces::STATIC_READABLE));
            objects.insert(uuid_path.clone(), ObjectRef::Uuid(dev));
            names.insert(uuid_path, "UUID".to_string());

            for (segment, group_name, attrs) in GROUPS {
                let group_path = format!("{dev_path}/{segment}");
                let mut group_node = ObjectDescriptor::new(&group_path, interfaces::GROUP);
                objects.insert(group_path.clone(), ObjectRef::Group);
                names.insert(group_path.clone(), group_name.to_string());

                for &attr in attrs {
                    let Some(cap) = registry.capability(dev, attr) else {
                        // Unavailable attributes are not exported at all.
                        continue;
                    };
                    let interface = match cap.permission {
                        Permission::ReadWrite => interfaces::ASSIGNABLE,
                        Permission::ReadOnly if attr.is_dynamic() => {
                            interfaces::DYNAMIC_READABLE
                        }
                        Permission::ReadOnly => interfaces::STATIC_READABLE,
                        Permission::None => continue,
                    };
                    let path = format!("{group_path}/{attr}");
                    group_node
                        .children
                        .push(ObjectDescriptor::new(&path, interface));
                    objects.insert(path.clone(), ObjectRef::Attr { dev, attr });
                    names.insert(path, attr_display_name(attr).to_string());
                }

                dev_node.children.push(group_node);
            }

            root.children.push(dev_node);
        }

        LocalBus {
            inner: Arc::new(Inner {
                registry,
                root,
                objects,
                names,
                subscribers: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn registry(&self) -> &AttributeRegistry {
        &self.inner.registry
    }

    fn attr_ref(&self, path: &str) -> Result<(usize, Attribute), BusError> {
        match self.inner.objects.get(path) {
            Some(ObjectRef::Attr { dev, attr }) => Ok((*dev, *attr)),
            Some(_) => Err(BusError::Protocol {
                path: path.to_string(),
                detail: "object is not an attribute".to_string(),
            }),
            None => Err(BusError::UnknownPath(path.to_string())),
        }
    }

    /// Publish one round of updates to all live subscribers. Senders
    /// whose receiver is gone are dropped; full channels are skipped
    /// (the consumer only cares about the newest value anyway).
    pub fn tick(&self) {
        let mut subs = self.inner.subscribers.lock().unwrap();
        for (path, senders) in subs.iter_mut() {
            let Ok((dev, attr)) = self.attr_ref(path) else {
                continue;
            };
            let value = match self.inner.registry.read(dev, attr) {
                Ok(v) => v,
                Err(e) => {
                    log::debug!("Skipping update for {path}: {e}");
                    continue;
                }
            };
            senders.retain(|tx| !matches!(tx.try_send(value), Err(flume::TrySendError::Disconnected(_))));
        }
        subs.retain(|_, senders| !senders.is_empty());
    }
}

fn unreachable_err(path: &str, e: RegistryError) -> BusError {
    BusError::Unreachable(format!("{path}: {e}"))
}

impl ObjectBus for LocalBus {
    fn root(&self) -> Result<ObjectDescriptor, BusError> {
        Ok(self.inner.root.clone())
    }

    fn node_name(&self, path: &str) -> Result<String, BusError> {
        self.inner
            .names
            .get(path)
            .cloned()
            .ok_or_else(|| BusError::UnknownPath(path.to_string()))
    }

    fn assignable_info(&self, path: &str) -> Result<ValueDomain, BusError> {
        let (dev, attr) = self.attr_ref(path)?;
        let cap = self
            .inner
            .registry
            .capability(dev, attr)
            .ok_or_else(|| BusError::Unreachable(path.to_string()))?;
        cap.domain.ok_or_else(|| BusError::Protocol {
            path: path.to_string(),
            detail: "attribute has no value domain".to_string(),
        })
    }

    fn unit(&self, path: &str) -> Result<Option<String>, BusError> {
        let (dev, attr) = self.attr_ref(path)?;
        self.inner
            .registry
            .unit(dev, attr)
            .map_err(|e| unreachable_err(path, e))
    }

    fn current_value(&self, path: &str) -> Result<Value, BusError> {
        let (dev, attr) = self.attr_ref(path)?;
        self.inner
            .registry
            .read(dev, attr)
            .map_err(|e| unreachable_err(path, e))
    }

    fn set_value(&self, path: &str, value: Value) -> Result<(), ApplyError> {
        let (dev, attr) = self.attr_ref(path)?;
        self.inner
            .registry
            .write(dev, attr, value)
            .map_err(|e| match e {
                RegistryError::Validation(v) => ApplyError::Validation(v),
                other => ApplyError::Hardware(other.to_string()),
            })
    }

    fn static_value(&self, path: &str) -> Result<String, BusError> {
        match self.inner.objects.get(path) {
            Some(ObjectRef::Uuid(dev)) => self
                .inner
                .registry
                .devices()
                .get(*dev)
                .map(|d| d.uuid.clone())
                .ok_or_else(|| BusError::UnknownPath(path.to_string())),
            Some(ObjectRef::Attr { dev, attr }) => {
                // The unit is a separate property; clients append it.
                let value = self
                    .inner
                    .registry
                    .read(*dev, *attr)
                    .map_err(|e| unreachable_err(path, e))?;
                Ok(value.to_string())
            }
            Some(ObjectRef::Group) => Err(BusError::Protocol {
                path: path.to_string(),
                detail: "group nodes carry no value".to_string(),
            }),
            None => Err(BusError::UnknownPath(path.to_string())),
        }
    }

    fn subscribe(&self, path: &str) -> Result<flume::Receiver<Value>, BusError> {
        // Validate the path up front so a bad subscription fails loudly.
        self.attr_ref(path)?;
        let (tx, rx) = flume::bounded(SIGNAL_BUFFER);
        self.inner
            .subscribers
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push(tx);
        Ok(rx)
    }
}
