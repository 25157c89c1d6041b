#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use tunectl::bus::{ApplyError, BusError, ObjectBus, ObjectDescriptor};
use tunectl::constants::interfaces;
use tunectl::model::{Value, ValueDomain};

/// Scripted in-memory bus for exercising discovery and commit without
/// a backend. Individual paths can be marked broken (all property
/// queries fail) or write-failing (hardware rejects the value), and
/// every accepted write is recorded for call-count assertions.
pub struct ScriptedBus {
    root: ObjectDescriptor,
    names: HashMap<String, String>,
    domains: HashMap<String, ValueDomain>,
    units: HashMap<String, String>,
    currents: HashMap<String, Value>,
    statics: HashMap<String, String>,
    broken: HashSet<String>,
    failing_writes: HashSet<String>,
    writes: Mutex<Vec<(String, Value)>>,
    update_senders: Mutex<HashMap<String, flume::Sender<Value>>>,
}

impl ScriptedBus {
    pub fn new(root: ObjectDescriptor) -> Self {
        ScriptedBus {
            root,
            names: HashMap::new(),
            domains: HashMap::new(),
            units: HashMap::new(),
            currents: HashMap::new(),
            statics: HashMap::new(),
            broken: HashSet::new(),
            failing_writes: HashSet::new(),
            writes: Mutex::new(Vec::new()),
            update_senders: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_name(mut self, path: &str, name: &str) -> Self {
        self.names.insert(path.to_string(), name.to_string());
        self
    }

    pub fn with_assignable(
        mut self,
        path: &str,
        domain: ValueDomain,
        unit: Option<&str>,
        current: Value,
    ) -> Self {
        self.domains.insert(path.to_string(), domain);
        if let Some(unit) = unit {
            self.units.insert(path.to_string(), unit.to_string());
        }
        self.currents.insert(path.to_string(), current);
        self
    }

    pub fn with_static(mut self, path: &str, value: &str) -> Self {
        self.statics.insert(path.to_string(), value.to_string());
        self
    }

    /// All property queries against this path will fail.
    pub fn with_broken(mut self, path: &str) -> Self {
        self.broken.insert(path.to_string());
        self
    }

    /// Writes to this path are accepted locally but rejected by the
    /// "hardware".
    pub fn with_failing_write(mut self, path: &str) -> Self {
        self.failing_writes.insert(path.to_string());
        self
    }

    /// Values actually written, in arrival order.
    pub fn recorded_writes(&self) -> Vec<(String, Value)> {
        self.writes.lock().unwrap().clone()
    }

    /// Push one update to a subscribed dynamic readable.
    pub fn push_update(&self, path: &str, value: Value) {
        let senders = self.update_senders.lock().unwrap();
        if let Some(tx) = senders.get(path) {
            let _ = tx.try_send(value);
        }
    }

    fn check_reachable(&self, path: &str) -> Result<(), BusError> {
        if self.broken.contains(path) {
            Err(BusError::Unreachable(path.to_string()))
        } else {
            Ok(())
        }
    }
}

impl ObjectBus for ScriptedBus {
    fn root(&self) -> Result<ObjectDescriptor, BusError> {
        Ok(self.root.clone())
    }

    fn node_name(&self, path: &str) -> Result<String, BusError> {
        self.check_reachable(path)?;
        self.names
            .get(path)
            .cloned()
            .ok_or_else(|| BusError::UnknownPath(path.to_string()))
    }

    fn assignable_info(&self, path: &str) -> Result<ValueDomain, BusError> {
        self.check_reachable(path)?;
        self.domains
            .get(path)
            .cloned()
            .ok_or_else(|| BusError::UnknownPath(path.to_string()))
    }

    fn unit(&self, path: &str) -> Result<Option<String>, BusError> {
        self.check_reachable(path)?;
        Ok(self.units.get(path).cloned())
    }

    fn current_value(&self, path: &str) -> Result<Value, BusError> {
        self.check_reachable(path)?;
        self.currents
            .get(path)
            .copied()
            .ok_or_else(|| BusError::UnknownPath(path.to_string()))
    }

    fn set_value(&self, path: &str, value: Value) -> Result<(), ApplyError> {
        self.check_reachable(path)
            .map_err(|_| ApplyError::Hardware("device unreachable".to_string()))?;
        if self.failing_writes.contains(path) {
            return Err(ApplyError::Hardware("write refused".to_string()));
        }
        self.writes.lock().unwrap().push((path.to_string(), value));
        Ok(())
    }

    fn static_value(&self, path: &str) -> Result<String, BusError> {
        self.check_reachable(path)?;
        self.statics
            .get(path)
            .cloned()
            .ok_or_else(|| BusError::UnknownPath(path.to_string()))
    }

    fn subscribe(&self, path: &str) -> Result<flume::Receiver<Value>, BusError> {
        self.check_reachable(path)?;
        let (tx, rx) = flume::bounded(16);
        self.update_senders
            .lock()
            .unwrap()
            .insert(path.to_string(), tx);
        Ok(rx)
    }
}

/// A small fixed tree: one device group with two assignables, one
/// dynamic readable and one static readable.
pub fn demo_descriptor() -> ObjectDescriptor {
    let mut root = ObjectDescriptor::new("/", interfaces::GROUP);
    let mut dev = ObjectDescriptor::new("/gpu0", interfaces::GROUP);
    dev.children.push(ObjectDescriptor::new(
        "/gpu0/voltage_offset",
        interfaces::ASSIGNABLE,
    ));
    dev.children.push(ObjectDescriptor::new(
        "/gpu0/fan_control_mode",
        interfaces::ASSIGNABLE,
    ));
    dev.children.push(ObjectDescriptor::new(
        "/gpu0/temperature",
        interfaces::DYNAMIC_READABLE,
    ));
    dev.children.push(ObjectDescriptor::new(
        "/gpu0/uuid",
        interfaces::STATIC_READABLE,
    ));
    root.children.push(dev);
    root
}

pub fn demo_bus() -> ScriptedBus {
    use tunectl::model::EnumEntry;

    ScriptedBus::new(demo_descriptor())
        .with_name("/", "root")
        .with_name("/gpu0", "Demo GPU")
        .with_name("/gpu0/voltage_offset", "Voltage offset")
        .with_name("/gpu0/fan_control_mode", "Fan control mode")
        .with_name("/gpu0/temperature", "Temperature")
        .with_name("/gpu0/uuid", "UUID")
        .with_assignable(
            "/gpu0/voltage_offset",
            ValueDomain::Range {
                min: -200.0,
                max: 200.0,
                unit: Some("mV".into()),
            },
            Some("mV"),
            Value::Int(0),
        )
        .with_assignable(
            "/gpu0/fan_control_mode",
            ValueDomain::Enumeration {
                entries: vec![
                    EnumEntry { key: 0, label: "Auto".into() },
                    EnumEntry { key: 1, label: "Manual".into() },
                ],
            },
            None,
            Value::Uint(1),
        )
        .with_static("/gpu0/uuid", "GPU-DEMO-0000")
}
