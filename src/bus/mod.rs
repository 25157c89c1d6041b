pub mod local;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ValidationError, Value, ValueDomain};

/// One remote object as advertised by the control service: a path to
/// reach it, a declared interface, and its children in display order.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ObjectDescriptor {
    pub path: String,
    pub interface: String,
    #[serde(default)]
    pub children: Vec<ObjectDescriptor>,
}

impl ObjectDescriptor {
    pub fn new(path: impl Into<String>, interface: impl Into<String>) -> Self {
        ObjectDescriptor {
            path: path.into(),
            interface: interface.into(),
            children: Vec::new(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BusError {
    #[error("object {0} is unreachable")]
    Unreachable(String),
    #[error("no object at path {0}")]
    UnknownPath(String),
    #[error("unexpected reply shape from {path}: {detail}")]
    Protocol { path: String, detail: String },
}

/// Outcome of pushing one pending value to its backing object.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("hardware rejected the write: {0}")]
    Hardware(String),
    #[error(transparent)]
    Bus(#[from] BusError),
}

/// Transport-agnostic view of the control service: object paths plus
/// property/method/signal access. Implementations must be shareable
/// across threads; per-item writes may be issued concurrently.
pub trait ObjectBus: Send + Sync {
    /// Descriptor tree as currently exported by the service.
    fn root(&self) -> Result<ObjectDescriptor, BusError>;

    /// Human-readable name of a node (the generic node property).
    fn node_name(&self, path: &str) -> Result<String, BusError>;

    /// `assignableInfo` property of an assignable object.
    fn assignable_info(&self, path: &str) -> Result<ValueDomain, BusError>;

    /// `unit` property; the remote call is fallible and a missing unit
    /// is not an error.
    fn unit(&self, path: &str) -> Result<Option<String>, BusError>;

    /// One synchronous read of an assignable or readable object.
    fn current_value(&self, path: &str) -> Result<Value, BusError>;

    /// Push one value to an assignable object. Validation failures are
    /// resolved service-side without touching hardware.
    fn set_value(&self, path: &str, value: Value) -> Result<(), ApplyError>;

    /// `value` property of a static readable, read once at discovery.
    fn static_value(&self, path: &str) -> Result<String, BusError>;

    /// Subscribe to the value-changed signal of a dynamic readable.
    fn subscribe(&self, path: &str) -> Result<flume::Receiver<Value>, BusError>;
}
