use crate::bus::{ApplyError, ObjectBus};
use crate::model::{render_with_unit, ValidationError, Value, ValueDomain};

/// Commit lifecycle of one writable attribute. Both apply outcomes lead
/// back to `Clean`; the pending value is discarded either way.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitState {
    Clean,
    Dirty,
    Committing,
}

/// Local representative of one writable remote attribute. Buffers edits
/// as a pending value; nothing is sent to hardware until `apply`.
#[derive(Debug)]
pub struct AssignableProxy {
    path: String,
    domain: ValueDomain,
    unit: Option<String>,
    /// Last value obtained: the discovery seed or the most recently
    /// applied value. Stale between commits by design.
    current: Option<Value>,
    /// Snapshot of the discovery-time value, for restore.
    initial: Option<Value>,
    pending: Option<Value>,
    state: CommitState,
}

impl AssignableProxy {
    pub fn new(
        path: impl Into<String>,
        domain: ValueDomain,
        unit: Option<String>,
        seed: Option<Value>,
    ) -> Self {
        AssignableProxy {
            path: path.into(),
            domain,
            unit,
            current: seed,
            initial: seed,
            pending: None,
            state: CommitState::Clean,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn domain(&self) -> &ValueDomain {
        &self.domain
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn state(&self) -> CommitState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.state == CommitState::Dirty
    }

    pub fn current_value(&self) -> Option<Value> {
        self.current
    }

    pub fn pending_value(&self) -> Option<Value> {
        self.pending
    }

    /// Stage a value for the next commit. Validated against the value
    /// domain locally; hardware is not contacted. Staging again before
    /// a commit simply replaces the previous pending value.
    pub fn set_pending(&mut self, value: Value) -> Result<(), ValidationError> {
        self.domain.validate(&value)?;
        self.pending = Some(value);
        self.state = CommitState::Dirty;
        Ok(())
    }

    /// Stage the discovery-time value, undoing all edits on the next
    /// commit.
    pub fn restore_initial(&mut self) -> Result<(), ValidationError> {
        match self.initial {
            Some(value) => self.set_pending(value),
            None => Ok(()),
        }
    }

    /// Push the pending value to the backing object. Success and
    /// failure both clear the pending value and return to `Clean`;
    /// there is no retry with the same value.
    pub fn apply(&mut self, bus: &dyn ObjectBus) -> Result<(), ApplyError> {
        let Some(value) = self.pending.take() else {
            log::warn!("apply() on {} without a pending value", self.path);
            return Ok(());
        };
        self.state = CommitState::Committing;
        let result = bus.set_value(&self.path, value);
        if result.is_ok() {
            self.current = Some(value);
        }
        self.state = CommitState::Clean;
        result
    }

    /// Text for display: enumeration label for the current key, or the
    /// numeric value with its unit. `None` when no value is known or
    /// the value does not fit the domain.
    pub fn display_text(&self) -> Option<String> {
        let current = self.current?;
        match &self.domain {
            ValueDomain::Enumeration { .. } => {
                let key = current.as_key()?;
                self.domain.label_for(key).map(String::from)
            }
            ValueDomain::Range { .. } => {
                Some(render_with_unit(&current, self.unit.as_deref()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EnumEntry;

    fn range_proxy() -> AssignableProxy {
        AssignableProxy::new(
            "/gpu0/power/voltage_offset",
            ValueDomain::Range {
                min: -200.0,
                max: 200.0,
                unit: Some("mV".into()),
            },
            Some("mV".into()),
            Some(Value::Int(0)),
        )
    }

    fn enum_proxy(seed: Option<Value>) -> AssignableProxy {
        AssignableProxy::new(
            "/gpu0/cooling/fan_control_mode",
            ValueDomain::Enumeration {
                entries: vec![
                    EnumEntry { key: 0, label: "Auto".into() },
                    EnumEntry { key: 1, label: "Manual".into() },
                ],
            },
            None,
            seed,
        )
    }

    #[test]
    fn out_of_bounds_pending_is_rejected_and_stays_clean() {
        let mut proxy = range_proxy();
        assert!(proxy.set_pending(Value::Int(5000)).is_err());
        assert!(!proxy.is_dirty());
        assert_eq!(proxy.pending_value(), None);
    }

    #[test]
    fn nan_pending_is_rejected_and_stays_clean() {
        let mut proxy = range_proxy();
        assert!(proxy.set_pending(Value::Double(f64::NAN)).is_err());
        assert!(!proxy.is_dirty());
        assert_eq!(proxy.pending_value(), None);
    }

    #[test]
    fn valid_pending_marks_dirty() {
        let mut proxy = range_proxy();
        proxy.set_pending(Value::Int(50)).unwrap();
        assert!(proxy.is_dirty());
        assert_eq!(proxy.pending_value(), Some(Value::Int(50)));
    }

    #[test]
    fn repeated_pending_overwrites() {
        let mut proxy = range_proxy();
        proxy.set_pending(Value::Int(50)).unwrap();
        proxy.set_pending(Value::Int(-75)).unwrap();
        assert_eq!(proxy.pending_value(), Some(Value::Int(-75)));
    }

    #[test]
    fn enumeration_seed_renders_label() {
        let proxy = enum_proxy(Some(Value::Uint(1)));
        assert_eq!(proxy.display_text().as_deref(), Some("Manual"));
    }

    #[test]
    fn enumeration_seed_with_unknown_key_has_no_label() {
        let proxy = enum_proxy(Some(Value::Uint(9)));
        assert_eq!(proxy.display_text(), None);
    }

    #[test]
    fn mismatched_seed_shape_shows_nothing() {
        let proxy = enum_proxy(Some(Value::Double(0.5)));
        assert_eq!(proxy.display_text(), None);
    }

    #[test]
    fn range_display_includes_unit() {
        let proxy = range_proxy();
        assert_eq!(proxy.display_text().as_deref(), Some("0 mV"));
    }

    #[test]
    fn restore_initial_stages_the_seed_value() {
        let mut proxy = range_proxy();
        proxy.set_pending(Value::Int(120)).unwrap();
        proxy.restore_initial().unwrap();
        assert_eq!(proxy.pending_value(), Some(Value::Int(0)));
        assert!(proxy.is_dirty());
    }
}
