use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A tagged hardware value as carried over the bus.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub enum Value {
    Int(i64),
    Uint(u64),
    Double(f64),
}

impl Value {
    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Int(i) => *i as f64,
            Value::Uint(u) => *u as f64,
            Value::Double(d) => *d,
        }
    }

    /// Enumeration key, if this value can act as one.
    pub fn as_key(&self) -> Option<u64> {
        match self {
            Value::Uint(u) => Some(*u),
            Value::Int(i) if *i >= 0 => Some(*i as u64),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Uint(u) => write!(f, "{u}"),
            Value::Double(d) => write!(f, "{d}"),
        }
    }
}

/// Form a string of the form "1000 MHz" if a unit is known.
pub fn render_with_unit(value: &Value, unit: Option<&str>) -> String {
    match unit {
        Some(u) => format!("{value} {u}"),
        None => value.to_string(),
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct EnumEntry {
    pub key: u64,
    pub label: String,
}

/// The legal-value shape of a writable attribute.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum ValueDomain {
    Range {
        min: f64,
        max: f64,
        unit: Option<String>,
    },
    Enumeration { entries: Vec<EnumEntry> },
}

impl ValueDomain {
    pub fn unit(&self) -> Option<&str> {
        match self {
            ValueDomain::Range { unit, .. } => unit.as_deref(),
            ValueDomain::Enumeration { .. } => None,
        }
    }

    /// Label for an enumeration key. First match wins; keys are unique
    /// within one domain so this is deterministic.
    pub fn label_for(&self, key: u64) -> Option<&str> {
        match self {
            ValueDomain::Enumeration { entries } => entries
                .iter()
                .find(|e| e.key == key)
                .map(|e| e.label.as_str()),
            ValueDomain::Range { .. } => None,
        }
    }

    /// Check a proposed value against this domain without contacting
    /// hardware. Rejections here must never be sent remotely.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        match self {
            ValueDomain::Range { min, max, .. } => {
                let v = value.as_f64();
                // Written so NaN fails: every comparison with NaN is
                // false, so the negated form rejects it.
                if !(v >= *min && v <= *max) {
                    return Err(ValidationError::OutOfBounds {
                        value: v,
                        min: *min,
                        max: *max,
                    });
                }
                Ok(())
            }
            ValueDomain::Enumeration { entries } => {
                let key = value
                    .as_key()
                    .ok_or(ValidationError::ShapeMismatch {
                        expected: "enumeration key",
                    })?;
                if entries.iter().any(|e| e.key == key) {
                    Ok(())
                } else {
                    Err(ValidationError::UnknownKey(key))
                }
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("value {value} outside bounds [{min}, {max}]")]
    OutOfBounds { value: f64, min: f64, max: f64 },
    #[error("key {0} not present in enumeration")]
    UnknownKey(u64),
    #[error("value shape does not match domain; expected {expected}")]
    ShapeMismatch { expected: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv_range() -> ValueDomain {
        ValueDomain::Range {
            min: -200.0,
            max: 200.0,
            unit: Some("mV".into()),
        }
    }

    fn fan_modes() -> ValueDomain {
        ValueDomain::Enumeration {
            entries: vec![
                EnumEntry { key: 0, label: "Auto".into() },
                EnumEntry { key: 1, label: "Manual".into() },
            ],
        }
    }

    #[test]
    fn range_accepts_inside_rejects_outside() {
        let dom = mv_range();
        assert!(dom.validate(&Value::Int(50)).is_ok());
        assert!(dom.validate(&Value::Int(-200)).is_ok());
        assert!(dom.validate(&Value::Int(200)).is_ok());
        assert!(matches!(
            dom.validate(&Value::Int(5000)),
            Err(ValidationError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn range_rejects_nan() {
        let dom = mv_range();
        assert!(matches!(
            dom.validate(&Value::Double(f64::NAN)),
            Err(ValidationError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn enumeration_accepts_known_keys_only() {
        let dom = fan_modes();
        assert!(dom.validate(&Value::Uint(1)).is_ok());
        assert_eq!(
            dom.validate(&Value::Uint(7)),
            Err(ValidationError::UnknownKey(7))
        );
        assert!(matches!(
            dom.validate(&Value::Double(1.0)),
            Err(ValidationError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn enumeration_label_lookup() {
        let dom = fan_modes();
        assert_eq!(dom.label_for(1), Some("Manual"));
        assert_eq!(dom.label_for(9), None);
    }

    #[test]
    fn unit_rendering() {
        assert_eq!(
            render_with_unit(&Value::Int(1000), Some("MHz")),
            "1000 MHz"
        );
        assert_eq!(render_with_unit(&Value::Uint(42), None), "42");
    }
}
