use crate::model::{render_with_unit, Value};

/// Local representative of one live read-only value. Updates arrive on
/// a channel from the bus; the consumer drains them at its own pace and
/// only the newest value is kept.
#[derive(Debug)]
pub struct DynamicReadableProxy {
    path: String,
    unit: Option<String>,
    updates: flume::Receiver<Value>,
    latest: Option<Value>,
}

impl DynamicReadableProxy {
    pub fn new(
        path: impl Into<String>,
        unit: Option<String>,
        updates: flume::Receiver<Value>,
    ) -> Self {
        DynamicReadableProxy {
            path: path.into(),
            unit,
            updates,
            latest: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Drain queued updates, keeping the newest. Returns true if the
    /// value changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        for value in self.updates.try_iter() {
            if self.latest != Some(value) {
                changed = true;
            }
            self.latest = Some(value);
        }
        changed
    }

    pub fn latest(&self) -> Option<Value> {
        self.latest
    }

    pub fn latest_text(&self) -> Option<String> {
        self.latest
            .map(|v| render_with_unit(&v, self.unit.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_keeps_only_the_newest_value() {
        let (tx, rx) = flume::bounded(8);
        let mut proxy = DynamicReadableProxy::new("/gpu0/cooling/temperature", Some("°C".into()), rx);
        tx.send(Value::Int(50)).unwrap();
        tx.send(Value::Int(51)).unwrap();
        tx.send(Value::Int(54)).unwrap();
        assert!(proxy.poll());
        assert_eq!(proxy.latest(), Some(Value::Int(54)));
        assert_eq!(proxy.latest_text().as_deref(), Some("54 °C"));
    }

    #[test]
    fn poll_without_updates_reports_no_change() {
        let (_tx, rx) = flume::bounded::<Value>(8);
        let mut proxy = DynamicReadableProxy::new("/gpu0/power/voltage", None, rx);
        assert!(!proxy.poll());
        assert_eq!(proxy.latest_text(), None);
    }
}
