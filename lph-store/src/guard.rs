use lph_core::Record;
use serde_json::Value;

/// Field-equality precondition for a conditional write
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteGuard {
    expected: Vec<(String, Value)>,
}

impl WriteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to currently equal `value`
    pub fn field(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.expected.push((field.into(), value.into()));
        self
    }

    pub fn expected(&self) -> &[(String, Value)] {
        &self.expected
    }

    /// Whether `record` satisfies every expectation. A missing field
    /// only matches an expected `null`.
    pub fn matches(&self, record: &Record) -> bool {
        self.expected
            .iter()
            .all(|(field, value)| record.get(field).unwrap_or(&Value::Null) == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_guard_matching() {
        let record = match json!({"status": "InProgress", "inProgressBy": "ahmad"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };

        assert!(WriteGuard::new().matches(&record));
        assert!(WriteGuard::new()
            .field("status", "InProgress")
            .field("inProgressBy", "ahmad")
            .matches(&record));
        assert!(!WriteGuard::new().field("status", "Pending").matches(&record));
        assert!(!WriteGuard::new().field("completedBy", "ahmad").matches(&record));
        assert!(WriteGuard::new().field("completedBy", Value::Null).matches(&record));
    }
}
