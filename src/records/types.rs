use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Top-level shape of a bug tickets file: `{ "bugs": [ ... ] }`.
/// A file without a `bugs` key parses as an empty collection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BugFile {
    #[serde(default)]
    pub bugs: Vec<BugEntry>,
}

/// A bug ticket exactly as it appears in the input file.
///
/// Kept as raw JSON so that one incomplete or mistyped ticket does not
/// reject the whole file. `BugEntry::validate` turns it into a
/// [`BugRecord`] or names the offending field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct BugEntry {
    raw: Value,
}

/// A validated bug ticket. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BugRecord {
    /// Unique identifier within a run (e.g., "BUG-001")
    pub id: String,
    pub title: String,
    pub description: String,
    /// Raw severity text; mapped to a label by `issue::labels`
    pub severity: String,
    /// Raw priority text; mapped to a label by `issue::labels`
    pub priority: String,
    /// Bug category (e.g., "logic", "ui")
    pub kind: String,
    /// Source file the bug was found in
    pub file: String,
    pub line_number: Option<u64>,
    pub steps_to_reproduce: Vec<String>,
    pub expected_behavior: String,
    pub actual_behavior: String,
    /// Extra labels attached after the severity and priority labels
    pub labels: Vec<String>,
}

/// A ticket lacks a field the issue body needs, or holds it with the
/// wrong JSON type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRecordError {
    #[error("bug {} is missing required field `{field}`", .id.as_deref().unwrap_or("<no id>"))]
    Missing {
        id: Option<String>,
        field: &'static str,
    },

    #[error("bug {} has field `{field}` of the wrong type, expected {expected}", .id.as_deref().unwrap_or("<no id>"))]
    WrongType {
        id: Option<String>,
        field: &'static str,
        expected: &'static str,
    },
}

impl MalformedRecordError {
    pub fn field(&self) -> &'static str {
        match self {
            MalformedRecordError::Missing { field, .. } => field,
            MalformedRecordError::WrongType { field, .. } => field,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            MalformedRecordError::Missing { id, .. } => id.as_deref(),
            MalformedRecordError::WrongType { id, .. } => id.as_deref(),
        }
    }
}

impl From<Value> for BugEntry {
    fn from(raw: Value) -> Self {
        Self { raw }
    }
}

impl BugEntry {
    /// Check every field, in the order they appear in a rendered issue.
    /// `null` counts as absent.
    pub fn validate(&self) -> Result<BugRecord, MalformedRecordError> {
        if !self.raw.is_object() {
            return Err(self.wrong_type("bug", "an object"));
        }

        Ok(BugRecord {
            id: self.required_str("id")?,
            title: self.required_str("title")?,
            description: self.required_str("description")?,
            severity: self.required_str("severity")?,
            priority: self.required_str("priority")?,
            kind: self.required_str("type")?,
            file: self.required_str("file")?,
            line_number: self.optional_u64("line_number")?,
            steps_to_reproduce: self.str_list("steps_to_reproduce")?,
            expected_behavior: self.required_str("expected_behavior")?,
            actual_behavior: self.required_str("actual_behavior")?,
            labels: self.str_list("labels")?,
        })
    }

    /// Identifier used in log lines, even for tickets without an id.
    pub fn display_id(&self) -> &str {
        self.id().unwrap_or("<no id>")
    }

    fn id(&self) -> Option<&str> {
        self.raw.get("id").and_then(Value::as_str)
    }

    fn field(&self, name: &str) -> Option<&Value> {
        self.raw.get(name).filter(|v| !v.is_null())
    }

    fn required_str(&self, name: &'static str) -> Result<String, MalformedRecordError> {
        match self.field(name) {
            None => Err(MalformedRecordError::Missing {
                id: self.id().map(String::from),
                field: name,
            }),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(self.wrong_type(name, "a string")),
        }
    }

    fn optional_u64(&self, name: &'static str) -> Result<Option<u64>, MalformedRecordError> {
        match self.field(name) {
            None => Ok(None),
            Some(v) => v
                .as_u64()
                .map(Some)
                .ok_or_else(|| self.wrong_type(name, "a non-negative integer")),
        }
    }

    fn str_list(&self, name: &'static str) -> Result<Vec<String>, MalformedRecordError> {
        let Some(value) = self.field(name) else {
            return Ok(Vec::new());
        };
        let items = value
            .as_array()
            .ok_or_else(|| self.wrong_type(name, "a list of strings"))?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(String::from)
                    .ok_or_else(|| self.wrong_type(name, "a list of strings"))
            })
            .collect()
    }

    fn wrong_type(&self, field: &'static str, expected: &'static str) -> MalformedRecordError {
        MalformedRecordError::WrongType {
            id: self.id().map(String::from),
            field,
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete_json() -> Value {
        json!({
            "id": "BUG-1",
            "title": "Crash on save",
            "description": "Saving an empty list crashes",
            "severity": "high",
            "priority": "medium",
            "type": "logic",
            "file": "script.js",
            "line_number": 12,
            "steps_to_reproduce": ["Open app"],
            "expected_behavior": "List is saved",
            "actual_behavior": "Exception",
            "labels": ["bug"]
        })
    }

    fn entry_with(field: &str, value: Value) -> BugEntry {
        let mut raw = complete_json();
        raw[field] = value;
        BugEntry::from(raw)
    }

    #[test]
    fn test_validate_complete_entry() {
        let record = BugEntry::from(complete_json()).validate().unwrap();
        assert_eq!(record.id, "BUG-1");
        assert_eq!(record.kind, "logic");
        assert_eq!(record.line_number, Some(12));
        assert_eq!(record.labels, vec!["bug".to_string()]);
    }

    #[test]
    fn test_validate_names_missing_field() {
        let mut raw = complete_json();
        raw.as_object_mut().unwrap().remove("expected_behavior");
        let err = BugEntry::from(raw).validate().unwrap_err();
        assert_eq!(err.field(), "expected_behavior");
        assert_eq!(err.id(), Some("BUG-1"));
        assert_eq!(
            err.to_string(),
            "bug BUG-1 is missing required field `expected_behavior`"
        );
    }

    #[test]
    fn test_null_required_field_is_missing() {
        let err = entry_with("description", Value::Null).validate().unwrap_err();
        assert!(matches!(err, MalformedRecordError::Missing { field: "description", .. }));
    }

    #[test]
    fn test_validate_missing_id() {
        let mut raw = complete_json();
        raw.as_object_mut().unwrap().remove("id");
        let err = BugEntry::from(raw).validate().unwrap_err();
        assert_eq!(err.field(), "id");
        assert!(err.to_string().contains("<no id>"));
    }

    #[test]
    fn test_optional_fields_may_be_absent() {
        let mut raw = complete_json();
        let obj = raw.as_object_mut().unwrap();
        obj.remove("line_number");
        obj.remove("steps_to_reproduce");
        obj.insert("labels".to_string(), Value::Null);
        let record = BugEntry::from(raw).validate().unwrap();
        assert!(record.line_number.is_none());
        assert!(record.steps_to_reproduce.is_empty());
        assert!(record.labels.is_empty());
    }

    #[test]
    fn test_mistyped_fields_name_the_field() {
        let cases = [
            ("line_number", json!("42")),
            ("line_number", json!(-3)),
            ("severity", json!(3)),
            ("labels", json!("bug")),
            ("steps_to_reproduce", json!(["ok", 2])),
        ];
        for (field, value) in cases {
            let err = entry_with(field, value).validate().unwrap_err();
            assert!(matches!(err, MalformedRecordError::WrongType { .. }), "{field}");
            assert_eq!(err.field(), field);
            assert_eq!(err.id(), Some("BUG-1"));
        }
    }

    #[test]
    fn test_non_object_entry() {
        let entry = BugEntry::from(json!("BUG-1"));
        assert_eq!(entry.display_id(), "<no id>");
        assert_eq!(entry.validate().unwrap_err().field(), "bug");
    }

    #[test]
    fn test_deserialize_type_field() {
        let entry: BugEntry =
            serde_json::from_str(r#"{"id": "BUG-2", "type": "ui", "unknown": 1}"#).unwrap();
        assert_eq!(entry.display_id(), "BUG-2");
        assert_eq!(entry.validate().unwrap_err().field(), "title");
    }
}
