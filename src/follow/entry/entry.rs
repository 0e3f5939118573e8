use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::severity::Severity;
use crate::follow::offset_tracker::LineOffset;

/// Entry is one record read from the followed file.
///
/// - `body`: the original line, or a structured value when a parser replaced it
/// - `attributes`: fields extracted by the configured parser
/// - `location`: where the record sits in the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// When the log event occurred (parsed from the record, or observation time)
    pub timestamp: DateTime<Utc>,

    /// Severity level of the log entry
    #[serde(default)]
    pub severity: Severity,

    /// Human-readable severity text as it appeared in the record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity_text: Option<String>,

    /// The log body
    pub body: Value,

    /// Parsed fields
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, Value>,

    /// Byte range of the record in the file
    pub location: LineOffset,
}

impl Entry {
    /// Create a new entry for a raw line found at `location`
    pub fn from_line(line: impl Into<String>, location: LineOffset) -> Self {
        Self {
            timestamp: Utc::now(),
            severity: Severity::default(),
            severity_text: None,
            body: Value::String(line.into()),
            attributes: HashMap::new(),
            location,
        }
    }

    /// Add an attribute to the entry
    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Add a string attribute to the entry
    pub fn add_attribute_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), Value::String(value.into()));
    }

    /// Get the body as a string if it is one
    pub fn body_string(&self) -> Option<&str> {
        self.body.as_str()
    }

    /// Get an attribute as a string if it is one
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    /// Byte offset where this record begins
    pub fn offset(&self) -> u64 {
        self.location.offset
    }
}
