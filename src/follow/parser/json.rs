// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::traits::Parser;
use crate::follow::entry::{Entry, Severity};
use crate::follow::error::{Error, Result};

const SEVERITY_KEYS: &[&str] = &["level", "severity", "lvl"];
const TIMESTAMP_KEYS: &[&str] = &["timestamp", "time", "ts", "@timestamp"];

/// A parser that lifts the fields of JSON-object lines into attributes.
///
/// A string `level`/`severity` field sets the entry severity and an RFC 3339
/// `timestamp`/`time` field sets the entry timestamp. The body is kept as the
/// original line.
#[derive(Debug, Clone, Default)]
pub struct JsonParser {
    /// If true, lines that are not JSON objects pass through unchanged.
    /// If false, they are rejected with an error.
    lenient: bool,
}

impl JsonParser {
    /// Create a new JsonParser with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a lenient JsonParser that passes non-JSON lines through.
    pub fn lenient() -> Self {
        Self { lenient: true }
    }

    /// Set whether the parser is lenient.
    pub fn with_lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    fn reject(&self, entry: Entry, reason: String) -> Result<Entry> {
        if self.lenient {
            Ok(entry)
        } else {
            Err(Error::Config(reason))
        }
    }
}

impl Parser for JsonParser {
    fn parse(&self, mut entry: Entry) -> Result<Entry> {
        let parsed: Value = match entry.body_string().map(serde_json::from_str) {
            Some(Ok(v)) => v,
            Some(Err(e)) => return self.reject(entry, format!("invalid JSON: {}", e)),
            None => return self.reject(entry, "body is not a string".to_string()),
        };

        let map = match parsed {
            Value::Object(map) => map,
            _ => {
                return self.reject(
                    entry,
                    "JSON must be an object at the top level".to_string(),
                );
            }
        };

        for (key, value) in map {
            if let Value::String(s) = &value {
                if SEVERITY_KEYS.contains(&key.as_str()) {
                    if let Ok(severity) = s.parse::<Severity>() {
                        entry.severity = severity;
                    }
                    entry.severity_text = Some(s.clone());
                } else if TIMESTAMP_KEYS.contains(&key.as_str()) {
                    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
                        entry.timestamp = ts.with_timezone(&Utc);
                    }
                }
            }
            entry.add_attribute(key, value);
        }

        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::follow::offset_tracker::LineOffset;

    fn line(body: &str) -> Entry {
        Entry::from_line(body, LineOffset::new(0, body.len() as u32 + 1))
    }

    #[test]
    fn test_json_parser_object() {
        let parser = JsonParser::new();
        let entry = parser
            .parse(line(r#"{"msg":"hello","count":3,"ok":true}"#))
            .unwrap();

        assert_eq!(entry.attribute_str("msg"), Some("hello"));
        assert_eq!(entry.attributes.get("count"), Some(&Value::from(3)));
        assert_eq!(entry.attributes.get("ok"), Some(&Value::Bool(true)));
        assert_eq!(
            entry.body_string(),
            Some(r#"{"msg":"hello","count":3,"ok":true}"#)
        );
    }

    #[test]
    fn test_json_parser_severity_and_timestamp() {
        let parser = JsonParser::new();
        let entry = parser
            .parse(line(
                r#"{"level":"WARN","time":"2024-03-01T12:00:00Z","msg":"slow"}"#,
            ))
            .unwrap();

        assert_eq!(entry.severity, Severity::Warning);
        assert_eq!(entry.severity_text.as_deref(), Some("WARN"));
        assert_eq!(entry.timestamp.to_rfc3339(), "2024-03-01T12:00:00+00:00");
    }

    #[test]
    fn test_json_parser_array_not_object() {
        let parser = JsonParser::new();
        assert!(parser.parse(line("[1,2,3]")).is_err());
    }

    #[test]
    fn test_json_parser_invalid_json() {
        let parser = JsonParser::new();
        assert!(parser.parse(line("not json")).is_err());
    }

    #[test]
    fn test_json_parser_lenient_invalid() {
        let parser = JsonParser::lenient();
        let entry = parser.parse(line("not json")).unwrap();
        assert_eq!(entry.body_string(), Some("not json"));
        assert!(entry.attributes.is_empty());
    }

    #[test]
    fn test_json_parser_nested() {
        let parser = JsonParser::new();
        let entry = parser
            .parse(line(r#"{"http":{"status":500},"tags":["a","b"]}"#))
            .unwrap();

        assert_eq!(
            entry.attributes.get("http"),
            Some(&serde_json::json!({"status": 500}))
        );
        assert_eq!(
            entry.attributes.get("tags"),
            Some(&serde_json::json!(["a", "b"]))
        );
    }
}
