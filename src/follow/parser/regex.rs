// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;

use super::traits::Parser;
use crate::follow::entry::{Entry, Severity};
use crate::follow::error::{Error, Result};

/// A parser that extracts fields from a line using a regular expression
/// with named capture groups.
///
/// A group named `level` or `severity` also sets the entry severity.
pub struct RegexParser {
    regex: Regex,
    /// Names of the capture groups (excluding the full match)
    group_names: Vec<String>,
    /// Optional field name that contains a timestamp to parse
    timestamp_field: Option<String>,
    /// Chrono format string for parsing the timestamp field
    timestamp_format: Option<String>,
}

impl RegexParser {
    /// Create a new RegexParser from a regex pattern string.
    ///
    /// The pattern must contain at least one named capture group using
    /// the `(?P<name>...)` syntax.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex =
            Regex::new(pattern).map_err(|e| Error::Regex(format!("invalid regex pattern: {}", e)))?;

        let group_names: Vec<String> = regex
            .capture_names()
            .skip(1) // Skip the full match (index 0)
            .filter_map(|name| name.map(|s| s.to_string()))
            .collect();

        if group_names.is_empty() {
            return Err(Error::Regex(
                "regex pattern must contain at least one named capture group (use (?P<name>...) syntax)".to_string()
            ));
        }

        Ok(Self {
            regex,
            group_names,
            timestamp_field: None,
            timestamp_format: None,
        })
    }

    /// Configure a capture group to be parsed as the entry timestamp using
    /// a chrono format string (e.g. `"%d/%b/%Y:%H:%M:%S %z"`).
    pub fn with_timestamp(mut self, field: impl Into<String>, format: impl Into<String>) -> Self {
        self.timestamp_field = Some(field.into());
        self.timestamp_format = Some(format.into());
        self
    }

    /// Get the names of the capture groups in this regex
    pub fn group_names(&self) -> &[String] {
        &self.group_names
    }

    fn parse_timestamp(&self, value: &str) -> Option<DateTime<Utc>> {
        let format = self.timestamp_format.as_deref()?;
        // Try the configured format first (may include timezone)
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
        // Naive datetime, assume UTC
        NaiveDateTime::parse_from_str(value, format)
            .ok()
            .map(|dt| dt.and_utc())
    }
}

impl Parser for RegexParser {
    fn parse(&self, mut entry: Entry) -> Result<Entry> {
        let line = entry.body_string().unwrap_or_default().to_string();
        let captures = self.regex.captures(&line).ok_or_else(|| {
            Error::Regex(format!(
                "regex pattern does not match input: {:?}",
                line.chars().take(100).collect::<String>()
            ))
        })?;

        for name in &self.group_names {
            if let Some(m) = captures.name(name) {
                let value = m.as_str();

                if self.timestamp_field.as_deref() == Some(name.as_str()) {
                    if let Some(ts) = self.parse_timestamp(value) {
                        entry.timestamp = ts;
                    }
                }

                if name == "level" || name == "severity" {
                    if let Ok(severity) = value.parse::<Severity>() {
                        entry.severity = severity;
                    }
                    entry.severity_text = Some(value.to_string());
                }

                entry.add_attribute_string(name.clone(), value);
            }
        }

        Ok(entry)
    }
}
