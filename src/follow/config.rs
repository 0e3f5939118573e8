// SPDX-License-Identifier: Apache-2.0

//! Configuration for a log follower.

use serde::Deserialize;
use std::time::Duration;

/// Line-level parser applied to every record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParserType {
    /// No parsing, raw log lines
    #[default]
    None,
    /// Parse as JSON
    Json,
    /// Parse with regex pattern
    Regex,
}

impl std::str::FromStr for ParserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "lines" => Ok(ParserType::None),
            "json" => Ok(ParserType::Json),
            "regex" => Ok(ParserType::Regex),
            _ => Err(format!(
                "Invalid parser '{}'. Valid options: none, json, regex",
                s
            )),
        }
    }
}

/// Configuration for a [`LogFollower`](crate::follow::LogFollower)
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FollowConfig {
    /// Idle delay between two read cycles (in milliseconds)
    pub idle_delay_ms: u64,

    /// Backstop timeout for the paused wait (in milliseconds). Resume and
    /// stop wake the loop directly; this only bounds a missed notification.
    pub pause_wait_hint_ms: u64,

    /// Whether a new follower starts out paused
    pub start_paused: bool,

    /// Maximum size of a single log record (in bytes); longer records are truncated
    pub max_log_size: usize,

    /// Line-level parser
    pub parser: ParserType,

    /// Regex pattern with named capture groups (when parser is Regex)
    pub regex_pattern: Option<String>,

    /// Capture group holding the record timestamp (when parser is Regex)
    pub regex_timestamp_field: Option<String>,

    /// Chrono format of the timestamp capture group
    pub regex_timestamp_format: Option<String>,

    /// Keep lines that are not valid JSON objects as plain entries (when parser is Json)
    pub json_lenient: bool,

    /// Capacity of the event channel used by channel-based consumers
    pub event_channel_size: usize,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            idle_delay_ms: 1000,
            pause_wait_hint_ms: 1000,
            start_paused: true,
            max_log_size: 1024 * 1024, // 1MB
            parser: ParserType::None,
            regex_pattern: None,
            regex_timestamp_field: None,
            regex_timestamp_format: None,
            json_lenient: true,
            event_channel_size: 1024,
        }
    }
}

impl FollowConfig {
    /// Get the idle delay as a Duration
    pub fn idle_delay(&self) -> Duration {
        Duration::from_millis(self.idle_delay_ms)
    }

    /// Get the paused-wait backstop as a Duration
    pub fn pause_wait_hint(&self) -> Duration {
        Duration::from_millis(self.pause_wait_hint_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.idle_delay_ms == 0 {
            return Err("idle_delay_ms must be positive".to_string());
        }

        if self.pause_wait_hint_ms == 0 {
            return Err("pause_wait_hint_ms must be positive".to_string());
        }

        if self.max_log_size == 0 {
            return Err("max_log_size must be positive".to_string());
        }

        if self.event_channel_size == 0 {
            return Err("event_channel_size must be positive".to_string());
        }

        if self.parser == ParserType::Regex && self.regex_pattern.is_none() {
            return Err("Regex pattern must be specified when parser is 'regex'".to_string());
        }

        if self.regex_timestamp_field.is_some() != self.regex_timestamp_format.is_some() {
            return Err(
                "regex_timestamp_field and regex_timestamp_format must be set together"
                    .to_string(),
            );
        }

        Ok(())
    }
}
