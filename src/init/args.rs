// SPDX-License-Identifier: Apache-2.0

use clap::{Args, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

use crate::follow::config::{FollowConfig, ParserType as ConfigParserType};

/// Parser type for log parsing
#[derive(Copy, Clone, Debug, Default, ValueEnum, Deserialize, PartialEq, Eq)]
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

impl From<ParserType> for ConfigParserType {
    fn from(p: ParserType) -> Self {
        match p {
            ParserType::None => ConfigParserType::None,
            ParserType::Json => ConfigParserType::Json,
            ParserType::Regex => ConfigParserType::Regex,
        }
    }
}

/// Arguments of `logfollow follow`.
///
/// Tuning flags are optional: when absent, the value comes from the
/// configuration file, then `LOGFOLLOW_*` environment variables, then the
/// built-in default.
#[derive(Debug, Args, Clone)]
pub struct FollowArgs {
    /// Log file to follow
    #[arg(env = "LOGFOLLOW_FILE")]
    pub file: PathBuf,

    /// TOML configuration file
    #[arg(long, env = "LOGFOLLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Delay between two read cycles in milliseconds
    #[arg(long)]
    pub idle_delay_ms: Option<u64>,

    /// Backstop timeout in milliseconds for the paused wait
    #[arg(long)]
    pub pause_wait_hint_ms: Option<u64>,

    /// Begin paused; entries flow after a `resume` command on stdin
    #[arg(long)]
    pub start_paused: Option<bool>,

    /// Maximum log record size in bytes (longer records are truncated)
    #[arg(long)]
    pub max_log_size: Option<usize>,

    /// Parser type: none, json, regex
    #[arg(value_enum, long)]
    pub parser: Option<ParserType>,

    /// Regex pattern with named capture groups (when parser=regex)
    #[arg(long)]
    pub regex_pattern: Option<String>,

    /// Capture group holding the record timestamp (when parser=regex)
    #[arg(long, requires = "regex_timestamp_format")]
    pub regex_timestamp_field: Option<String>,

    /// Chrono format of the timestamp capture group
    #[arg(long, requires = "regex_timestamp_field")]
    pub regex_timestamp_format: Option<String>,

    /// Keep lines that are not JSON objects as plain entries (when parser=json)
    #[arg(long)]
    pub json_lenient: Option<bool>,

    /// Capacity of the event queue between the tail loop and stdout
    #[arg(long)]
    pub event_channel_size: Option<usize>,
}

impl FollowArgs {
    /// Overlay every flag given on the command line onto `config`.
    pub fn apply(&self, config: &mut FollowConfig) {
        if let Some(v) = self.idle_delay_ms {
            config.idle_delay_ms = v;
        }
        if let Some(v) = self.pause_wait_hint_ms {
            config.pause_wait_hint_ms = v;
        }
        if let Some(v) = self.start_paused {
            config.start_paused = v;
        }
        if let Some(v) = self.max_log_size {
            config.max_log_size = v;
        }
        if let Some(v) = self.parser {
            config.parser = v.into();
        }
        if let Some(v) = &self.regex_pattern {
            config.regex_pattern = Some(v.clone());
        }
        if let Some(v) = &self.regex_timestamp_field {
            config.regex_timestamp_field = Some(v.clone());
        }
        if let Some(v) = &self.regex_timestamp_format {
            config.regex_timestamp_format = Some(v.clone());
        }
        if let Some(v) = self.json_lenient {
            config.json_lenient = v;
        }
        if let Some(v) = self.event_channel_size {
            config.event_channel_size = v;
        }
    }
}
