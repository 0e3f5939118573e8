use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity indicates the seriousness of a log entry.
/// Values are aligned with OpenTelemetry severity numbers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "SeverityRepr", into = "SeverityRepr")]
#[repr(u8)]
pub enum Severity {
    /// Unknown severity
    #[default]
    Default = 0,
    /// Detailed debugging
    Trace = 10,
    /// Debugging purposes
    Debug = 20,
    /// High level application details
    Info = 30,
    /// Should be noticed
    Notice = 40,
    /// Someone should look into this
    Warning = 50,
    /// Something undesirable happened
    Error = 60,
    /// Requires immediate attention
    Critical = 70,
    /// Action must be taken immediately
    Alert = 80,
    /// Application is unusable
    Emergency = 90,
}

impl Severity {
    /// Best-effort severity detection from the leading token of a plain text
    /// line, e.g. `"WARN disk almost full"` or `"[error] boom"`.
    pub fn sniff(line: &str) -> Self {
        let token = line
            .split_whitespace()
            .next()
            .unwrap_or("")
            .trim_matches(|c: char| !c.is_ascii_alphabetic());
        token.parse().unwrap_or_default()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Default => "default",
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
            Self::Alert => "alert",
            Self::Emergency => "emergency",
        };
        write!(f, "{}", name)
    }
}

impl TryFrom<u8> for Severity {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, <Self as TryFrom<u8>>::Error> {
        match value {
            0 => Ok(Self::Default),
            10 => Ok(Self::Trace),
            20 => Ok(Self::Debug),
            30 => Ok(Self::Info),
            40 => Ok(Self::Notice),
            50 => Ok(Self::Warning),
            60 => Ok(Self::Error),
            70 => Ok(Self::Critical),
            80 => Ok(Self::Alert),
            90 => Ok(Self::Emergency),
            _ => Err(format!("invalid severity value: {}", value)),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "trace" => Ok(Self::Trace),
            "debug" | "dbg" => Ok(Self::Debug),
            "info" | "information" => Ok(Self::Info),
            "notice" => Ok(Self::Notice),
            "warning" | "warn" => Ok(Self::Warning),
            "error" | "err" => Ok(Self::Error),
            "critical" | "crit" | "fatal" => Ok(Self::Critical),
            "alert" => Ok(Self::Alert),
            "emergency" | "emerg" | "panic" => Ok(Self::Emergency),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

// Helper type for serde serialization
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SeverityRepr {
    Number(u8),
    String(String),
}

impl TryFrom<SeverityRepr> for Severity {
    type Error = String;

    fn try_from(repr: SeverityRepr) -> Result<Self, <Self as TryFrom<SeverityRepr>>::Error> {
        match repr {
            SeverityRepr::Number(n) => Self::try_from(n),
            SeverityRepr::String(s) => s.parse(),
        }
    }
}

impl From<Severity> for SeverityRepr {
    fn from(s: Severity) -> Self {
        SeverityRepr::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("info".parse::<Severity>().unwrap(), Severity::Info);
        assert_eq!("WARN".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("fatal".parse::<Severity>().unwrap(), Severity::Critical);
        assert!("loud".parse::<Severity>().is_err());
    }

    #[test]
    fn test_severity_sniff() {
        assert_eq!(Severity::sniff("ERROR disk on fire"), Severity::Error);
        assert_eq!(Severity::sniff("[warn] slow request"), Severity::Warning);
        assert_eq!(Severity::sniff("hello world"), Severity::Default);
        assert_eq!(Severity::sniff(""), Severity::Default);
    }

    #[test]
    fn test_severity_serde() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");

        let from_number: Severity = serde_json::from_str("60").unwrap();
        assert_eq!(from_number, Severity::Error);
    }
}
