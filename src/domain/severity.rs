use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log record, totally ordered.
///
/// This is the domain severity carried on emitted records, distinct from the
/// `tracing` levels used for this crate's own diagnostics. Escalation and
/// tie-breaking always use this fixed order, never insertion order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// Implicit severity floor derived from an HTTP response status.
    ///
    /// 4xx responses escalate to `Warning`, 5xx and above to `Error`;
    /// everything else (including informational statuses) stays at `Info`.
    pub fn from_status(status: u16) -> Self {
        match status {
            400..=499 => Severity::Warning,
            500.. => Severity::Error,
            _ => Severity::Info,
        }
    }

    /// Upper-case wire name, e.g. `"WARNING"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "critical" | "fatal" => Ok(Severity::Critical),
            other => Err(format!("invalid severity: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_total_order() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
    }

    #[test]
    fn status_floor_mapping() {
        assert_eq!(Severity::from_status(200), Severity::Info);
        assert_eq!(Severity::from_status(301), Severity::Info);
        assert_eq!(Severity::from_status(399), Severity::Info);
        assert_eq!(Severity::from_status(400), Severity::Warning);
        assert_eq!(Severity::from_status(404), Severity::Warning);
        assert_eq!(Severity::from_status(499), Severity::Warning);
        assert_eq!(Severity::from_status(500), Severity::Error);
        assert_eq!(Severity::from_status(503), Severity::Error);
        // Informational statuses fall through to the Info floor
        assert_eq!(Severity::from_status(101), Severity::Info);
    }

    #[test]
    fn wire_names_are_uppercase() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"WARNING\"");
        let back: Severity = serde_json::from_str("\"CRITICAL\"").unwrap();
        assert_eq!(back, Severity::Critical);
    }

    #[test]
    fn parses_aliases() {
        assert_eq!("warn".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("ERROR".parse::<Severity>().unwrap(), Severity::Error);
        assert!("verbose".parse::<Severity>().is_err());
    }
}
