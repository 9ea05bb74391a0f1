use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::logger::LoggerError;

/// How log events are rendered on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggerFormat {
    /// Full human readable lines.
    #[default]
    Text,
    /// Shorter lines with span fields inlined.
    Compact,
    /// One JSON object per event.
    Json,
}

impl LoggerFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoggerFormat::Text => "text",
            LoggerFormat::Compact => "compact",
            LoggerFormat::Json => "json",
        }
    }
}

impl FromStr for LoggerFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(LoggerError::InvalidFormat(s.to_string())),
        }
    }
}

impl fmt::Display for LoggerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LoggerFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LoggerFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names_ignoring_case() {
        assert_eq!("text".parse::<LoggerFormat>().unwrap(), LoggerFormat::Text);
        assert_eq!("Pretty".parse::<LoggerFormat>().unwrap(), LoggerFormat::Text);
        assert_eq!(" COMPACT ".parse::<LoggerFormat>().unwrap(), LoggerFormat::Compact);
        assert_eq!("json".parse::<LoggerFormat>().unwrap(), LoggerFormat::Json);
    }

    #[test]
    fn rejects_unknown_names() {
        for input in ["", "xml", "journald", "text,json"] {
            assert!(
                matches!(input.parse::<LoggerFormat>(), Err(LoggerError::InvalidFormat(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn serializes_as_canonical_name() {
        assert_eq!(serde_json::to_string(&LoggerFormat::Compact).unwrap(), r#""compact""#);
        let parsed: LoggerFormat = serde_json::from_str(r#""JSON""#).unwrap();
        assert_eq!(parsed, LoggerFormat::Json);
    }
}
