//! Severity levels

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Log severity, ordered `Debug < Info < Error`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Level {
    /// Diagnostic detail
    #[default]
    Debug = 0,
    /// Normal operation
    Info = 1,
    /// Failures; always captured regardless of threshold
    Error = 2,
}

impl Level {
    /// Single-character tag that opens every formatted line.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Debug => 'D',
            Self::Info => 'I',
            Self::Error => 'E',
        }
    }

    /// Upper-case level name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Error => "ERROR",
        }
    }

    /// Whether an event at `self` passes a logger configured with `threshold`.
    #[inline]
    #[must_use]
    pub fn passes(self, threshold: Self) -> bool {
        self == Self::Error || self >= threshold
    }

    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Debug,
            1 => Self::Info,
            _ => Self::Error,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" | "d" => Ok(Self::Debug),
            "info" | "i" => Ok(Self::Info),
            "error" | "err" | "e" => Ok(Self::Error),
            _ => Err(Error::InvalidLevel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Error);
    }

    #[test]
    fn test_threshold() {
        assert!(Level::Debug.passes(Level::Debug));
        assert!(!Level::Debug.passes(Level::Info));
        assert!(Level::Info.passes(Level::Info));
        assert!(!Level::Info.passes(Level::Error));
        assert!(Level::Error.passes(Level::Error));
        assert!(Level::Error.passes(Level::Debug));
    }

    #[test]
    fn test_parse() {
        assert_eq!("INFO".parse::<Level>().unwrap(), Level::Info);
        assert_eq!("err".parse::<Level>().unwrap(), Level::Error);
        assert_eq!("Debug".parse::<Level>().unwrap(), Level::Debug);
        assert!(matches!(
            "warn".parse::<Level>(),
            Err(Error::InvalidLevel(s)) if s == "warn"
        ));
    }

    #[test]
    fn test_u8_roundtrip() {
        for level in [Level::Debug, Level::Info, Level::Error] {
            assert_eq!(Level::from_u8(level as u8), level);
        }
    }
}
