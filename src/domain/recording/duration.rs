//! Duration value object

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Default recording length for the `record` command (60 seconds)
pub const DEFAULT_RECORD_SECS: u64 = 60;

/// Longest message the relay accepts (5 minutes)
pub const MAX_MESSAGE_SECS: u64 = 300;

/// Default encoder timeslice (1 second)
pub const DEFAULT_TIMESLICE_MS: u64 = 1000;

/// Default bound on metadata inspection (3 seconds)
pub const DEFAULT_METADATA_TIMEOUT_MS: u64 = 3000;

/// Value object representing a time duration.
/// Immutable and validated on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    /// Create a Duration from milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    /// Create a Duration from seconds
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            milliseconds: secs * 1000,
        }
    }

    /// Default length of a `record` run
    pub const fn default_record() -> Self {
        Self::from_secs(DEFAULT_RECORD_SECS)
    }

    /// Upper bound for a single message
    pub const fn max_message() -> Self {
        Self::from_secs(MAX_MESSAGE_SECS)
    }

    /// Default encoder timeslice
    pub const fn default_timeslice() -> Self {
        Self::from_millis(DEFAULT_TIMESLICE_MS)
    }

    /// Default metadata inspection timeout
    pub const fn default_metadata_timeout() -> Self {
        Self::from_millis(DEFAULT_METADATA_TIMEOUT_MS)
    }

    /// Get duration in whole seconds
    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / 1000
    }

    /// Get duration in milliseconds
    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    /// Convert to std::time::Duration
    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.milliseconds)
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Parse "30s", "1m", "2m30s" or "500ms".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DurationParseError {
            input: s.to_string(),
        };
        let input = s.trim().to_lowercase();

        let mut total_ms: u64 = 0;
        let mut digits = String::new();
        let mut rest = input.as_str();

        while let Some(ch) = rest.chars().next() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                rest = &rest[1..];
                continue;
            }
            if digits.is_empty() {
                return Err(err());
            }
            let value: u64 = digits.parse().map_err(|_| err())?;
            digits.clear();

            let (unit_ms, unit_len) = if rest.starts_with("ms") {
                (1, 2)
            } else if rest.starts_with('m') {
                (60_000, 1)
            } else if rest.starts_with('s') {
                (1000, 1)
            } else {
                return Err(err());
            };
            total_ms = value
                .checked_mul(unit_ms)
                .and_then(|v| total_ms.checked_add(v))
                .ok_or_else(err)?;
            rest = &rest[unit_len..];
        }

        if !digits.is_empty() || total_ms == 0 {
            return Err(err());
        }

        Ok(Self {
            milliseconds: total_ms,
        })
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.milliseconds % 1000 != 0 {
            return write!(f, "{}ms", self.milliseconds);
        }
        let total_secs = self.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;

        if minutes == 0 {
            write!(f, "{}s", seconds)
        } else if seconds == 0 {
            write!(f, "{}m", minutes)
        } else {
            write!(f, "{}m{}s", minutes, seconds)
        }
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::default_record()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_seconds_only() {
        let d: Duration = "30s".parse().unwrap();
        assert_eq!(d.as_secs(), 30);
        assert_eq!(d.as_millis(), 30000);
    }

    #[test]
    fn parse_minutes_and_seconds() {
        let d: Duration = "2m30s".parse().unwrap();
        assert_eq!(d.as_secs(), 150);
    }

    #[test]
    fn parse_milliseconds() {
        let d: Duration = "250ms".parse().unwrap();
        assert_eq!(d.as_millis(), 250);
        assert_eq!(d.to_string(), "250ms");
    }

    #[test]
    fn parse_case_insensitive_with_whitespace() {
        let d: Duration = "  1M30S ".parse().unwrap();
        assert_eq!(d.as_secs(), 90);
    }

    #[test]
    fn parse_rejects_zero_and_garbage() {
        assert!("".parse::<Duration>().is_err());
        assert!("0s".parse::<Duration>().is_err());
        assert!("30".parse::<Duration>().is_err());
        assert!("30x".parse::<Duration>().is_err());
        assert!("s".parse::<Duration>().is_err());
    }

    #[test]
    fn display_round_trips_common_forms() {
        assert_eq!(Duration::from_secs(30).to_string(), "30s");
        assert_eq!(Duration::from_secs(120).to_string(), "2m");
        assert_eq!(Duration::from_secs(150).to_string(), "2m30s");
    }

    #[test]
    fn defaults() {
        assert_eq!(Duration::default_record().as_secs(), 60);
        assert_eq!(Duration::max_message().as_secs(), 300);
        assert_eq!(Duration::default_timeslice().as_millis(), 1000);
        assert_eq!(Duration::default_metadata_timeout().as_std(), StdDuration::from_secs(3));
    }
}
