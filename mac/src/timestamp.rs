//! Request timestamps: decimal seconds since the epoch.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{MacError, Result};

/// A timestamp expressed as whole seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Build a timestamp from a raw seconds value.
    pub fn new(seconds: u64) -> Self {
        Timestamp(seconds)
    }

    /// The current wall-clock time, truncated to whole seconds.
    pub fn now() -> Self {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Timestamp(seconds)
    }

    /// Seconds since the epoch.
    pub fn seconds(&self) -> u64 {
        self.0
    }

    /// Absolute difference in seconds between two timestamps.
    pub fn abs_diff(&self, other: &Timestamp) -> u64 {
        self.0.abs_diff(other.0)
    }

    /// Whether `self` is strictly before `other`.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Timestamp {
    type Err = MacError;

    fn from_str(s: &str) -> Result<Self> {
        // `u64::from_str` already rejects signs, decimals, and whitespace,
        // which is exactly "non-integer string fails" from the spec.
        s.parse::<u64>()
            .map(Timestamp)
            .map_err(|_| MacError::InvalidTimestamp(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_seconds() {
        assert_eq!("45".parse::<Timestamp>().unwrap(), Timestamp(45));
    }

    #[test]
    fn rejects_non_integer() {
        assert!("45.5".parse::<Timestamp>().is_err());
        assert!("-45".parse::<Timestamp>().is_err());
        assert!("abc".parse::<Timestamp>().is_err());
        assert!("".parse::<Timestamp>().is_err());
    }

    #[test]
    fn now_is_plausible() {
        let ts = Timestamp::now();
        assert!(ts.seconds() > 1_700_000_000);
    }
}
