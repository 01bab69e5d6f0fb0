use std::fmt;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Seconds since the Unix epoch, as the registry stores proof timestamps.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProofTimestamp(u64);

impl ProofTimestamp {
    /// Create from a raw seconds value.
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// The current wall-clock time, truncated to whole seconds.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Convert from a UTC datetime. Pre-epoch instants clamp to zero.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(u64::try_from(at.timestamp()).unwrap_or(0))
    }

    /// Raw seconds.
    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Returns `true` for the zero timestamp (no record).
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Convert to a UTC datetime, if representable.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.0).ok()?;
        Utc.timestamp_opt(secs, 0).single()
    }

    /// RFC 3339 rendering, e.g. `2024-05-01T12:00:00Z`.
    pub fn to_rfc3339(&self) -> String {
        self.to_datetime()
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_else(|| self.0.to_string())
    }
}

impl fmt::Debug for ProofTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProofTimestamp({})", self.0)
    }
}

impl fmt::Display for ProofTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_rendering() {
        let ts = ProofTimestamp::from_secs(1_700_000_000);
        assert_eq!(ts.to_rfc3339(), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn now_is_reasonable() {
        // After 2020-01-01.
        assert!(ProofTimestamp::now().as_secs() > 1_577_836_800);
    }

    #[test]
    fn datetime_roundtrip() {
        let ts = ProofTimestamp::from_secs(1_600_000_000);
        let dt = ts.to_datetime().unwrap();
        assert_eq!(ProofTimestamp::from_datetime(dt), ts);
    }

    #[test]
    fn ordering_follows_seconds() {
        assert!(ProofTimestamp::from_secs(1) < ProofTimestamp::from_secs(2));
        assert!(ProofTimestamp::from_secs(0).is_zero());
    }

    #[test]
    fn serde_is_transparent() {
        let ts = ProofTimestamp::from_secs(42);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "42");
    }
}
