use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::consent::ConsentLevel;

/// A consent choice as persisted by a [`ConsentStore`](super::ConsentStore).
///
/// Created on the first explicit choice and overwritten on every later one.
/// Records are never deleted automatically; an expired record simply reads as
/// absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentRecord {
    /// The level the visitor granted.
    pub level: ConsentLevel,
    /// When the record stops being valid.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl ConsentRecord {
    /// Creates a record valid for `ttl_days` from now.
    pub fn new(level: ConsentLevel, ttl_days: i64) -> Self {
        Self {
            level,
            expires_at: OffsetDateTime::now_utc() + Duration::days(ttl_days),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= OffsetDateTime::now_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_record_is_not_expired() {
        let record = ConsentRecord::new(ConsentLevel::All, 365);
        assert!(!record.is_expired());
    }

    #[test]
    fn past_horizon_reads_as_expired() {
        let record = ConsentRecord::new(ConsentLevel::All, -1);
        assert!(record.is_expired());
    }

    #[test]
    fn serde_round_trip() {
        let record = ConsentRecord::new(ConsentLevel::Analytics, 365);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"analytics\""));

        let back: ConsentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.level, ConsentLevel::Analytics);
        assert_eq!(back.expires_at, record.expires_at);
    }
}
