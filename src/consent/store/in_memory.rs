use std::sync::Mutex;

use anyhow::Result;

use crate::config::DEFAULT_CONSENT_TTL_DAYS;
use crate::consent::store::ConsentStore;
use crate::consent::{ConsentLevel, ConsentRecord};

/// In-memory consent store (no persistence). Used as a default when the
/// embedder does not wire a durable backend, and in tests.
#[derive(Debug)]
pub struct InMemoryConsentStore {
    record: Mutex<Option<ConsentRecord>>,
    /// Expiry horizon stamped on each write, in days.
    ttl_days: i64,
}

impl InMemoryConsentStore {
    pub fn new(ttl_days: i64) -> Self {
        Self {
            record: Mutex::new(None),
            ttl_days,
        }
    }
}

impl Default for InMemoryConsentStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONSENT_TTL_DAYS)
    }
}

impl ConsentStore for InMemoryConsentStore {
    fn read(&self) -> Option<ConsentLevel> {
        let guard = self.record.lock().ok()?;
        let record = guard.as_ref()?;

        if record.is_expired() {
            return None;
        }
        Some(record.level)
    }

    fn write(&self, level: ConsentLevel) -> Result<()> {
        *self.record.lock().unwrap() = Some(ConsentRecord::new(level, self.ttl_days));
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.record.lock().unwrap() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_contract() {
        let store = InMemoryConsentStore::default();

        // starts empty
        assert!(store.read().is_none());

        // write + read
        store.write(ConsentLevel::Analytics).unwrap();
        assert_eq!(store.read(), Some(ConsentLevel::Analytics));

        // overwrite wins
        store.write(ConsentLevel::All).unwrap();
        assert_eq!(store.read(), Some(ConsentLevel::All));

        // clear
        store.clear().unwrap();
        assert!(store.read().is_none());
    }

    #[test]
    fn expired_record_reads_as_absent() {
        let store = InMemoryConsentStore::new(-1);
        store.write(ConsentLevel::All).unwrap();
        assert!(store.read().is_none());
    }
}
