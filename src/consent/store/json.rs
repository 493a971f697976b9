//! JSON-backed consent store.
//!
//! `JsonConsentStore` persists the consent record in a single JSON file on
//! disk, keyed by the configured storage key:
//!
//! ```json
//! { "cookie_consent_level": { "level": "all", "expires_at": "2027-08-06T00:00:00Z" } }
//! ```
//!
//! ### I/O characteristics
//! - Reads fail soft: a missing, unreadable, or malformed file reads as "no
//!   consent yet" (logged at debug level). An expired record reads the same.
//! - Writes read-then-rewrite the whole file; errors are returned to the
//!   caller, which logs and continues. Consent handling never depends on the
//!   write having landed.
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::consent::store::ConsentStore;
use crate::consent::{ConsentLevel, ConsentRecord};

/// On-disk representation of the store file.
///
/// A map keyed by storage key, so the file can later carry sibling records
/// without a format break.
type ConsentStoreFile = HashMap<String, ConsentRecord>;

/// A JSON-based consent store that persists the record across sessions.
pub struct JsonConsentStore {
    /// Path to the JSON file where the record is stored.
    path: PathBuf,
    /// Key under which the record is filed.
    storage_key: String,
    /// Expiry horizon stamped on each write, in days.
    ttl_days: i64,
}

impl JsonConsentStore {
    pub fn new(path: PathBuf, storage_key: impl Into<String>, ttl_days: i64) -> Self {
        Self {
            path,
            storage_key: storage_key.into(),
            ttl_days,
        }
    }

    /// Loads and deserializes the store file. Any failure reads as empty.
    fn load_file(&self) -> ConsentStoreFile {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                log::debug!("consent store '{}' not readable: {}", self.path.display(), e);
                return ConsentStoreFile::new();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            log::debug!("consent store '{}' malformed: {}", self.path.display(), e);
            ConsentStoreFile::new()
        })
    }

    /// Serializes and writes the full store file (pretty-printed).
    fn save_file(&self, file: &ConsentStoreFile) -> Result<()> {
        let contents = serde_json::to_string_pretty(file).context("serialize consent record")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("write consent store '{}'", self.path.display()))?;
        Ok(())
    }
}

impl ConsentStore for JsonConsentStore {
    fn read(&self) -> Option<ConsentLevel> {
        let file = self.load_file();
        let record = file.get(&self.storage_key)?;

        if record.is_expired() {
            log::debug!("consent record expired at {}", record.expires_at);
            return None;
        }
        Some(record.level)
    }

    fn write(&self, level: ConsentLevel) -> Result<()> {
        let mut file = self.load_file();
        file.insert(
            self.storage_key.clone(),
            ConsentRecord::new(level, self.ttl_days),
        );
        self.save_file(&file)
    }

    fn clear(&self) -> Result<()> {
        let mut file = self.load_file();
        if file.remove(&self.storage_key).is_some() {
            self.save_file(&file)?;
        }
        Ok(())
    }
}
