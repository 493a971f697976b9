mod in_memory;
mod json;

use std::sync::Arc;

use anyhow::Result;

use crate::consent::ConsentLevel;

pub use in_memory::InMemoryConsentStore;
pub use json::JsonConsentStore;

// A consent store persists the single consent-level record for one site.
pub trait ConsentStore: Send + Sync {
    /// Returns the persisted level, or `None` when no valid record exists.
    ///
    /// Reads fail soft: a missing, malformed, or expired record all read as
    /// `None`. The caller treats `None` as "no consent yet" and shows the
    /// banner; a broken store must never surface as a user-facing error.
    fn read(&self) -> Option<ConsentLevel>;

    /// Persists `level` with a fresh expiry horizon, overwriting any prior record.
    fn write(&self, level: ConsentLevel) -> Result<()>;

    /// Removes the persisted record. Only the explicit reset action calls this.
    fn clear(&self) -> Result<()>;
}

/// A handle to a consent store trait.
///
/// Store implementations must be `Send + Sync` and internally synchronized,
/// since callers hold only `&self` when invoking trait methods.
pub type ConsentStoreHandle = Arc<dyn ConsentStore + Send + Sync>;
