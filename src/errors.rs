use crate::scripts::BundleId;

#[derive(Debug, thiserror::Error)]
pub enum ConsentError {
    #[error("bundle '{bundle}' failed to load: {reason}")]
    BundleLoadFailed { bundle: BundleId, reason: String },

    #[error("bundle '{bundle}' loaded but its initialization call failed: {reason}")]
    BundleInitFailed { bundle: BundleId, reason: String },

    #[error("unknown consent level: {0}")]
    UnknownLevel(String),
}
