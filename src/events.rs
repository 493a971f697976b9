//! Consent event types and the broadcast bus.
//!
//! Presentation surfaces (banner, preferences panel, settings trigger) subscribe
//! here instead of polling [`ConsentManager`](crate::consent::ConsentManager)
//! state. Events carry enough to update a surface without a follow-up query.

use tokio::sync::broadcast;

use crate::consent::ConsentLevel;
use crate::scripts::BundleId;

pub(crate) const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// A handle for receiving consent change notifications.
pub type Subscription = broadcast::Receiver<ConsentEvent>;

#[derive(Debug, Clone)]
pub enum ConsentEvent {
    // ****************************************
    // ** Lifecycle
    /// Initial state resolved from the store. `None` means the banner is up.
    Initialized { level: Option<ConsentLevel> },
    /// Visitor made an explicit consent choice.
    ConsentChanged { level: ConsentLevel },

    // ****************************************
    // ** Surfaces
    /// Preferences panel opened (suppresses the banner while up).
    PreferencesOpened,
    /// Preferences panel closed without saving.
    PreferencesClosed,

    // ****************************************
    // ** Reset
    /// Persisted consent was cleared; the host must perform a full page reload.
    ReloadRequested,

    // ****************************************
    // ** Script bundles
    /// A bundle was marked requested and injection started.
    BundleRequested { bundle: BundleId },
    /// A bundle finished loading, including its bootstrap call if any.
    BundleLoaded { bundle: BundleId },
    /// A bundle failed to load or initialize; it is not retried this page lifetime.
    BundleFailed { bundle: BundleId, reason: String },
}

#[derive(Debug)]
pub(crate) struct ConsentBus {
    tx: broadcast::Sender<ConsentEvent>,
}

impl Default for ConsentBus {
    fn default() -> Self {
        let (tx, _rx) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self { tx }
    }
}

impl ConsentBus {
    pub(crate) fn subscribe(&self) -> Subscription {
        self.tx.subscribe()
    }

    pub(crate) fn publish(&self, ev: ConsentEvent) {
        // send() fails only when there are no receivers; nobody listening is fine.
        let _ = self.tx.send(ev);
    }
}
