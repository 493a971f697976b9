//! The consent state machine.
//!
//! [`ConsentManager`] is the single source of truth for consent state within
//! one page lifetime. Presentation surfaces call its mutating entry points
//! and render from [`ConsentSnapshot`]; script injection happens only as a
//! side effect of its transitions, via the [`ScriptLoader`].

use std::fmt::Display;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::config::ConsentConfig;
use crate::consent::store::{ConsentStore, ConsentStoreHandle, InMemoryConsentStore};
use crate::consent::ConsentLevel;
use crate::events::{ConsentBus, ConsentEvent, Subscription};
use crate::scripts::{NullInjector, ScriptInjectorHandle, ScriptLoader};

/// A unique identifier for one page lifetime of the consent subsystem,
/// represented as a UUID.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visibility and consent state for one page lifetime. Not persisted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ConsentState {
    /// `initialize` has not run yet. Mutating calls are dropped.
    Uninitialized,
    /// No valid record was found; the banner is up.
    BannerShown,
    /// A level is active and no surface is open.
    Hidden(ConsentLevel),
    /// The preferences panel is open. `prior` is the level that was active
    /// when it opened, so cancelling can restore the previous surface.
    PreferencesShown { prior: Option<ConsentLevel> },
}

/// Snapshot of the observable state for presentation code.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ConsentSnapshot {
    pub banner_visible: bool,
    pub preferences_visible: bool,
    pub level: Option<ConsentLevel>,
}

fn state_level(state: &ConsentState) -> Option<ConsentLevel> {
    match state {
        ConsentState::Hidden(level) => Some(*level),
        ConsentState::PreferencesShown { prior } => *prior,
        _ => None,
    }
}

// The consent manager drives everything: it owns the store handle, the script
// loader and the event bus, and is shared behind an Arc by the UI surfaces.
pub struct ConsentManager {
    session: SessionId,
    store: ConsentStoreHandle,
    scripts: Arc<ScriptLoader>,
    state: Mutex<ConsentState>,
    bus: Arc<ConsentBus>,
}

impl ConsentManager {
    /// Entry point to start building a manager.
    pub fn builder() -> ConsentManagerBuilder {
        ConsentManagerBuilder {
            config: None,
            store: None,
            injector: None,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session
    }

    /// Subscribe to consent change notifications.
    pub fn subscribe(&self) -> Subscription {
        self.bus.subscribe()
    }

    /// The script loader owned by this manager, for `is_loaded` queries.
    pub fn scripts(&self) -> Arc<ScriptLoader> {
        self.scripts.clone()
    }

    /// Observable state for the banner/preferences surfaces.
    pub fn snapshot(&self) -> ConsentSnapshot {
        let state = self.state.lock().unwrap();
        ConsentSnapshot {
            banner_visible: matches!(*state, ConsentState::BannerShown),
            preferences_visible: matches!(*state, ConsentState::PreferencesShown { .. }),
            level: state_level(&state),
        }
    }

    pub fn consent_level(&self) -> Option<ConsentLevel> {
        state_level(&self.state.lock().unwrap())
    }

    /// Reads the store and enters the initial state.
    ///
    /// For a returning visitor the stored level becomes active and its script
    /// policy is applied immediately; a fresh visitor gets the banner.
    pub async fn initialize(&self) {
        let level = {
            let mut state = self.state.lock().unwrap();
            if *state != ConsentState::Uninitialized {
                log::warn!("consent manager initialized twice; ignoring");
                return;
            }

            let level = self.store.read();
            *state = match level {
                Some(level) => ConsentState::Hidden(level),
                None => ConsentState::BannerShown,
            };
            level
        };

        self.bus.publish(ConsentEvent::Initialized { level });

        if let Some(level) = level {
            self.apply_policy(level).await;
        }
    }

    /// Records an explicit consent choice.
    ///
    /// Valid while the banner or the preferences panel is up; dropped
    /// otherwise. Both surfaces close on acceptance.
    pub async fn accept_consent(&self, level: ConsentLevel) {
        {
            let mut state = self.state.lock().unwrap();
            match *state {
                ConsentState::BannerShown | ConsentState::PreferencesShown { .. } => {}
                _ => {
                    log::warn!("consent choice '{}' ignored in state {:?}", level, *state);
                    return;
                }
            }

            // A failing store must not keep the UI open: log and carry on.
            if let Err(e) = self.store.write(level) {
                log::warn!("failed to persist consent level '{}': {:#}", level, e);
            }

            *state = ConsentState::Hidden(level);
        }

        self.bus.publish(ConsentEvent::ConsentChanged { level });
        self.apply_policy(level).await;
    }

    /// Opens the preferences panel, suppressing the banner while it is up.
    pub fn open_preferences(&self) {
        {
            let mut state = self.state.lock().unwrap();
            let prior = state_level(&state);
            *state = ConsentState::PreferencesShown { prior };
        }
        self.bus.publish(ConsentEvent::PreferencesOpened);
    }

    /// Closes the preferences panel without saving, restoring whichever
    /// surface applied before it opened.
    pub fn close_preferences(&self) {
        {
            let mut state = self.state.lock().unwrap();
            let ConsentState::PreferencesShown { prior } = *state else {
                return;
            };

            *state = match prior {
                Some(level) => ConsentState::Hidden(level),
                None => ConsentState::BannerShown,
            };
        }
        self.bus.publish(ConsentEvent::PreferencesClosed);
    }

    /// Saves the preferences toggles as an explicit consent choice.
    pub async fn save_preferences(&self, analytics: bool, marketing: bool) {
        self.accept_consent(ConsentLevel::from_toggles(analytics, marketing))
            .await;
    }

    /// Clears the persisted record and asks the host for a full page reload,
    /// which discards the loader and all in-memory state.
    pub fn reset(&self) {
        if let Err(e) = self.store.clear() {
            log::warn!("failed to clear persisted consent: {:#}", e);
        }
        self.bus.publish(ConsentEvent::ReloadRequested);
    }

    /// Loads whatever `level` permits. Reapplying for the same level is
    /// idempotent: the loader tracks bundles already requested.
    ///
    /// Loader errors are published and logged, never returned; tracking is a
    /// best-effort side effect and must not block the consent flow.
    async fn apply_policy(&self, level: ConsentLevel) {
        if level.allows_analytics() {
            if let Err(e) = self.scripts.load_tag_manager().await {
                log::warn!("session {}: {}", self.session, e);
            }
        }

        if level.allows_marketing() {
            if let Err(e) = self.scripts.load_marketing_pixel().await {
                log::warn!("session {}: {}", self.session, e);
            }
        }
    }
}

pub struct ConsentManagerBuilder {
    config: Option<ConsentConfig>,
    store: Option<ConsentStoreHandle>,
    injector: Option<ScriptInjectorHandle>,
}

impl ConsentManagerBuilder {
    pub fn config(mut self, cfg: ConsentConfig) -> Self {
        self.config = Some(cfg);
        self
    }

    pub fn store(mut self, store: ConsentStoreHandle) -> Self {
        self.store = Some(store);
        self
    }

    pub fn injector(mut self, injector: ScriptInjectorHandle) -> Self {
        self.injector = Some(injector);
        self
    }

    pub fn build(self) -> ConsentManager {
        let config = self.config.unwrap_or_default();

        // Without an explicit store or injector we fall back to the in-memory
        // store and the no-op injector.
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryConsentStore::new(config.ttl_days)));
        let injector: ScriptInjectorHandle = self
            .injector
            .unwrap_or_else(|| Arc::new(NullInjector::new()));

        let bus = Arc::new(ConsentBus::default());
        let scripts = Arc::new(ScriptLoader::new(
            injector,
            config.tag_manager,
            config.pixel,
            bus.clone(),
        ));

        ConsentManager {
            session: SessionId::new(),
            store,
            scripts,
            state: Mutex::new(ConsentState::Uninitialized),
            bus,
        }
    }
}
