use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::config::{MarketingPixelConfig, TagManagerConfig};
use crate::errors::ConsentError;
use crate::events::{ConsentBus, ConsentEvent};
use crate::scripts::bundle::{BundleId, NoScriptFallback, PixelInit, ScriptTag};
use crate::scripts::injector::{ScriptInjector, ScriptInjectorHandle};

/// Idempotent loader for the third-party script bundles.
///
/// The loader owns the set of bundle identifiers already requested this page
/// lifetime. An identifier is recorded **before** any asynchronous injection
/// work starts, so a second trigger for the same bundle observes the mark and
/// resolves without side effects; rapid repeated consent changes cannot
/// double-inject. A failed load keeps its mark: bundles are not retried
/// within the same page lifetime.
pub struct ScriptLoader {
    injector: ScriptInjectorHandle,
    tag_manager: TagManagerConfig,
    pixel: MarketingPixelConfig,

    /// Bundles already requested for injection this page lifetime.
    requested: Mutex<HashSet<BundleId>>,
    bus: Arc<ConsentBus>,
}

impl ScriptLoader {
    pub(crate) fn new(
        injector: ScriptInjectorHandle,
        tag_manager: TagManagerConfig,
        pixel: MarketingPixelConfig,
        bus: Arc<ConsentBus>,
    ) -> Self {
        Self {
            injector,
            tag_manager,
            pixel,
            requested: Mutex::new(HashSet::new()),
            bus,
        }
    }

    /// True if `bundle` has been requested this page lifetime. Loads that
    /// failed count as requested.
    pub fn is_loaded(&self, bundle: BundleId) -> bool {
        self.requested.lock().unwrap().contains(&bundle)
    }

    /// Records `bundle` as requested, returning false when it already was.
    ///
    /// This happens synchronously, before any await: concurrent triggers for
    /// the same bundle resolve to a single winner.
    fn mark_requested(&self, bundle: BundleId) -> bool {
        self.requested.lock().unwrap().insert(bundle)
    }

    /// Loads the tag-manager bundle: container script in the head plus an
    /// iframe fallback at the top of the body. Resolves immediately with no
    /// side effect when the bundle was already requested.
    pub async fn load_tag_manager(&self) -> Result<(), ConsentError> {
        if !self.mark_requested(BundleId::TagManager) {
            return Ok(());
        }

        self.bus.publish(ConsentEvent::BundleRequested {
            bundle: BundleId::TagManager,
        });
        self.finish(BundleId::TagManager, self.inject_tag_manager().await)
    }

    /// Loads the marketing-pixel bundle: pixel script, tracking-image
    /// fallback, and the bootstrap call once the script has loaded. A
    /// bootstrap failure errs but leaves the bundle marked; the script
    /// itself did load.
    pub async fn load_marketing_pixel(&self) -> Result<(), ConsentError> {
        if !self.mark_requested(BundleId::MarketingPixel) {
            return Ok(());
        }

        self.bus.publish(ConsentEvent::BundleRequested {
            bundle: BundleId::MarketingPixel,
        });
        self.finish(BundleId::MarketingPixel, self.inject_marketing_pixel().await)
    }

    async fn inject_tag_manager(&self) -> Result<(), ConsentError> {
        self.injector
            .inject_noscript(&NoScriptFallback::tag_manager(&self.tag_manager));
        self.injector
            .inject_script(&ScriptTag::tag_manager(&self.tag_manager))
            .await
    }

    async fn inject_marketing_pixel(&self) -> Result<(), ConsentError> {
        self.injector
            .inject_noscript(&NoScriptFallback::marketing_pixel(&self.pixel));
        self.injector
            .inject_script(&ScriptTag::marketing_pixel(&self.pixel))
            .await?;
        self.injector.run_pixel_init(&PixelInit::new(&self.pixel)).await
    }

    fn finish(&self, bundle: BundleId, result: Result<(), ConsentError>) -> Result<(), ConsentError> {
        match &result {
            Ok(()) => self.bus.publish(ConsentEvent::BundleLoaded { bundle }),
            Err(e) => self.bus.publish(ConsentEvent::BundleFailed {
                bundle,
                reason: e.to_string(),
            }),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsentConfig;
    use crate::scripts::injector::NullInjector;

    fn loader_with(injector: Arc<NullInjector>) -> ScriptLoader {
        let cfg = ConsentConfig::default();
        ScriptLoader::new(
            injector,
            cfg.tag_manager,
            cfg.pixel,
            Arc::new(ConsentBus::default()),
        )
    }

    #[tokio::test]
    async fn nothing_is_loaded_up_front() {
        let loader = loader_with(Arc::new(NullInjector::new()));
        assert!(!loader.is_loaded(BundleId::TagManager));
        assert!(!loader.is_loaded(BundleId::MarketingPixel));
    }

    #[tokio::test]
    async fn concurrent_triggers_inject_exactly_once() {
        let injector = Arc::new(NullInjector::new());
        let loader = Arc::new(loader_with(injector.clone()));

        let (a, b) = tokio::join!(loader.load_tag_manager(), loader.load_tag_manager());
        a.unwrap();
        b.unwrap();

        assert_eq!(injector.script_count(BundleId::TagManager), 1);
        assert_eq!(injector.noscript_count(BundleId::TagManager), 1);
        assert!(loader.is_loaded(BundleId::TagManager));
    }

    #[tokio::test]
    async fn rapid_repeated_triggers_inject_once() {
        let injector = Arc::new(NullInjector::new());
        let loader = loader_with(injector.clone());

        let attempts: Vec<_> = (0..8).map(|_| loader.load_marketing_pixel()).collect();
        for result in futures::future::join_all(attempts).await {
            result.unwrap();
        }

        assert_eq!(injector.script_count(BundleId::MarketingPixel), 1);
        assert_eq!(injector.noscript_count(BundleId::MarketingPixel), 1);
        assert_eq!(injector.init_count(), 1);
    }

    #[tokio::test]
    async fn reapplying_is_idempotent() {
        let injector = Arc::new(NullInjector::new());
        let loader = loader_with(injector.clone());

        loader.load_marketing_pixel().await.unwrap();
        loader.load_marketing_pixel().await.unwrap();

        assert_eq!(injector.script_count(BundleId::MarketingPixel), 1);
        assert_eq!(injector.init_count(), 1);
    }

    #[tokio::test]
    async fn failed_load_stays_marked_and_is_not_retried() {
        let injector = Arc::new(NullInjector::new());
        injector.fail_script(BundleId::TagManager);
        let loader = loader_with(injector.clone());

        let err = loader.load_tag_manager().await.unwrap_err();
        assert!(matches!(err, ConsentError::BundleLoadFailed { bundle, .. } if bundle == BundleId::TagManager));
        assert!(loader.is_loaded(BundleId::TagManager));

        // The second attempt sees the mark and performs no work.
        loader.load_tag_manager().await.unwrap();
        assert_eq!(injector.script_count(BundleId::TagManager), 0);
    }

    #[tokio::test]
    async fn pixel_init_failure_errs_but_bundle_stays_marked() {
        let injector = Arc::new(NullInjector::new());
        injector.fail_pixel_init();
        let loader = loader_with(injector.clone());

        let err = loader.load_marketing_pixel().await.unwrap_err();
        assert!(matches!(err, ConsentError::BundleInitFailed { .. }));

        // The script itself loaded; only the bootstrap failed.
        assert_eq!(injector.script_count(BundleId::MarketingPixel), 1);
        assert!(loader.is_loaded(BundleId::MarketingPixel));

        loader.load_marketing_pixel().await.unwrap();
        assert_eq!(injector.init_count(), 0);
    }

    #[tokio::test]
    async fn bundle_outcomes_are_published() {
        let injector = Arc::new(NullInjector::new());
        let cfg = ConsentConfig::default();
        let bus = Arc::new(ConsentBus::default());
        let loader = ScriptLoader::new(injector, cfg.tag_manager, cfg.pixel, bus.clone());

        let mut rx = bus.subscribe();
        loader.load_tag_manager().await.unwrap();

        assert!(matches!(
            rx.recv().await.unwrap(),
            ConsentEvent::BundleRequested { bundle: BundleId::TagManager }
        ));
        assert!(matches!(
            rx.recv().await.unwrap(),
            ConsentEvent::BundleLoaded { bundle: BundleId::TagManager }
        ));
    }
}
