use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::ConsentError;
use crate::scripts::bundle::{BundleId, NoScriptFallback, PixelInit, ScriptTag};
use crate::scripts::injector::ScriptInjector;

/// Injector that performs no real injection.
///
/// Records every call so tests can assert on injection counts, and can be
/// told to fail specific steps.
#[derive(Debug, Default)]
pub struct NullInjector {
    scripts: Mutex<Vec<ScriptTag>>,
    noscripts: Mutex<Vec<NoScriptFallback>>,
    inits: Mutex<Vec<PixelInit>>,

    fail_scripts: Mutex<Vec<BundleId>>,
    fail_init: Mutex<bool>,
}

impl NullInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `inject_script` fail for `bundle`.
    pub fn fail_script(&self, bundle: BundleId) {
        self.fail_scripts.lock().unwrap().push(bundle);
    }

    /// Makes `run_pixel_init` fail.
    pub fn fail_pixel_init(&self) {
        *self.fail_init.lock().unwrap() = true;
    }

    /// Number of script tags injected for `bundle`.
    pub fn script_count(&self, bundle: BundleId) -> usize {
        self.scripts
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.bundle == bundle)
            .count()
    }

    /// Number of no-script fallbacks injected for `bundle`.
    pub fn noscript_count(&self, bundle: BundleId) -> usize {
        self.noscripts
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.bundle == bundle)
            .count()
    }

    /// Number of pixel bootstrap calls performed.
    pub fn init_count(&self) -> usize {
        self.inits.lock().unwrap().len()
    }
}

#[async_trait]
impl ScriptInjector for NullInjector {
    async fn inject_script(&self, tag: &ScriptTag) -> Result<(), ConsentError> {
        // Keep an await point between the caller's mark and completion.
        tokio::task::yield_now().await;

        if self.fail_scripts.lock().unwrap().contains(&tag.bundle) {
            return Err(ConsentError::BundleLoadFailed {
                bundle: tag.bundle,
                reason: "simulated load failure".to_string(),
            });
        }

        self.scripts.lock().unwrap().push(tag.clone());
        Ok(())
    }

    fn inject_noscript(&self, fallback: &NoScriptFallback) {
        self.noscripts.lock().unwrap().push(fallback.clone());
    }

    async fn run_pixel_init(&self, init: &PixelInit) -> Result<(), ConsentError> {
        tokio::task::yield_now().await;

        if *self.fail_init.lock().unwrap() {
            return Err(ConsentError::BundleInitFailed {
                bundle: BundleId::MarketingPixel,
                reason: "simulated init failure".to_string(),
            });
        }

        self.inits.lock().unwrap().push(init.clone());
        Ok(())
    }
}
