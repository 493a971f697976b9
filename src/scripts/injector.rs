mod fetch;
mod null;

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::ConsentError;
use crate::scripts::bundle::{NoScriptFallback, PixelInit, ScriptTag};

pub use fetch::FetchInjector;
pub use null::NullInjector;

/// The document-side collaborator that performs the actual injection work.
///
/// Implementations decide what "injection" means for the embedding: the
/// shipped [`FetchInjector`] fetches the bundle source (a successful response
/// stands in for the browser's load event) and collects rendered markup for
/// the host page, while an embedding with a live document would append real
/// elements to it.
#[async_trait]
pub trait ScriptInjector: Send + Sync {
    /// Appends an async script tag to the document head.
    ///
    /// Resolves once the external resource signals load completion; errs on
    /// load failure.
    async fn inject_script(&self, tag: &ScriptTag) -> Result<(), ConsentError>;

    /// Inserts a no-script fallback element at the top of the document body.
    fn inject_noscript(&self, fallback: &NoScriptFallback);

    /// Runs the pixel bootstrap (init plus the initial page-view) after its
    /// script has loaded.
    async fn run_pixel_init(&self, init: &PixelInit) -> Result<(), ConsentError>;
}

/// A handle to a script injector trait.
pub type ScriptInjectorHandle = Arc<dyn ScriptInjector + Send + Sync>;
