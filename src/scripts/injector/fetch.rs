use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::ConsentError;
use crate::scripts::bundle::{BundleId, NoScriptFallback, PixelInit, ScriptTag};
use crate::scripts::injector::ScriptInjector;

/// Network-backed injector for host pages without a live document.
///
/// Fetching the bundle source stands in for the browser's load event; the
/// rendered `<script>`/`<noscript>` markup is collected for the host to emit
/// into the page's head and body on the next render.
pub struct FetchInjector {
    client: reqwest::Client,
    head: Mutex<Vec<String>>,
    body_top: Mutex<Vec<String>>,
}

impl FetchInjector {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            head: Mutex::new(Vec::new()),
            body_top: Mutex::new(Vec::new()),
        }
    }

    /// Markup accumulated for the document head.
    pub fn head_html(&self) -> String {
        self.head.lock().unwrap().join("\n")
    }

    /// Markup accumulated for the top of the document body.
    pub fn body_top_html(&self) -> String {
        self.body_top.lock().unwrap().join("\n")
    }
}

impl Default for FetchInjector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScriptInjector for FetchInjector {
    async fn inject_script(&self, tag: &ScriptTag) -> Result<(), ConsentError> {
        let res = self
            .client
            .get(&tag.src)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| ConsentError::BundleLoadFailed {
                bundle: tag.bundle,
                reason: e.to_string(),
            })?;

        // Drain the body; only the load outcome matters here.
        let _ = res.bytes().await;

        self.head.lock().unwrap().push(tag.to_html());
        Ok(())
    }

    fn inject_noscript(&self, fallback: &NoScriptFallback) {
        self.body_top.lock().unwrap().push(fallback.html.clone());
    }

    async fn run_pixel_init(&self, init: &PixelInit) -> Result<(), ConsentError> {
        self.client
            .get(init.page_view_url())
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| ConsentError::BundleInitFailed {
                bundle: BundleId::MarketingPixel,
                reason: e.to_string(),
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsentConfig;

    #[test]
    fn noscript_markup_accumulates_for_the_body() {
        let cfg = ConsentConfig::default();
        let injector = FetchInjector::new();

        injector.inject_noscript(&NoScriptFallback::tag_manager(&cfg.tag_manager));
        injector.inject_noscript(&NoScriptFallback::marketing_pixel(&cfg.pixel));

        let body = injector.body_top_html();
        assert!(body.contains("<iframe"));
        assert!(body.contains("<img"));
        assert!(injector.head_html().is_empty());
    }
}
