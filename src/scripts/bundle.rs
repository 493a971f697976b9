//! Bundle identifiers and the markup/calls a bundle injects.
//!
//! A **bundle** is a named group of external resources loaded together under
//! one identifier: the script tag itself, its no-script fallback, and any
//! post-load bootstrap call. The concrete endpoints come from
//! [`ConsentConfig`](crate::config::ConsentConfig); nothing here decides
//! *whether* a bundle loads, that is the loader's job.

use std::fmt::Display;

use crate::config::{MarketingPixelConfig, TagManagerConfig};

/// Identifier of a third-party script bundle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BundleId {
    /// Container script that itself loads further analytics tags.
    TagManager,
    /// Third-party conversion/remarketing tracking script.
    MarketingPixel,
}

impl BundleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            BundleId::TagManager => "tag-manager",
            BundleId::MarketingPixel => "marketing-pixel",
        }
    }
}

impl Display for BundleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An async script tag to be appended to the document head.
#[derive(Debug, Clone)]
pub struct ScriptTag {
    /// The bundle this tag belongs to.
    pub bundle: BundleId,
    /// DOM id for the injected element.
    pub element_id: String,
    /// Fully qualified source URL of the script.
    pub src: String,
}

impl ScriptTag {
    pub fn tag_manager(cfg: &TagManagerConfig) -> Self {
        Self {
            bundle: BundleId::TagManager,
            element_id: "consent-tag-manager".to_string(),
            src: format!("{}?id={}", cfg.script_src, cfg.container_id),
        }
    }

    pub fn marketing_pixel(cfg: &MarketingPixelConfig) -> Self {
        Self {
            bundle: BundleId::MarketingPixel,
            element_id: "consent-marketing-pixel".to_string(),
            src: cfg.script_src.clone(),
        }
    }

    /// Renders the tag as document-head markup.
    pub fn to_html(&self) -> String {
        format!(
            r#"<script id="{}" src="{}" async></script>"#,
            self.element_id, self.src
        )
    }
}

/// No-script fallback element, inserted at the top of the document body.
#[derive(Debug, Clone)]
pub struct NoScriptFallback {
    /// The bundle this fallback belongs to.
    pub bundle: BundleId,
    /// Markup of the fallback element: an iframe for the tag manager, a
    /// tracking image for the pixel.
    pub html: String,
}

impl NoScriptFallback {
    pub fn tag_manager(cfg: &TagManagerConfig) -> Self {
        Self {
            bundle: BundleId::TagManager,
            html: format!(
                r#"<noscript><iframe src="{}?id={}" height="0" width="0" style="display:none;visibility:hidden"></iframe></noscript>"#,
                cfg.noscript_src, cfg.container_id
            ),
        }
    }

    pub fn marketing_pixel(cfg: &MarketingPixelConfig) -> Self {
        Self {
            bundle: BundleId::MarketingPixel,
            html: format!(
                r#"<noscript><img height="1" width="1" style="display:none" src="{}?id={}&ev=PageView&noscript=1"/></noscript>"#,
                cfg.track_endpoint, cfg.pixel_id
            ),
        }
    }
}

/// The pixel bootstrap performed once its script has loaded: the `init` call
/// followed by the initial page-view event.
#[derive(Debug, Clone)]
pub struct PixelInit {
    pub pixel_id: String,
    /// Endpoint the initial page-view event is reported to.
    pub track_endpoint: String,
}

impl PixelInit {
    pub fn new(cfg: &MarketingPixelConfig) -> Self {
        Self {
            pixel_id: cfg.pixel_id.clone(),
            track_endpoint: cfg.track_endpoint.clone(),
        }
    }

    /// URL of the initial page-view report.
    pub fn page_view_url(&self) -> String {
        format!("{}?id={}&ev=PageView", self.track_endpoint, self.pixel_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsentConfig;

    #[test]
    fn bundle_identifiers() {
        assert_eq!(BundleId::TagManager.to_string(), "tag-manager");
        assert_eq!(BundleId::MarketingPixel.to_string(), "marketing-pixel");
    }

    #[test]
    fn tag_manager_markup_carries_the_container_id() {
        let cfg = ConsentConfig::default();

        let tag = ScriptTag::tag_manager(&cfg.tag_manager);
        url::Url::parse(&tag.src).expect("valid script URL");
        assert!(tag.src.contains("id=GTM-0000000"));
        assert!(tag.to_html().contains("async"));

        let fallback = NoScriptFallback::tag_manager(&cfg.tag_manager);
        assert!(fallback.html.contains("<noscript><iframe"));
        assert!(fallback.html.contains("GTM-0000000"));
    }

    #[test]
    fn pixel_markup_and_bootstrap_url() {
        let cfg = ConsentConfig::default();

        let tag = ScriptTag::marketing_pixel(&cfg.pixel);
        url::Url::parse(&tag.src).expect("valid script URL");

        let fallback = NoScriptFallback::marketing_pixel(&cfg.pixel);
        assert!(fallback.html.contains("ev=PageView&noscript=1"));

        let init = PixelInit::new(&cfg.pixel);
        let url = url::Url::parse(&init.page_view_url()).unwrap();
        assert!(url.query().unwrap().contains("ev=PageView"));
    }
}
