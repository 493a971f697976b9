const DEFAULT_STORAGE_KEY: &str = "cookie_consent_level";

const DEFAULT_TAG_MANAGER_SRC: &str = "https://www.googletagmanager.com/gtm.js";
const DEFAULT_TAG_MANAGER_NOSCRIPT_SRC: &str = "https://www.googletagmanager.com/ns.html";
const DEFAULT_PIXEL_SRC: &str = "https://connect.facebook.net/en_US/fbevents.js";
const DEFAULT_PIXEL_TRACK_ENDPOINT: &str = "https://www.facebook.com/tr";

/// Default expiry horizon for a persisted consent record, in days.
pub const DEFAULT_CONSENT_TTL_DAYS: i64 = 365;

/// Configuration for the tag-manager bundle (container script plus iframe fallback).
#[derive(Debug, Clone)]
pub struct TagManagerConfig {
    /// Container id appended to the script and no-script URLs.
    pub container_id: String,
    /// Base URL of the container script.
    pub script_src: String,
    /// Base URL of the no-script iframe fallback.
    pub noscript_src: String,
}

/// Configuration for the marketing-pixel bundle (pixel script, tracking image, bootstrap).
#[derive(Debug, Clone)]
pub struct MarketingPixelConfig {
    /// Pixel id used by the bootstrap and the tracking-image fallback.
    pub pixel_id: String,
    /// URL of the pixel script.
    pub script_src: String,
    /// Endpoint page-view events are reported to.
    pub track_endpoint: String,
}

/// Main consent subsystem configuration. The endpoint defaults are the conventional
/// tag-manager/pixel URLs; deployments override the container and pixel ids.
#[derive(Debug, Clone)]
pub struct ConsentConfig {
    /// Key under which the consent record is persisted.
    pub storage_key: String,
    /// Expiry horizon stamped on each persisted record, in days.
    pub ttl_days: i64,
    /// Tag-manager bundle endpoints.
    pub tag_manager: TagManagerConfig,
    /// Marketing-pixel bundle endpoints.
    pub pixel: MarketingPixelConfig,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            ttl_days: DEFAULT_CONSENT_TTL_DAYS,
            tag_manager: TagManagerConfig {
                container_id: "GTM-0000000".to_string(),
                script_src: DEFAULT_TAG_MANAGER_SRC.to_string(),
                noscript_src: DEFAULT_TAG_MANAGER_NOSCRIPT_SRC.to_string(),
            },
            pixel: MarketingPixelConfig {
                pixel_id: "000000000000000".to_string(),
                script_src: DEFAULT_PIXEL_SRC.to_string(),
                track_endpoint: DEFAULT_PIXEL_TRACK_ENDPOINT.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoints_are_valid_urls() {
        let cfg = ConsentConfig::default();

        for endpoint in [
            &cfg.tag_manager.script_src,
            &cfg.tag_manager.noscript_src,
            &cfg.pixel.script_src,
            &cfg.pixel.track_endpoint,
        ] {
            url::Url::parse(endpoint).expect("valid endpoint URL");
        }
    }

    #[test]
    fn default_record_layout() {
        let cfg = ConsentConfig::default();
        assert_eq!(cfg.storage_key, "cookie_consent_level");
        assert_eq!(cfg.ttl_days, 365);
    }
}
