use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConsentError;

/// The coarse-grained permission tier a visitor has granted for non-essential
/// script execution.
///
/// The tiers nest: `All` includes everything `Analytics` permits, which in turn
/// includes `Necessary`. "No choice yet" is the absence of a level
/// (`Option<ConsentLevel>::None`), not a variant; an absent level means no
/// external scripts run and the banner must be shown.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentLevel {
    /// Only strictly necessary cookies; no external scripts run.
    Necessary,
    /// Analytics scripts may run; marketing scripts may not.
    Analytics,
    /// Everything may run, including marketing/remarketing scripts.
    All,
}

impl ConsentLevel {
    /// True if the tag-manager bundle may be loaded.
    pub fn allows_analytics(&self) -> bool {
        matches!(self, ConsentLevel::Analytics | ConsentLevel::All)
    }

    /// True if the marketing-pixel bundle may be loaded.
    pub fn allows_marketing(&self) -> bool {
        matches!(self, ConsentLevel::All)
    }

    /// Maps the two preference toggles onto a level.
    ///
    /// Marketing without analytics is not representable in the three-level
    /// model and collapses to `Necessary`.
    pub fn from_toggles(analytics: bool, marketing: bool) -> Self {
        match (analytics, marketing) {
            (true, true) => ConsentLevel::All,
            (true, false) => ConsentLevel::Analytics,
            (false, _) => ConsentLevel::Necessary,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentLevel::Necessary => "necessary",
            ConsentLevel::Analytics => "analytics",
            ConsentLevel::All => "all",
        }
    }
}

impl Display for ConsentLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConsentLevel {
    type Err = ConsentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "necessary" => Ok(ConsentLevel::Necessary),
            "analytics" => Ok(ConsentLevel::Analytics),
            "all" => Ok(ConsentLevel::All),
            other => Err(ConsentError::UnknownLevel(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_mapping_table() {
        assert_eq!(ConsentLevel::from_toggles(true, true), ConsentLevel::All);
        assert_eq!(
            ConsentLevel::from_toggles(true, false),
            ConsentLevel::Analytics
        );
        assert_eq!(
            ConsentLevel::from_toggles(false, false),
            ConsentLevel::Necessary
        );
    }

    #[test]
    fn marketing_without_analytics_collapses_to_necessary() {
        assert_eq!(
            ConsentLevel::from_toggles(false, true),
            ConsentLevel::Necessary
        );
    }

    #[test]
    fn bundle_permissions_nest() {
        assert!(!ConsentLevel::Necessary.allows_analytics());
        assert!(!ConsentLevel::Necessary.allows_marketing());

        assert!(ConsentLevel::Analytics.allows_analytics());
        assert!(!ConsentLevel::Analytics.allows_marketing());

        assert!(ConsentLevel::All.allows_analytics());
        assert!(ConsentLevel::All.allows_marketing());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ConsentLevel::Analytics).unwrap(),
            "\"analytics\""
        );
        assert_eq!(
            serde_json::from_str::<ConsentLevel>("\"all\"").unwrap(),
            ConsentLevel::All
        );
    }

    #[test]
    fn from_str_round_trips_and_rejects_unknown() {
        for level in [
            ConsentLevel::Necessary,
            ConsentLevel::Analytics,
            ConsentLevel::All,
        ] {
            assert_eq!(level.as_str().parse::<ConsentLevel>().unwrap(), level);
        }

        assert!("rejected".parse::<ConsentLevel>().is_err());
        assert!("All".parse::<ConsentLevel>().is_err());
    }
}
