//! Offline dataset used when the hazard API is unreachable.

use sagip_catalog::HazardCatalog;

const FALLBACK_CATALOG: &str = include_str!("../data/fallback.toml");

/// Three point hazards and three evacuation centers around Batong Malake.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed.
#[must_use]
pub fn fallback_catalog() -> HazardCatalog {
    HazardCatalog::from_toml_str(FALLBACK_CATALOG)
        .unwrap_or_else(|e| panic!("Failed to parse offline dataset: {e}"))
}
