#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the SAGIP hazard data server.
//!
//! `GeoJSON` bodies and hazard statistics are defined by
//! `sagip_hazard_models`; this crate only holds the envelopes that are
//! specific to the HTTP surface.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Always `"ok"` when the service answers.
    pub status: String,
}

impl ApiHealth {
    /// The healthy response.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// JSON error body for rejected requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable reason.
    pub error: String,
}

/// Query parameters for the hazards `GeoJSON` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardQueryParams {
    /// Hazard type name (`FLOOD`, `LANDSLIDE`, `STORM_SURGE`, `WIND`).
    pub hazard_type: Option<String>,
    /// Minimum severity value (1-5). Kept as text so a non-numeric value
    /// reaches the handler and gets a JSON error body.
    pub min_severity: Option<String>,
}
