#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client side of the hazard map.
//!
//! Fetches the hazard and evacuation center collections from a
//! [`HazardFeed`] with a single attempt. Any failure substitutes the
//! built-in offline dataset for both collections, and the returned values
//! carry their [`Provenance`] so callers never have to guess where the
//! data came from.

pub mod fallback;
pub mod feed;
pub mod periodic;
pub mod session;

use sagip_hazard_models::feature::decode_feature_collection;
use sagip_hazard_models::{EvacuationCenter, HazardZone};
use serde::Serialize;
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

pub use feed::{API_URL_ENV_VAR, CatalogFeed, DEFAULT_API_URL, HazardFeed, HttpFeed};
pub use periodic::PeriodicTask;
pub use session::{MapReport, MapSession};

/// Errors from fetching a collection.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// The body is not a `GeoJSON` `FeatureCollection`.
    #[error("Invalid GeoJSON body: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Provenance {
    /// Fetched from the hazard API.
    Live,
    /// The built-in offline dataset.
    Mock,
}

/// A value tagged with its [`Provenance`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub provenance: Provenance,
}

impl<T> Resolved<T> {
    #[must_use]
    pub const fn live(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Live,
        }
    }

    #[must_use]
    pub const fn mock(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Mock,
        }
    }
}

/// Reachability of the hazard API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BackendStatus {
    Connected,
    Disconnected,
}

/// Status panel contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApiStatus {
    pub backend: BackendStatus,
    pub hazards: Provenance,
    pub centers: Provenance,
}

/// Hazards and evacuation centers resolved for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct MapData {
    pub hazards: Resolved<Vec<HazardZone>>,
    pub centers: Resolved<Vec<EvacuationCenter>>,
}

impl MapData {
    /// The built-in offline dataset, tagged [`Provenance::Mock`].
    #[must_use]
    pub fn mock() -> Self {
        let catalog = fallback::fallback_catalog();
        Self {
            hazards: Resolved::mock(catalog.hazards().to_vec()),
            centers: Resolved::mock(catalog.evacuation_centers().to_vec()),
        }
    }

    #[must_use]
    pub const fn status(&self) -> ApiStatus {
        let backend = match (self.hazards.provenance, self.centers.provenance) {
            (Provenance::Live, Provenance::Live) => BackendStatus::Connected,
            _ => BackendStatus::Disconnected,
        };
        ApiStatus {
            backend,
            hazards: self.hazards.provenance,
            centers: self.centers.provenance,
        }
    }
}

/// Fetches hazards, then evacuation centers, from `feed`.
///
/// A single attempt is made. If either fetch fails, both collections come
/// from the offline dataset. Features that cannot be decoded are skipped
/// without affecting provenance.
pub async fn resolve_map_data(feed: &dyn HazardFeed) -> MapData {
    match fetch_live(feed).await {
        Ok(data) => {
            log::info!(
                "Loaded {} hazards and {} evacuation centers from {}",
                data.hazards.value.len(),
                data.centers.value.len(),
                feed.describe()
            );
            data
        }
        Err(e) => {
            log::error!("Error fetching data from {}: {e}", feed.describe());
            log::warn!("Using offline Batong Malake dataset");
            MapData::mock()
        }
    }
}

async fn fetch_live(feed: &dyn HazardFeed) -> Result<MapData, FetchError> {
    let hazards = feed.hazards().await?;
    let centers = feed.evacuation_centers().await?;

    Ok(MapData {
        hazards: Resolved::live(decode_feature_collection(&hazards)),
        centers: Resolved::live(decode_feature_collection(&centers)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use geojson::FeatureCollection;
    use sagip_catalog::HazardCatalog;
    use sagip_hazard_models::HazardType;

    struct Unreachable;

    #[async_trait]
    impl HazardFeed for Unreachable {
        async fn hazards(&self) -> Result<FeatureCollection, FetchError> {
            Err(FetchError::Status {
                url: "http://localhost:8000/api/hazards/geojson".to_string(),
                status: 503,
            })
        }

        async fn evacuation_centers(&self) -> Result<FeatureCollection, FetchError> {
            unreachable!("centers are not fetched after a hazard failure")
        }

        fn describe(&self) -> String {
            "unreachable".to_string()
        }
    }

    /// Serves hazards but fails on centers.
    struct CentersDown(HazardCatalog);

    #[async_trait]
    impl HazardFeed for CentersDown {
        async fn hazards(&self) -> Result<FeatureCollection, FetchError> {
            Ok(self.0.list_hazards_geojson())
        }

        async fn evacuation_centers(&self) -> Result<FeatureCollection, FetchError> {
            Err(serde_json::from_str::<FeatureCollection>("<html>")
                .unwrap_err()
                .into())
        }

        fn describe(&self) -> String {
            "centers-down".to_string()
        }
    }

    /// Serves a fixed hazard collection and no centers.
    struct Fixed(FeatureCollection);

    #[async_trait]
    impl HazardFeed for Fixed {
        async fn hazards(&self) -> Result<FeatureCollection, FetchError> {
            Ok(self.0.clone())
        }

        async fn evacuation_centers(&self) -> Result<FeatureCollection, FetchError> {
            Ok(FeatureCollection {
                bbox: None,
                features: Vec::new(),
                foreign_members: None,
            })
        }

        fn describe(&self) -> String {
            "fixed".to_string()
        }
    }

    #[tokio::test]
    async fn failure_falls_back_to_mock_dataset() {
        let data = resolve_map_data(&Unreachable).await;

        assert_eq!(data.hazards.value.len(), 3);
        assert_eq!(data.centers.value.len(), 3);
        assert_eq!(data.hazards.provenance, Provenance::Mock);
        assert_eq!(data.centers.provenance, Provenance::Mock);
        assert_eq!(
            serde_json::to_value(data.status()).unwrap(),
            serde_json::json!({
                "backend": "disconnected",
                "hazards": "mock",
                "centers": "mock",
            })
        );
    }

    #[tokio::test]
    async fn center_failure_discards_live_hazards() {
        let data = resolve_map_data(&CentersDown(HazardCatalog::builtin())).await;
        assert_eq!(data, MapData::mock());
        assert_eq!(data.status().backend, BackendStatus::Disconnected);
    }

    #[tokio::test]
    async fn unreachable_server_falls_back() {
        let feed = HttpFeed::new("http://127.0.0.1:9/api").unwrap();
        let data = resolve_map_data(&feed).await;
        assert_eq!(data.status().hazards, Provenance::Mock);
        assert_eq!(data.hazards.value.len(), 3);
    }

    #[tokio::test]
    async fn catalog_feed_is_live() {
        let feed = CatalogFeed::new(HazardCatalog::builtin());
        let data = resolve_map_data(&feed).await;

        assert_eq!(data.hazards.value.len(), 4);
        assert_eq!(data.centers.value.len(), 3);
        assert_eq!(
            data.status(),
            ApiStatus {
                backend: BackendStatus::Connected,
                hazards: Provenance::Live,
                centers: Provenance::Live,
            }
        );
        assert_eq!(data.hazards.value, HazardCatalog::builtin().hazards());
    }

    #[tokio::test]
    async fn undecodable_features_are_skipped() {
        let collection: FeatureCollection = serde_json::from_value(serde_json::json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {
                        "id": 1, "type": "EARTHQUAKE", "severity": 3,
                        "source": "PHIVOLCS", "confidence": 0.5, "elevation": 10.0
                    },
                    "geometry": { "type": "Point", "coordinates": [121.24, 14.165] }
                },
                {
                    "type": "Feature",
                    "properties": {
                        "id": 2, "type": "WIND", "severity": 2,
                        "source": "PAGASA", "confidence": 0.7, "elevation": 20.0
                    },
                    "geometry": { "type": "Point", "coordinates": [121.24, 14.165] }
                }
            ]
        }))
        .unwrap();

        let data = resolve_map_data(&Fixed(collection)).await;
        assert_eq!(data.hazards.provenance, Provenance::Live);
        assert_eq!(data.hazards.value.len(), 1);
        assert_eq!(data.hazards.value[0].hazard_type, HazardType::Wind);
    }
}
