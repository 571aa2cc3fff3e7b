#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Immutable hazard catalog and the read operations of the hazard data
//! service.
//!
//! A [`HazardCatalog`] is built once at process start, either from the
//! embedded Batong Malake seed data or from a TOML file named by the
//! `SAGIP_CATALOG` environment variable, and is read-only afterwards.
//! Every operation projects the catalog without mutating it.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use geojson::FeatureCollection;
use sagip_hazard_models::feature::to_feature_collection;
use sagip_hazard_models::{
    Barangay, EvacuationCenter, HazardGeometry, HazardSeverity, HazardStats, HazardType,
    HazardZone,
};
use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming an alternative catalog file.
pub const CATALOG_ENV_VAR: &str = "SAGIP_CATALOG";

const BUILTIN_CATALOG: &str = include_str!("../data/batong_malake.toml");

/// Errors from building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The catalog TOML is malformed.
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    /// Two entities of the same kind share an ID.
    #[error("Duplicate {entity} id {id}")]
    DuplicateId {
        /// Entity kind (`"hazard"`, `"evacuation center"`, `"barangay"`).
        entity: &'static str,
        /// The repeated ID.
        id: u32,
    },

    /// An entity that must be a point has another geometry.
    #[error("{entity} {id} must have Point geometry")]
    NotAPoint {
        /// Entity kind.
        entity: &'static str,
        /// Entity ID.
        id: u32,
    },
}

/// On-disk catalog layout.
#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    hazards: Vec<HazardZone>,
    #[serde(default)]
    evacuation_centers: Vec<EvacuationCenter>,
    #[serde(default)]
    barangays: Vec<Barangay>,
}

/// Optional filters for the hazard `GeoJSON` listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HazardQuery {
    /// Keep only hazards of this type.
    pub hazard_type: Option<HazardType>,
    /// Keep only hazards at or above this severity.
    pub min_severity: Option<HazardSeverity>,
}

impl HazardQuery {
    /// Whether a hazard passes every set filter.
    #[must_use]
    pub fn matches(&self, hazard: &HazardZone) -> bool {
        self.hazard_type.is_none_or(|t| t == hazard.hazard_type)
            && self.min_severity.is_none_or(|s| hazard.severity >= s)
    }
}

/// In-memory catalog of hazard zones, evacuation centers, and barangays.
///
/// Entity order is the order of the source file and is preserved by every
/// listing.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardCatalog {
    hazards: Vec<HazardZone>,
    evacuation_centers: Vec<EvacuationCenter>,
    barangays: Vec<Barangay>,
}

impl HazardCatalog {
    /// Builds a catalog from entity lists.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if IDs repeat within an entity list or a
    /// center or barangay is not a point.
    pub fn new(
        hazards: Vec<HazardZone>,
        evacuation_centers: Vec<EvacuationCenter>,
        barangays: Vec<Barangay>,
    ) -> Result<Self, CatalogError> {
        ensure_unique("hazard", hazards.iter().map(|h| h.id))?;
        ensure_unique("evacuation center", evacuation_centers.iter().map(|c| c.id))?;
        ensure_unique("barangay", barangays.iter().map(|b| b.id))?;

        for center in &evacuation_centers {
            ensure_point("evacuation center", center.id, &center.geometry)?;
        }
        for barangay in &barangays {
            ensure_point("barangay", barangay.id, &barangay.geometry)?;
        }

        Ok(Self {
            hazards,
            evacuation_centers,
            barangays,
        })
    }

    /// The embedded Batong Malake catalog.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (a build-time guarantee
    /// since the data is compiled in).
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_toml_str(BUILTIN_CATALOG)
            .unwrap_or_else(|e| panic!("Failed to parse built-in catalog: {e}"))
    }

    /// Parses a catalog from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the TOML is malformed or fails
    /// validation.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::de::from_str(toml_str)?;
        Self::new(file.hazards, file.evacuation_centers, file.barangays)
    }

    /// Reads and parses a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads the catalog named by an explicit path, falling back to
    /// `SAGIP_CATALOG`, falling back to the built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if a named file cannot be loaded.
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        let from_env = std::env::var_os(CATALOG_ENV_VAR).map(PathBuf::from);
        match path.map(Path::to_path_buf).or(from_env) {
            Some(path) => {
                log::info!("Loading hazard catalog from {}", path.display());
                Self::from_path(&path)
            }
            None => {
                log::info!("Using built-in Batong Malake hazard catalog");
                Ok(Self::builtin())
            }
        }
    }

    /// All hazards in catalog order.
    #[must_use]
    pub fn hazards(&self) -> &[HazardZone] {
        &self.hazards
    }

    /// All evacuation centers in catalog order.
    #[must_use]
    pub fn evacuation_centers(&self) -> &[EvacuationCenter] {
        &self.evacuation_centers
    }

    /// All barangays in catalog order.
    #[must_use]
    pub fn barangays(&self) -> &[Barangay] {
        &self.barangays
    }

    /// Every hazard as a `FeatureCollection`, in catalog order.
    #[must_use]
    pub fn list_hazards_geojson(&self) -> FeatureCollection {
        to_feature_collection(&self.hazards)
    }

    /// Hazards passing `query` as a `FeatureCollection`, in catalog order.
    /// An empty query is equivalent to [`Self::list_hazards_geojson`].
    #[must_use]
    pub fn query_hazards_geojson(&self, query: &HazardQuery) -> FeatureCollection {
        let hazards: Vec<HazardZone> = self
            .hazards
            .iter()
            .filter(|h| query.matches(h))
            .cloned()
            .collect();
        to_feature_collection(&hazards)
    }

    /// Every evacuation center as a `FeatureCollection`.
    #[must_use]
    pub fn list_evacuation_centers_geojson(&self) -> FeatureCollection {
        to_feature_collection(&self.evacuation_centers)
    }

    /// Every barangay as a `FeatureCollection`.
    #[must_use]
    pub fn list_barangays_geojson(&self) -> FeatureCollection {
        to_feature_collection(&self.barangays)
    }

    /// Counts over the full catalog, dense over every type and severity.
    #[must_use]
    pub fn compute_hazard_stats(&self) -> HazardStats {
        HazardStats::tally(&self.hazards)
    }
}

fn ensure_unique(
    entity: &'static str,
    ids: impl IntoIterator<Item = u32>,
) -> Result<(), CatalogError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId { entity, id });
        }
    }
    Ok(())
}

fn ensure_point(
    entity: &'static str,
    id: u32,
    geometry: &HazardGeometry,
) -> Result<(), CatalogError> {
    match geometry {
        HazardGeometry::Point(_) => Ok(()),
        HazardGeometry::Polygon(_) => Err(CatalogError::NotAPoint { entity, id }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sagip_hazard_models::feature::decode_feature_collection;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = HazardCatalog::builtin();
        assert_eq!(catalog.hazards().len(), 4);
        assert_eq!(catalog.evacuation_centers().len(), 3);
        assert_eq!(catalog.barangays().len(), 3);
        assert!(catalog.hazards().iter().all(|h| h.geometry.is_polygon()));
        assert_eq!(catalog.hazards()[1].hazard_type, HazardType::Landslide);
        assert_eq!(catalog.hazards()[0].affected_population, Some(250));
    }

    #[test]
    fn stats_total_matches_catalog() {
        let catalog = HazardCatalog::builtin();
        let stats = catalog.compute_hazard_stats();

        assert_eq!(stats.total, catalog.hazards().len() as u64);
        assert_eq!(stats.by_type.sum(), stats.total);
        assert_eq!(stats.by_severity.sum(), stats.total);
        assert_eq!(stats.by_type.flood, 2);
        assert_eq!(stats.by_type.landslide, 2);
        assert_eq!(stats.by_type.storm_surge, 0);
        assert_eq!(stats.by_type.wind, 0);
        assert_eq!(stats.by_severity.severity_3, 2);
        assert_eq!(stats.by_severity.severity_1, 0);
    }

    #[test]
    fn hazard_listing_is_order_preserving_and_lossless() {
        let catalog = HazardCatalog::builtin();
        let collection = catalog.list_hazards_geojson();
        assert_eq!(collection.features.len(), catalog.hazards().len());

        for (feature, hazard) in collection.features.iter().zip(catalog.hazards()) {
            let props = feature.properties.as_ref().unwrap();
            assert_eq!(props["id"], hazard.id);
            let geometry = HazardGeometry::try_from(feature.geometry.as_ref().unwrap()).unwrap();
            assert_eq!(geometry, hazard.geometry);
        }

        let decoded: Vec<HazardZone> = decode_feature_collection(&collection);
        assert_eq!(decoded, catalog.hazards());
    }

    #[test]
    fn center_and_barangay_listings_round_trip() {
        let catalog = HazardCatalog::builtin();
        let centers: Vec<EvacuationCenter> =
            decode_feature_collection(&catalog.list_evacuation_centers_geojson());
        assert_eq!(centers, catalog.evacuation_centers());

        let barangays: Vec<Barangay> =
            decode_feature_collection(&catalog.list_barangays_geojson());
        assert_eq!(barangays, catalog.barangays());
        assert_eq!(barangays[2].name, "Los Baños");
    }

    #[test]
    fn query_filters_by_type_and_severity() {
        let catalog = HazardCatalog::builtin();

        let floods = catalog.query_hazards_geojson(&HazardQuery {
            hazard_type: Some(HazardType::Flood),
            min_severity: None,
        });
        assert_eq!(floods.features.len(), 2);

        let severe = catalog.query_hazards_geojson(&HazardQuery {
            hazard_type: None,
            min_severity: Some(HazardSeverity::High),
        });
        assert_eq!(severe.features.len(), 1);
        assert_eq!(severe.features[0].properties.as_ref().unwrap()["id"], 2);

        let unfiltered = catalog.query_hazards_geojson(&HazardQuery::default());
        assert_eq!(unfiltered, catalog.list_hazards_geojson());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let toml_str = r#"
            [[barangays]]
            id = 1
            name = "A"
            municipality = "M"
            province = "P"
            geometry = { type = "Point", coordinates = [121.0, 14.0] }

            [[barangays]]
            id = 1
            name = "B"
            municipality = "M"
            province = "P"
            geometry = { type = "Point", coordinates = [121.1, 14.1] }
        "#;
        assert!(matches!(
            HazardCatalog::from_toml_str(toml_str),
            Err(CatalogError::DuplicateId { entity: "barangay", id: 1 })
        ));
    }

    #[test]
    fn rejects_out_of_range_severity() {
        let toml_str = r#"
            [[hazards]]
            id = 1
            type = "WIND"
            severity = 7
            source = "TEST"
            confidence = 0.5
            elevation = 1.0
            geometry = { type = "Point", coordinates = [121.0, 14.0] }
        "#;
        assert!(matches!(
            HazardCatalog::from_toml_str(toml_str),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn rejects_polygon_centers() {
        let toml_str = r#"
            [[evacuation_centers]]
            id = 4
            name = "Field"
            capacity = 10
            geometry = { type = "Polygon", coordinates = [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]] }
        "#;
        assert!(matches!(
            HazardCatalog::from_toml_str(toml_str),
            Err(CatalogError::NotAPoint { id: 4, .. })
        ));
    }

    #[test]
    fn empty_catalog_is_valid() {
        let catalog = HazardCatalog::from_toml_str("").unwrap();
        assert!(catalog.list_hazards_geojson().features.is_empty());
        assert_eq!(catalog.compute_hazard_stats(), HazardStats::default());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = HazardCatalog::from_path(Path::new("/nonexistent/catalog.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/catalog.toml"));
    }
}
