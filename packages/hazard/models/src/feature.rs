//! `GeoJSON` `FeatureCollection` projection and decoding.
//!
//! Projection puts every non-geometry field of an entity under
//! `properties` and copies the geometry verbatim, preserving input order.
//! Decoding is the inverse used by clients; features that cannot be
//! decoded are skipped with a warning rather than failing the whole
//! collection.

use geojson::{Feature, FeatureCollection, JsonObject};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::{
    Barangay, EvacuationCenter, HazardGeometry, HazardSeverity, HazardType, HazardZone,
};

/// Errors from decoding a single `GeoJSON` feature into a catalog entity.
#[derive(Debug, Error)]
pub enum FeatureDecodeError {
    /// The feature has no `properties` object.
    #[error("Feature has no properties")]
    MissingProperties,

    /// The feature has no geometry.
    #[error("Feature has no geometry")]
    MissingGeometry,

    /// The geometry type is not supported for this entity.
    #[error("Unsupported geometry type: {kind}")]
    UnsupportedGeometry {
        /// `GeoJSON` geometry type name.
        kind: String,
    },

    /// A coordinate pair is missing components or is not finite.
    #[error("Invalid position: {position:?}")]
    InvalidPosition {
        /// The raw position.
        position: Vec<f64>,
    },

    /// The properties do not match the entity shape.
    #[error("Invalid properties: {0}")]
    Properties(#[from] serde_json::Error),
}

/// An entity that can be projected into a `GeoJSON` feature.
pub trait ToFeature {
    /// The flat property bag of this entity.
    fn properties(&self) -> serde_json::Value;

    /// The entity's geometry.
    fn geometry(&self) -> &HazardGeometry;

    /// Builds the feature.
    fn to_feature(&self) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::from(self.geometry())),
            id: None,
            properties: match self.properties() {
                serde_json::Value::Object(map) => Some(map),
                _ => None,
            },
            foreign_members: None,
        }
    }
}

/// An entity that can be rebuilt from a `GeoJSON` feature.
pub trait FromFeature: Sized {
    /// Decodes one feature.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureDecodeError`] if the properties or geometry do not
    /// describe this entity.
    fn from_feature(feature: &Feature) -> Result<Self, FeatureDecodeError>;
}

/// Projects entities into a `FeatureCollection`, preserving order.
#[must_use]
pub fn to_feature_collection<T: ToFeature>(items: &[T]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: items.iter().map(ToFeature::to_feature).collect(),
        foreign_members: None,
    }
}

/// Decodes every feature of a collection, skipping (and logging) features
/// that do not describe a `T`.
#[must_use]
pub fn decode_feature_collection<T: FromFeature>(collection: &FeatureCollection) -> Vec<T> {
    collection
        .features
        .iter()
        .enumerate()
        .filter_map(|(idx, feature)| match T::from_feature(feature) {
            Ok(item) => Some(item),
            Err(e) => {
                log::warn!("Skipping feature {idx}: {e}");
                None
            }
        })
        .collect()
}

fn properties_of<T: for<'de> Deserialize<'de>>(feature: &Feature) -> Result<T, FeatureDecodeError> {
    let props: &JsonObject = feature
        .properties
        .as_ref()
        .ok_or(FeatureDecodeError::MissingProperties)?;
    Ok(serde_json::from_value(serde_json::Value::Object(props.clone()))?)
}

fn geometry_of(feature: &Feature) -> Result<HazardGeometry, FeatureDecodeError> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or(FeatureDecodeError::MissingGeometry)?;
    HazardGeometry::try_from(geometry)
}

fn point_of(feature: &Feature) -> Result<HazardGeometry, FeatureDecodeError> {
    match geometry_of(feature)? {
        point @ HazardGeometry::Point(_) => Ok(point),
        HazardGeometry::Polygon(_) => Err(FeatureDecodeError::UnsupportedGeometry {
            kind: "Polygon".to_string(),
        }),
    }
}

impl ToFeature for HazardZone {
    fn properties(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "type": self.hazard_type,
            "severity": self.severity,
            "source": self.source,
            "confidence": self.confidence,
            "elevation": self.elevation,
            "affectedPopulation": self.affected_population,
        })
    }

    fn geometry(&self) -> &HazardGeometry {
        &self.geometry
    }
}

/// Hazard properties as sent by the service. Nullable fields are
/// tolerated because the database-backed service emits `null` for unset
/// columns.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HazardProperties {
    id: u32,
    #[serde(rename = "type")]
    hazard_type: HazardType,
    severity: HazardSeverity,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    elevation: Option<f64>,
    #[serde(default)]
    affected_population: Option<u32>,
}

impl FromFeature for HazardZone {
    fn from_feature(feature: &Feature) -> Result<Self, FeatureDecodeError> {
        let props: HazardProperties = properties_of(feature)?;
        Ok(Self {
            id: props.id,
            hazard_type: props.hazard_type,
            severity: props.severity,
            geometry: geometry_of(feature)?,
            source: props.source.unwrap_or_default(),
            confidence: props.confidence.unwrap_or_default(),
            elevation: props.elevation.unwrap_or_default(),
            affected_population: props.affected_population,
        })
    }
}

impl ToFeature for EvacuationCenter {
    fn properties(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "name": self.name,
            "capacity": self.capacity,
            "address": self.address,
        })
    }

    fn geometry(&self) -> &HazardGeometry {
        &self.geometry
    }
}

#[derive(Deserialize)]
struct CenterProperties {
    id: u32,
    name: String,
    #[serde(default)]
    capacity: Option<u32>,
    #[serde(default)]
    address: Option<String>,
}

impl FromFeature for EvacuationCenter {
    fn from_feature(feature: &Feature) -> Result<Self, FeatureDecodeError> {
        let props: CenterProperties = properties_of(feature)?;
        Ok(Self {
            id: props.id,
            name: props.name,
            geometry: point_of(feature)?,
            capacity: props.capacity.unwrap_or_default(),
            address: props.address,
        })
    }
}

impl ToFeature for Barangay {
    fn properties(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "name": self.name,
            "municipality": self.municipality,
            "province": self.province,
        })
    }

    fn geometry(&self) -> &HazardGeometry {
        &self.geometry
    }
}

#[derive(Deserialize)]
struct BarangayProperties {
    id: u32,
    name: String,
    municipality: String,
    province: String,
}

impl FromFeature for Barangay {
    fn from_feature(feature: &Feature) -> Result<Self, FeatureDecodeError> {
        let props: BarangayProperties = properties_of(feature)?;
        Ok(Self {
            id: props.id,
            name: props.name,
            municipality: props.municipality,
            province: props.province,
            geometry: point_of(feature)?,
        })
    }
}
