//! Point/polygon geometry shared by hazards, evacuation centers, and
//! barangays.
//!
//! Serializes as a `GeoJSON` geometry object, so the same value can be
//! embedded verbatim in a `Feature` or read from a TOML catalog.

use geo::{BoundingRect, Centroid, Coord, LineString, Polygon, Rect};
use serde::{Deserialize, Serialize};

use crate::feature::FeatureDecodeError;

/// A `[longitude, latitude]` pair (WGS84).
pub type Position = [f64; 2];

/// Geometry of a catalog entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum HazardGeometry {
    /// A single location.
    Point(Position),
    /// An area. The first ring is the exterior; any further rings are holes.
    Polygon(Vec<Vec<Position>>),
}

impl HazardGeometry {
    /// Whether this is an area geometry.
    #[must_use]
    pub const fn is_polygon(&self) -> bool {
        matches!(self, Self::Polygon(_))
    }

    /// The exterior ring of a polygon, `None` for points or polygons with
    /// no rings.
    #[must_use]
    pub fn exterior(&self) -> Option<&[Position]> {
        match self {
            Self::Polygon(rings) => rings.first().map(Vec::as_slice),
            Self::Point(_) => None,
        }
    }

    /// Converts to a [`geo::Geometry`]. Open rings are closed by `geo`.
    #[must_use]
    pub fn to_geo(&self) -> geo::Geometry<f64> {
        match self {
            Self::Point(position) => geo::Geometry::Point(Coord::from(*position).into()),
            Self::Polygon(rings) => {
                let mut rings = rings.iter().map(|ring| LineString::from(ring.clone()));
                let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
                geo::Geometry::Polygon(Polygon::new(exterior, rings.collect()))
            }
        }
    }

    /// Representative location: the point itself, or the area-weighted
    /// centroid of a polygon.
    ///
    /// Returns `None` for an empty polygon.
    #[must_use]
    pub fn anchor(&self) -> Option<Position> {
        match self {
            Self::Point(position) => Some(*position),
            Self::Polygon(_) => self.to_geo().centroid().map(|p| [p.x(), p.y()]),
        }
    }

    /// Axis-aligned bounds, `None` for an empty polygon.
    #[must_use]
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.to_geo().bounding_rect()
    }
}

impl From<&HazardGeometry> for geojson::Geometry {
    fn from(geometry: &HazardGeometry) -> Self {
        let value = match geometry {
            HazardGeometry::Point(position) => geojson::Value::Point(position.to_vec()),
            HazardGeometry::Polygon(rings) => geojson::Value::Polygon(
                rings
                    .iter()
                    .map(|ring| ring.iter().map(|p| p.to_vec()).collect())
                    .collect(),
            ),
        };
        Self::new(value)
    }
}

impl TryFrom<&geojson::Geometry> for HazardGeometry {
    type Error = FeatureDecodeError;

    fn try_from(geometry: &geojson::Geometry) -> Result<Self, Self::Error> {
        match &geometry.value {
            geojson::Value::Point(position) => Ok(Self::Point(to_position(position)?)),
            geojson::Value::Polygon(rings) => rings
                .iter()
                .map(|ring| ring.iter().map(|p| to_position(p)).collect())
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Polygon),
            other => Err(FeatureDecodeError::UnsupportedGeometry {
                kind: geometry_kind(other).to_string(),
            }),
        }
    }
}

fn to_position(raw: &[f64]) -> Result<Position, FeatureDecodeError> {
    match raw {
        [lon, lat, ..] if lon.is_finite() && lat.is_finite() => Ok([*lon, *lat]),
        _ => Err(FeatureDecodeError::InvalidPosition {
            position: raw.to_vec(),
        }),
    }
}

const fn geometry_kind(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}
