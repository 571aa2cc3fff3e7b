#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Hazard taxonomy, severity levels, and catalog entity types.
//!
//! These types are shared by the hazard data service, the map rendering
//! layer, and the client. Hazard types form a closed enum so that every
//! color rule and aggregation is an exhaustive match.

pub mod feature;
pub mod geometry;

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use geometry::{HazardGeometry, Position};

/// Kind of natural hazard a zone is flagged with.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum HazardType {
    /// Riverine or pluvial flooding
    Flood,
    /// Slope failure and debris flow
    Landslide,
    /// Coastal inundation driven by typhoon winds
    StormSurge,
    /// Damaging wind exposure
    Wind,
}

impl HazardType {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Flood, Self::Landslide, Self::StormSurge, Self::Wind]
    }
}

/// Severity rating for a hazard zone, from 1 (lowest) to 5 (highest).
///
/// Serialized as the bare integer so that `GeoJSON` properties carry
/// `"severity": 3` rather than a name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum HazardSeverity {
    /// Level 1
    Minimal = 1,
    /// Level 2
    Low = 2,
    /// Level 3
    Moderate = 3,
    /// Level 4
    High = 4,
    /// Level 5
    Critical = 5,
}

impl HazardSeverity {
    /// Returns the numeric value of this severity level.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Creates a severity level from a numeric value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-5.
    pub const fn from_value(value: u8) -> Result<Self, InvalidSeverityError> {
        match value {
            1 => Ok(Self::Minimal),
            2 => Ok(Self::Low),
            3 => Ok(Self::Moderate),
            4 => Ok(Self::High),
            5 => Ok(Self::Critical),
            _ => Err(InvalidSeverityError { value }),
        }
    }

    /// Groups this severity into the three-level alert tier used for
    /// coloring.
    #[must_use]
    pub const fn tier(self) -> AlertTier {
        match self {
            Self::Minimal | Self::Low => AlertTier::Low,
            Self::Moderate => AlertTier::Medium,
            Self::High | Self::Critical => AlertTier::High,
        }
    }

    /// Returns all variants of this enum, lowest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Minimal,
            Self::Low,
            Self::Moderate,
            Self::High,
            Self::Critical,
        ]
    }
}

impl std::fmt::Display for HazardSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl TryFrom<u8> for HazardSeverity {
    type Error = InvalidSeverityError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<HazardSeverity> for u8 {
    fn from(severity: HazardSeverity) -> Self {
        severity.value()
    }
}

/// Error returned when attempting to create a [`HazardSeverity`] from an
/// invalid numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSeverityError {
    /// The invalid severity value that was provided.
    pub value: u8,
}

impl std::fmt::Display for InvalidSeverityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid severity value {}: expected 1-5", self.value)
    }
}

impl std::error::Error for InvalidSeverityError {}

/// Three-level alert grouping of severities: 1-2 low, 3 medium, 4-5 high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum AlertTier {
    /// Severity 1-2
    Low,
    /// Severity 3
    Medium,
    /// Severity 4-5
    High,
}

/// A georeferenced hazard zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardZone {
    /// Unique hazard ID.
    pub id: u32,
    /// Hazard kind.
    #[serde(rename = "type")]
    pub hazard_type: HazardType,
    /// Severity rating.
    pub severity: HazardSeverity,
    /// Zone outline (usually a polygon).
    pub geometry: HazardGeometry,
    /// Provenance tag of the hazard assessment (e.g. `"UP_NOAH"`).
    pub source: String,
    /// Assessment confidence, 0 to 1.
    pub confidence: f64,
    /// Elevation in meters.
    pub elevation: f64,
    /// Estimated number of residents in the zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_population: Option<u32>,
}

/// An evacuation center (shelter) location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvacuationCenter {
    /// Unique center ID.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Location as a `Point`.
    pub geometry: HazardGeometry,
    /// Number of evacuees the center can hold.
    pub capacity: u32,
    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// An administrative unit (barangay) reference point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Barangay {
    /// Unique barangay ID.
    pub id: u32,
    /// Barangay name.
    pub name: String,
    /// Municipality the barangay belongs to.
    pub municipality: String,
    /// Province the barangay belongs to.
    pub province: String,
    /// Reference point.
    pub geometry: HazardGeometry,
}

/// Hazard counts keyed by type. All four types are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TypeCounts {
    /// `FLOOD` count
    pub flood: u64,
    /// `LANDSLIDE` count
    pub landslide: u64,
    /// `STORM_SURGE` count
    pub storm_surge: u64,
    /// `WIND` count
    pub wind: u64,
}

impl TypeCounts {
    /// Returns the count for a single hazard type.
    #[must_use]
    pub const fn get(&self, hazard_type: HazardType) -> u64 {
        match hazard_type {
            HazardType::Flood => self.flood,
            HazardType::Landslide => self.landslide,
            HazardType::StormSurge => self.storm_surge,
            HazardType::Wind => self.wind,
        }
    }

    fn slot(&mut self, hazard_type: HazardType) -> &mut u64 {
        match hazard_type {
            HazardType::Flood => &mut self.flood,
            HazardType::Landslide => &mut self.landslide,
            HazardType::StormSurge => &mut self.storm_surge,
            HazardType::Wind => &mut self.wind,
        }
    }

    /// Sum over all types.
    #[must_use]
    pub const fn sum(&self) -> u64 {
        self.flood + self.landslide + self.storm_surge + self.wind
    }
}

/// Hazard counts keyed by severity level. All five levels are always
/// present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_field_names)]
pub struct SeverityCounts {
    /// Severity 1 count
    pub severity_1: u64,
    /// Severity 2 count
    pub severity_2: u64,
    /// Severity 3 count
    pub severity_3: u64,
    /// Severity 4 count
    pub severity_4: u64,
    /// Severity 5 count
    pub severity_5: u64,
}

impl SeverityCounts {
    /// Returns the count for a single severity level.
    #[must_use]
    pub const fn get(&self, severity: HazardSeverity) -> u64 {
        match severity {
            HazardSeverity::Minimal => self.severity_1,
            HazardSeverity::Low => self.severity_2,
            HazardSeverity::Moderate => self.severity_3,
            HazardSeverity::High => self.severity_4,
            HazardSeverity::Critical => self.severity_5,
        }
    }

    fn slot(&mut self, severity: HazardSeverity) -> &mut u64 {
        match severity {
            HazardSeverity::Minimal => &mut self.severity_1,
            HazardSeverity::Low => &mut self.severity_2,
            HazardSeverity::Moderate => &mut self.severity_3,
            HazardSeverity::High => &mut self.severity_4,
            HazardSeverity::Critical => &mut self.severity_5,
        }
    }

    /// Sum over all severity levels.
    #[must_use]
    pub const fn sum(&self) -> u64 {
        self.severity_1 + self.severity_2 + self.severity_3 + self.severity_4 + self.severity_5
    }
}

/// Aggregate hazard statistics for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardStats {
    /// Total number of hazards.
    pub total: u64,
    /// Counts per hazard type.
    pub by_type: TypeCounts,
    /// Counts per severity level.
    pub by_severity: SeverityCounts,
}

impl HazardStats {
    /// Tallies statistics over a set of hazards in a single pass.
    #[must_use]
    pub fn tally<'a>(hazards: impl IntoIterator<Item = &'a HazardZone>) -> Self {
        let mut stats = Self::default();
        for hazard in hazards {
            stats.total += 1;
            *stats.by_type.slot(hazard.hazard_type) += 1;
            *stats.by_severity.slot(hazard.severity) += 1;
        }
        stats
    }
}

/// Map layer selection: every hazard, or a single hazard type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LayerFilter {
    /// Show every hazard.
    #[default]
    All,
    /// Show only hazards of this type.
    Only(HazardType),
}

impl LayerFilter {
    /// Whether a hazard of the given type passes this filter.
    #[must_use]
    pub fn matches(self, hazard_type: HazardType) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => selected == hazard_type,
        }
    }
}

impl std::fmt::Display for LayerFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(hazard_type) => write!(f, "{hazard_type}"),
        }
    }
}

/// Error returned when a layer filter string is neither `"all"` nor a
/// hazard type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid layer filter '{value}': expected 'all' or a hazard type")]
pub struct InvalidLayerFilter {
    /// The rejected input.
    pub value: String,
}

impl FromStr for LayerFilter {
    type Err = InvalidLayerFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(Self::All);
        }
        HazardType::from_str(s)
            .map(Self::Only)
            .map_err(|_| InvalidLayerFilter {
                value: s.to_string(),
            })
    }
}
