//! Color and opacity rules for hazard overlays.
//!
//! Each hazard type has a three-shade palette indexed by [`AlertTier`].
//! Both rules are pure functions of their inputs.

use sagip_hazard_models::{AlertTier, HazardSeverity, HazardType};

/// Fill color of evacuation center markers.
pub const EVACUATION_CENTER_COLOR: &str = "#10b981";

/// Stroke width of hazard zone outlines, in pixels.
pub const ZONE_STROKE_WEIGHT: f64 = 2.0;

/// Stroke opacity of hazard zone outlines.
pub const ZONE_STROKE_OPACITY: f64 = 0.8;

/// Pixel size of the label drawn on a hazard zone.
pub const ZONE_LABEL_SIZE: (u32, u32) = (60, 20);

/// Pixel size of the fallback hazard marker.
pub const HAZARD_MARKER_SIZE: (u32, u32) = (20, 20);

/// Pixel size of an evacuation center marker.
pub const CENTER_MARKER_SIZE: (u32, u32) = (24, 24);

/// Three shades for one hazard type, lightest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Severity 1-2
    pub low: &'static str,
    /// Severity 3
    pub medium: &'static str,
    /// Severity 4-5
    pub high: &'static str,
}

impl Palette {
    /// Shade for a tier.
    #[must_use]
    pub const fn shade(&self, tier: AlertTier) -> &'static str {
        match tier {
            AlertTier::Low => self.low,
            AlertTier::Medium => self.medium,
            AlertTier::High => self.high,
        }
    }
}

/// Palette for a hazard type.
#[must_use]
pub const fn palette(hazard_type: HazardType) -> Palette {
    match hazard_type {
        HazardType::Flood => Palette {
            low: "#eab308",
            medium: "#f97316",
            high: "#ef4444",
        },
        HazardType::Landslide => Palette {
            low: "#ca8a04",
            medium: "#ea580c",
            high: "#dc2626",
        },
        HazardType::StormSurge => Palette {
            low: "#60a5fa",
            medium: "#3b82f6",
            high: "#2563eb",
        },
        HazardType::Wind => Palette {
            low: "#a78bfa",
            medium: "#8b5cf6",
            high: "#7c3aed",
        },
    }
}

/// Overlay color for a hazard of the given type and severity.
#[must_use]
pub const fn hazard_color(hazard_type: HazardType, severity: HazardSeverity) -> &'static str {
    palette(hazard_type).shade(severity.tier())
}

/// Fill opacity for a hazard zone: `0.6 + severity * 0.1`, capped at 1.0.
#[must_use]
pub fn fill_opacity(severity: HazardSeverity) -> f64 {
    (f64::from(6 + severity.value()) / 10.0).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_is_pure() {
        for &t in HazardType::all() {
            for &s in HazardSeverity::all() {
                assert_eq!(hazard_color(t, s), hazard_color(t, s));
            }
        }
    }

    #[test]
    fn higher_severity_is_never_a_lower_tier() {
        for &t in HazardType::all() {
            let p = palette(t);
            let tier_of = |color: &str| {
                [AlertTier::Low, AlertTier::Medium, AlertTier::High]
                    .into_iter()
                    .find(|&tier| p.shade(tier) == color)
                    .unwrap()
            };
            let high = tier_of(hazard_color(t, HazardSeverity::Critical));
            let low = tier_of(hazard_color(t, HazardSeverity::Low));
            assert!(high >= low, "{t}");
            assert_eq!(high, AlertTier::High);
        }
    }

    #[test]
    fn palettes_have_distinct_shades() {
        for &t in HazardType::all() {
            let p = palette(t);
            assert_ne!(p.low, p.medium);
            assert_ne!(p.medium, p.high);
            assert_ne!(p.low, p.high);
        }
    }

    #[test]
    fn flood_shades() {
        assert_eq!(hazard_color(HazardType::Flood, HazardSeverity::Moderate), "#f97316");
        assert_eq!(hazard_color(HazardType::Flood, HazardSeverity::High), "#ef4444");
        assert_eq!(hazard_color(HazardType::Flood, HazardSeverity::Minimal), "#eab308");
    }

    #[test]
    fn opacity_is_capped() {
        assert!((fill_opacity(HazardSeverity::Minimal) - 0.7).abs() < f64::EPSILON);
        assert!((fill_opacity(HazardSeverity::Moderate) - 0.9).abs() < f64::EPSILON);
        assert!((fill_opacity(HazardSeverity::High) - 1.0).abs() < f64::EPSILON);
        assert!((fill_opacity(HazardSeverity::Critical) - 1.0).abs() < f64::EPSILON);
    }
}
