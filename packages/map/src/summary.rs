//! Per-type hazard summary shown beside the map.

use sagip_hazard_models::{HazardSeverity, HazardType, HazardZone};
use serde::Serialize;

use crate::style::hazard_color;

/// Count and average severity of one hazard type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSummary {
    pub hazard_type: HazardType,
    pub count: usize,
    /// Mean severity rounded to the nearest level, `None` when `count` is 0.
    pub mean_severity: Option<HazardSeverity>,
    /// Legend swatch for the rounded mean.
    pub color: &'static str,
}

/// Summarizes `hazards` for every hazard type, in declaration order.
#[must_use]
pub fn hazard_summary(hazards: &[HazardZone]) -> Vec<TypeSummary> {
    HazardType::all()
        .iter()
        .map(|&hazard_type| {
            let (count, total) = hazards
                .iter()
                .filter(|h| h.hazard_type == hazard_type)
                .fold((0_usize, 0_u32), |(n, sum), h| {
                    (n + 1, sum + u32::from(h.severity.value()))
                });

            let mean_severity = mean_level(count, total);
            TypeSummary {
                hazard_type,
                count,
                mean_severity,
                color: hazard_color(
                    hazard_type,
                    mean_severity.unwrap_or(HazardSeverity::Minimal),
                ),
            }
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn mean_level(count: usize, total: u32) -> Option<HazardSeverity> {
    if count == 0 {
        return None;
    }
    let mean = (f64::from(total) / count as f64).round();
    HazardSeverity::from_value(mean as u8).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sagip_hazard_models::HazardGeometry;

    fn hazard(id: u32, hazard_type: HazardType, severity: HazardSeverity) -> HazardZone {
        HazardZone {
            id,
            hazard_type,
            severity,
            geometry: HazardGeometry::Point([121.24, 14.165]),
            source: "UP_NOAH".to_string(),
            confidence: 0.8,
            elevation: 10.0,
            affected_population: None,
        }
    }

    #[test]
    fn covers_every_type() {
        let summary = hazard_summary(&[]);
        assert_eq!(summary.len(), 4);
        assert!(summary.iter().all(|s| s.count == 0 && s.mean_severity.is_none()));
        assert_eq!(summary[0].color, "#eab308");
    }

    #[test]
    fn mean_is_rounded() {
        let hazards = [
            hazard(1, HazardType::Flood, HazardSeverity::Moderate),
            hazard(2, HazardType::Flood, HazardSeverity::Low),
            hazard(3, HazardType::Landslide, HazardSeverity::High),
            hazard(4, HazardType::Landslide, HazardSeverity::Moderate),
        ];
        let summary = hazard_summary(&hazards);

        let flood = &summary[0];
        assert_eq!(flood.hazard_type, HazardType::Flood);
        assert_eq!(flood.count, 2);
        // 2.5 rounds away from zero
        assert_eq!(flood.mean_severity, Some(HazardSeverity::Moderate));
        assert_eq!(flood.color, "#f97316");

        let landslide = &summary[1];
        assert_eq!(landslide.count, 2);
        assert_eq!(landslide.mean_severity, Some(HazardSeverity::High));
        assert_eq!(landslide.color, "#dc2626");
    }
}
