//! Rendered overlay objects and their popups.

use sagip_hazard_models::{EvacuationCenter, HazardZone, Position};
use serde::Serialize;

/// Stroke and fill settings of a hazard zone polygon.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStyle {
    /// Outline color.
    pub stroke_color: &'static str,
    /// Outline width in pixels.
    pub weight: f64,
    /// Outline opacity.
    pub stroke_opacity: f64,
    /// Fill color.
    pub fill_color: &'static str,
    /// Fill opacity, at most 1.0.
    pub fill_opacity: f64,
}

/// A text badge anchored at a map position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    /// Badge text.
    pub text: String,
    /// Anchor position.
    pub position: Position,
    /// Background color.
    pub color: &'static str,
    /// Width and height in pixels.
    pub size: (u32, u32),
}

/// Detail panel shown when an overlay is clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Popup {
    /// Heading line.
    pub title: String,
    /// Detail lines in display order.
    pub lines: Vec<String>,
}

impl Popup {
    /// Popup for a hazard zone. The affected-population line is omitted
    /// when the value is absent or zero.
    #[must_use]
    pub fn for_hazard(hazard: &HazardZone) -> Self {
        let mut lines = vec![
            format!("Severity: {}/5", hazard.severity),
            format!("Source: {}", hazard.source),
            format!("Confidence: {:.0}%", (hazard.confidence * 100.0).round()),
        ];
        if let Some(affected) = hazard.affected_population.filter(|&n| n > 0) {
            lines.push(format!("Affected: {affected} people"));
        }
        lines.push(format!("Elevation: {}m", hazard.elevation));

        Self {
            title: format!("{} Hazard Zone", hazard.hazard_type),
            lines,
        }
    }

    /// Popup for an evacuation center. The address line is omitted when
    /// absent or blank.
    #[must_use]
    pub fn for_center(center: &EvacuationCenter) -> Self {
        let mut lines = vec![format!("Capacity: {} people", center.capacity)];
        if let Some(address) = center.address.as_deref().filter(|a| !a.trim().is_empty()) {
            lines.push(address.to_string());
        }

        Self {
            title: center.name.clone(),
            lines,
        }
    }

    /// Renders the popup as an HTML fragment with escaped text.
    #[must_use]
    pub fn to_html(&self) -> String {
        use std::fmt::Write as _;

        let mut html = String::from("<div>");
        let _ = write!(
            html,
            "<h3 class=\"font-bold text-sm\">{}</h3>",
            escape_html(&self.title)
        );
        for line in &self.lines {
            let _ = write!(html, "<p class=\"text-xs\">{}</p>", escape_html(line));
        }
        html.push_str("</div>");
        html
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// A hazard drawn as a filled polygon with a centered label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneOverlay {
    /// Source hazard ID.
    pub hazard_id: u32,
    /// Exterior ring. Holes are not drawn.
    pub ring: Vec<Position>,
    /// Stroke and fill.
    pub style: PathStyle,
    /// `"<TYPE> <severity>"` badge at the center of the ring's bounds.
    pub label: Label,
    /// Detail popup.
    pub popup: Popup,
}

/// A hazard without polygon geometry, drawn as a small round marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerOverlay {
    /// Source hazard ID.
    pub hazard_id: u32,
    /// Marker badge showing the severity only.
    pub label: Label,
    /// Detail popup.
    pub popup: Popup,
}

/// One rendered hazard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HazardOverlay {
    /// Polygon geometry.
    Zone(ZoneOverlay),
    /// Point or fallback geometry.
    Marker(MarkerOverlay),
}

impl HazardOverlay {
    /// Source hazard ID.
    #[must_use]
    pub const fn hazard_id(&self) -> u32 {
        match self {
            Self::Zone(zone) => zone.hazard_id,
            Self::Marker(marker) => marker.hazard_id,
        }
    }

    /// Detail popup.
    #[must_use]
    pub const fn popup(&self) -> &Popup {
        match self {
            Self::Zone(zone) => &zone.popup,
            Self::Marker(marker) => &marker.popup,
        }
    }

    /// Label or badge.
    #[must_use]
    pub const fn label(&self) -> &Label {
        match self {
            Self::Zone(zone) => &zone.label,
            Self::Marker(marker) => &marker.label,
        }
    }
}

/// A rendered evacuation center.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CenterMarker {
    /// Source center ID.
    pub center_id: u32,
    /// Marker position.
    pub position: Position,
    /// Marker color.
    pub color: &'static str,
    /// Width and height in pixels.
    pub size: (u32, u32),
    /// Detail popup.
    pub popup: Popup,
}
