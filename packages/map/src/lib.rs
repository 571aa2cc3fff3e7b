#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Headless map rendering layer.
//!
//! [`MapView`] turns hazard zones and evacuation centers into overlay
//! descriptions (polygons, markers, labels and popups) and fits a
//! viewport around them. It has no drawing backend; the overlays are plain
//! data that a frontend or the CLI can serialize.

pub mod overlay;
pub mod style;
pub mod summary;
pub mod viewport;

use sagip_hazard_models::{EvacuationCenter, HazardZone, LayerFilter};

pub use overlay::{CenterMarker, HazardOverlay, Label, MarkerOverlay, PathStyle, Popup, ZoneOverlay};
pub use style::{EVACUATION_CENTER_COLOR, fill_opacity, hazard_color};
pub use summary::{TypeSummary, hazard_summary};
pub use viewport::{BoundsError, DEFAULT_VIEWPORT, MapConfig, Viewport};

use geo::Rect;
use style::{
    CENTER_MARKER_SIZE, HAZARD_MARKER_SIZE, ZONE_LABEL_SIZE, ZONE_STROKE_OPACITY,
    ZONE_STROKE_WEIGHT,
};
use viewport::{BoundsBuilder, fit_bounds};

/// Hazards that pass `filter`, in their original order.
#[must_use]
pub fn filter_hazards(hazards: &[HazardZone], filter: LayerFilter) -> Vec<HazardZone> {
    hazards
        .iter()
        .filter(|h| filter.matches(h.hazard_type))
        .cloned()
        .collect()
}

/// Rendered state of the hazard map.
#[derive(Debug, Clone)]
pub struct MapView {
    config: MapConfig,
    hazard_overlays: Vec<HazardOverlay>,
    center_markers: Vec<CenterMarker>,
    viewport: Viewport,
    fitted_bounds: Option<Rect<f64>>,
    last_hazards: Vec<HazardZone>,
    last_centers: Vec<EvacuationCenter>,
    selected_layer: LayerFilter,
    rendered: bool,
}

impl Default for MapView {
    fn default() -> Self {
        Self::new(MapConfig::default())
    }
}

impl MapView {
    #[must_use]
    pub const fn new(config: MapConfig) -> Self {
        Self {
            viewport: config.default_view,
            config,
            hazard_overlays: Vec::new(),
            center_markers: Vec::new(),
            fitted_bounds: None,
            last_hazards: Vec::new(),
            last_centers: Vec::new(),
            selected_layer: LayerFilter::All,
            rendered: false,
        }
    }

    /// Clears every overlay and rebuilds from `hazards` and `centers`.
    ///
    /// Hazards outside `selected_layer` are not drawn. The viewport is
    /// refitted afterwards, falling back to the default view when nothing
    /// usable was rendered.
    pub fn render(
        &mut self,
        hazards: &[HazardZone],
        centers: &[EvacuationCenter],
        selected_layer: LayerFilter,
    ) {
        self.hazard_overlays.clear();
        self.center_markers.clear();

        let mut bounds = BoundsBuilder::default();

        for hazard in hazards.iter().filter(|h| selected_layer.matches(h.hazard_type)) {
            if let Some(overlay) = hazard_overlay(hazard) {
                match &overlay {
                    HazardOverlay::Zone(zone) => bounds.add_ring(&zone.ring),
                    HazardOverlay::Marker(marker) => bounds.add_position(marker.label.position),
                }
                self.hazard_overlays.push(overlay);
            } else {
                log::warn!("Hazard {} has no drawable geometry", hazard.id);
            }
        }

        for center in centers {
            let Some(position) = center.geometry.anchor() else {
                log::warn!("Evacuation center {} has no location", center.id);
                continue;
            };
            bounds.add_position(position);
            self.center_markers.push(CenterMarker {
                center_id: center.id,
                position,
                color: EVACUATION_CENTER_COLOR,
                size: CENTER_MARKER_SIZE,
                popup: Popup::for_center(center),
            });
        }

        self.fit(bounds);

        self.last_hazards = hazards.to_vec();
        self.last_centers = centers.to_vec();
        self.selected_layer = selected_layer;
        self.rendered = true;

        log::debug!(
            "Rendered {} hazard overlays and {} evacuation centers ({selected_layer})",
            self.hazard_overlays.len(),
            self.center_markers.len()
        );
    }

    /// Re-renders only if the inputs or the selected layer changed since the
    /// last render. Returns whether a rebuild happened.
    pub fn sync(
        &mut self,
        hazards: &[HazardZone],
        centers: &[EvacuationCenter],
        selected_layer: LayerFilter,
    ) -> bool {
        let unchanged = self.rendered
            && self.selected_layer == selected_layer
            && self.last_hazards == hazards
            && self.last_centers == centers;
        if unchanged {
            return false;
        }
        self.render(hazards, centers, selected_layer);
        true
    }

    fn fit(&mut self, bounds: BoundsBuilder) {
        match bounds.finish().and_then(|rect| fit_bounds(rect, &self.config)) {
            Ok(fitted) => {
                self.viewport = fitted.viewport;
                self.fitted_bounds = Some(fitted.bounds);
            }
            Err(BoundsError::Empty) => {
                self.viewport = self.config.default_view;
                self.fitted_bounds = None;
            }
            Err(e) => {
                log::warn!("Could not fit map bounds, using default view: {e}");
                self.viewport = self.config.default_view;
                self.fitted_bounds = None;
            }
        }
    }

    /// Hazard zones and markers drawn by the last render.
    #[must_use]
    pub fn hazard_overlays(&self) -> &[HazardOverlay] {
        &self.hazard_overlays
    }

    /// Evacuation center markers drawn by the last render.
    #[must_use]
    pub fn center_markers(&self) -> &[CenterMarker] {
        &self.center_markers
    }

    /// Current center and zoom.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Padded bounds of the last successful fit.
    #[must_use]
    pub const fn fitted_bounds(&self) -> Option<Rect<f64>> {
        self.fitted_bounds
    }

    /// Layer used by the last render.
    #[must_use]
    pub const fn selected_layer(&self) -> LayerFilter {
        self.selected_layer
    }

    /// Size and default view the map was created with.
    #[must_use]
    pub const fn config(&self) -> &MapConfig {
        &self.config
    }
}

fn hazard_overlay(hazard: &HazardZone) -> Option<HazardOverlay> {
    let color = hazard_color(hazard.hazard_type, hazard.severity);
    let popup = Popup::for_hazard(hazard);

    if let Some(ring) = hazard.geometry.exterior().filter(|r| !r.is_empty()) {
        let center = hazard
            .geometry
            .bounding_rect()
            .map_or(ring[0], |rect| [rect.center().x, rect.center().y]);
        return Some(HazardOverlay::Zone(ZoneOverlay {
            hazard_id: hazard.id,
            ring: ring.to_vec(),
            style: PathStyle {
                stroke_color: color,
                weight: ZONE_STROKE_WEIGHT,
                stroke_opacity: ZONE_STROKE_OPACITY,
                fill_color: color,
                fill_opacity: fill_opacity(hazard.severity),
            },
            label: Label {
                text: format!("{} {}", hazard.hazard_type, hazard.severity),
                position: center,
                color,
                size: ZONE_LABEL_SIZE,
            },
            popup,
        }));
    }

    let position = hazard.geometry.anchor()?;
    Some(HazardOverlay::Marker(MarkerOverlay {
        hazard_id: hazard.id,
        label: Label {
            text: hazard.severity.to_string(),
            position,
            color,
            size: HAZARD_MARKER_SIZE,
        },
        popup,
    }))
}
