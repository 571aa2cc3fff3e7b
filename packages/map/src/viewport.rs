//! Viewport fitting in Web Mercator.
//!
//! Fitting pads the bounds of everything rendered and picks the largest
//! integer zoom at which the padded bounds fit the map's pixel size,
//! the way slippy-map widgets do.

use std::f64::consts::PI;

use geo::{Coord, Rect};
use sagip_hazard_models::Position;
use serde::Serialize;
use thiserror::Error;

/// Latitude limit of the Web Mercator projection.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Side length of a zoom-0 tile in pixels.
const TILE_SIZE: f64 = 256.0;

/// Map center and zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    /// `[longitude, latitude]` at the center of the map.
    pub center: Position,
    /// Integer zoom level.
    pub zoom: u8,
}

/// View over Barangay Batong Malake, Los Baños, used whenever nothing can
/// be fitted.
pub const DEFAULT_VIEWPORT: Viewport = Viewport {
    center: [121.24, 14.165],
    zoom: 16,
};

/// Errors from computing a fitted viewport.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BoundsError {
    /// Nothing with a usable position was rendered.
    #[error("No geometries to fit")]
    Empty,

    /// A coordinate is NaN or infinite.
    #[error("Non-finite coordinate in bounds")]
    NonFinite,

    /// A latitude lies outside the projectable range.
    #[error("Latitude {lat} outside the Web Mercator range")]
    OutOfRange {
        /// The offending latitude.
        lat: f64,
    },
}

/// Pixel size and zoom limits of the map widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    /// Widget width in pixels.
    pub width_px: u32,
    /// Widget height in pixels.
    pub height_px: u32,
    /// Highest zoom the tile source serves.
    pub max_zoom: u8,
    /// Fraction of the bounds' span added on every side before fitting.
    pub padding_ratio: f64,
    /// View applied when nothing can be fitted.
    pub default_view: Viewport,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width_px: 800,
            height_px: 500,
            max_zoom: 19,
            padding_ratio: 0.1,
            default_view: DEFAULT_VIEWPORT,
        }
    }
}

/// Result of a successful fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedView {
    /// Chosen center and zoom.
    pub viewport: Viewport,
    /// Padded bounds that were fitted.
    pub bounds: Rect<f64>,
}

/// Accumulates the bounds of rendered geometries.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundsBuilder {
    rect: Option<Rect<f64>>,
    invalid: Option<BoundsError>,
}

impl BoundsBuilder {
    /// Adds one position.
    pub fn add_position(&mut self, position: Position) {
        self.add_rect(Rect::new(Coord::from(position), Coord::from(position)));
    }

    /// Adds every vertex of a ring.
    pub fn add_ring(&mut self, ring: &[Position]) {
        for &position in ring {
            self.add_position(position);
        }
    }

    fn add_rect(&mut self, rect: Rect<f64>) {
        let (min, max) = (rect.min(), rect.max());
        if ![min.x, min.y, max.x, max.y].iter().all(|v| v.is_finite()) {
            self.invalid.get_or_insert(BoundsError::NonFinite);
            return;
        }
        for lat in [min.y, max.y] {
            if lat.abs() > MAX_LATITUDE {
                self.invalid.get_or_insert(BoundsError::OutOfRange { lat });
                return;
            }
        }

        self.rect = Some(match self.rect {
            None => rect,
            Some(acc) => Rect::new(
                Coord {
                    x: acc.min().x.min(min.x),
                    y: acc.min().y.min(min.y),
                },
                Coord {
                    x: acc.max().x.max(max.x),
                    y: acc.max().y.max(max.y),
                },
            ),
        });
    }

    /// The accumulated bounds.
    ///
    /// # Errors
    ///
    /// Returns [`BoundsError`] if any added coordinate was invalid or
    /// nothing was added.
    pub fn finish(self) -> Result<Rect<f64>, BoundsError> {
        if let Some(err) = self.invalid {
            return Err(err);
        }
        self.rect.ok_or(BoundsError::Empty)
    }
}

/// Grows `rect` by `ratio` of its span on every side, keeping latitudes
/// inside the projectable range.
#[must_use]
pub fn pad(rect: Rect<f64>, ratio: f64) -> Rect<f64> {
    let dx = rect.width() * ratio;
    let dy = rect.height() * ratio;
    Rect::new(
        Coord {
            x: rect.min().x - dx,
            y: (rect.min().y - dy).max(-MAX_LATITUDE),
        },
        Coord {
            x: rect.max().x + dx,
            y: (rect.max().y + dy).min(MAX_LATITUDE),
        },
    )
}

/// Projects a latitude to the zoom-0 Web Mercator pixel row.
fn mercator_y(lat: f64) -> f64 {
    let phi = lat.to_radians();
    (1.0 - (phi / 2.0 + PI / 4.0).tan().ln() / PI) / 2.0 * TILE_SIZE
}

/// Fits `bounds` into the configured map size.
///
/// # Errors
///
/// Returns [`BoundsError`] if the bounds are not finite or not
/// projectable.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn fit_bounds(bounds: Rect<f64>, config: &MapConfig) -> Result<FittedView, BoundsError> {
    let mut check = BoundsBuilder::default();
    check.add_rect(bounds);
    let bounds = pad(check.finish()?, config.padding_ratio);

    let span_x = bounds.width() / 360.0 * TILE_SIZE;
    let span_y = (mercator_y(bounds.min().y) - mercator_y(bounds.max().y)).abs();

    let scale_x = f64::from(config.width_px) / span_x;
    let scale_y = f64::from(config.height_px) / span_y;
    let scale = scale_x.min(scale_y);

    let max_zoom = f64::from(config.max_zoom);
    let zoom = if scale.is_finite() {
        scale.log2().floor().clamp(0.0, max_zoom)
    } else {
        // Zero-size bounds (a single point) fit at any zoom.
        max_zoom
    };

    let center = bounds.center();
    Ok(FittedView {
        viewport: Viewport {
            center: [center.x, center.y],
            zoom: zoom as u8,
        },
        bounds,
    })
}
