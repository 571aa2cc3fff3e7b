//! HTTP handler functions for the SAGIP hazard data API.

use std::str::FromStr as _;

use actix_web::{HttpResponse, web};
use sagip_catalog::HazardQuery;
use sagip_hazard_models::{HazardSeverity, HazardType};
use sagip_server_models::{ApiError, ApiHealth, HazardQueryParams};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth::ok())
}

/// `GET /api/hazards/geojson`
///
/// Returns every hazard as a `FeatureCollection` in catalog order.
/// Optional `hazardType` and `minSeverity` parameters narrow the listing.
pub async fn hazards_geojson(
    state: web::Data<AppState>,
    params: web::Query<HazardQueryParams>,
) -> HttpResponse {
    match parse_hazard_query(&params) {
        Ok(query) => HttpResponse::Ok().json(state.catalog.query_hazards_geojson(&query)),
        Err(message) => {
            log::warn!("Rejected hazard query: {message}");
            HttpResponse::BadRequest().json(ApiError { error: message })
        }
    }
}

/// `GET /api/evacuation/geojson`
pub async fn evacuation_geojson(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.catalog.list_evacuation_centers_geojson())
}

/// `GET /api/barangays/geojson`
pub async fn barangays_geojson(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.catalog.list_barangays_geojson())
}

/// `GET /api/hazards/stats`
///
/// Returns hazard counts by type and severity over the whole catalog.
pub async fn hazard_stats(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.catalog.compute_hazard_stats())
}

/// Converts raw query parameters into a [`HazardQuery`].
fn parse_hazard_query(params: &HazardQueryParams) -> Result<HazardQuery, String> {
    let hazard_type = params
        .hazard_type
        .as_deref()
        .map(|s| HazardType::from_str(s).map_err(|_| format!("Unknown hazard type '{s}'")))
        .transpose()?;

    let min_severity = params
        .min_severity
        .as_deref()
        .map(|s| {
            let value = s
                .trim()
                .parse::<u8>()
                .map_err(|_| format!("invalid severity value '{s}': expected 1-5"))?;
            HazardSeverity::from_value(value).map_err(|e| e.to_string())
        })
        .transpose()?;

    Ok(HazardQuery {
        hazard_type,
        min_severity,
    })
}
