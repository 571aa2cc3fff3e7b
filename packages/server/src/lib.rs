#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the SAGIP hazard data service.
//!
//! Serves the immutable [`HazardCatalog`] as `GeoJSON` feature
//! collections and aggregate statistics. The catalog is built once by the
//! caller and shared read-only across workers, so handlers never lock.
//! CORS is permissive because the map frontend is served from another
//! origin.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use sagip_catalog::HazardCatalog;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default bind address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";

/// Shared application state.
pub struct AppState {
    /// Read-only hazard catalog.
    pub catalog: Arc<HazardCatalog>,
}

/// Network settings for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind.
    pub bind_addr: String,
    /// TCP port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDR` and `PORT`, using the defaults for unset or
    /// unparseable values.
    #[must_use]
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        Self { bind_addr, port }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/hazards/geojson", web::get().to(handlers::hazards_geojson))
            .route("/hazards/stats", web::get().to(handlers::hazard_stats))
            .route(
                "/evacuation/geojson",
                web::get().to(handlers::evacuation_geojson),
            )
            .route("/barangays/geojson", web::get().to(handlers::barangays_geojson)),
    );
}

/// Starts the hazard data API server.
///
/// This is a regular async function; the caller provides the runtime
/// (e.g. via `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
pub async fn run_server(catalog: HazardCatalog, config: ServerConfig) -> std::io::Result<()> {
    log::info!(
        "Serving {} hazards, {} evacuation centers, {} barangays",
        catalog.hazards().len(),
        catalog.evacuation_centers().len(),
        catalog.barangays().len()
    );

    let state = web::Data::new(AppState {
        catalog: Arc::new(catalog),
    });

    let ServerConfig { bind_addr, port } = config;
    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
