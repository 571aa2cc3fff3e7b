//! Sources of hazard and evacuation center collections.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use geojson::FeatureCollection;
use sagip_catalog::HazardCatalog;

use crate::FetchError;

/// Environment variable overriding the API base URL.
pub const API_URL_ENV_VAR: &str = "SAGIP_API_URL";

/// API base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Per-request timeout of [`HttpFeed`].
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A source of hazard map collections.
#[async_trait]
pub trait HazardFeed: Send + Sync {
    /// Fetches the hazard zone collection.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the collection cannot be obtained.
    async fn hazards(&self) -> Result<FeatureCollection, FetchError>;

    /// Fetches the evacuation center collection.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the collection cannot be obtained.
    async fn evacuation_centers(&self) -> Result<FeatureCollection, FetchError>;

    /// Short description for log messages.
    fn describe(&self) -> String;
}

/// Fetches collections from the hazard data API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFeed {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFeed {
    /// Creates a feed for the API rooted at `base_url`
    /// (e.g. `http://localhost:8000/api`).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a feed for `SAGIP_API_URL`, or the local default.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be built.
    pub fn from_env() -> Result<Self, FetchError> {
        let base_url =
            std::env::var(API_URL_ENV_VAR).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(&base_url)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_collection(&self, path: &str) -> Result<FeatureCollection, FetchError> {
        let url = format!("{}{path}", self.base_url);
        log::debug!("GET {url}");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl HazardFeed for HttpFeed {
    async fn hazards(&self) -> Result<FeatureCollection, FetchError> {
        self.get_collection("/hazards/geojson").await
    }

    async fn evacuation_centers(&self) -> Result<FeatureCollection, FetchError> {
        self.get_collection("/evacuation/geojson").await
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Serves collections straight from an in-process catalog.
#[derive(Debug, Clone)]
pub struct CatalogFeed {
    catalog: Arc<HazardCatalog>,
}

impl CatalogFeed {
    #[must_use]
    pub fn new(catalog: HazardCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

#[async_trait]
impl HazardFeed for CatalogFeed {
    async fn hazards(&self) -> Result<FeatureCollection, FetchError> {
        Ok(self.catalog.list_hazards_geojson())
    }

    async fn evacuation_centers(&self) -> Result<FeatureCollection, FetchError> {
        Ok(self.catalog.list_evacuation_centers_geojson())
    }

    fn describe(&self) -> String {
        "local catalog".to_string()
    }
}

#[cfg(test)]
mod tests {
    use actix_web::dev::ServerHandle;
    use actix_web::{App, HttpResponse, HttpServer, web};
    use sagip_server::AppState;

    use super::*;
    use crate::{BackendStatus, MapData, Provenance, resolve_map_data};

    /// Serves `routes` on an ephemeral local port and returns the API base
    /// URL.
    fn start_server(
        catalog: HazardCatalog,
        routes: fn(&mut web::ServiceConfig),
    ) -> (String, ServerHandle) {
        let state = web::Data::new(AppState {
            catalog: Arc::new(catalog),
        });
        let server = HttpServer::new(move || App::new().app_data(state.clone()).configure(routes))
            .workers(1)
            .bind(("127.0.0.1", 0))
            .unwrap();
        let base_url = format!("http://{}/api", server.addrs()[0]);

        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        (base_url, handle)
    }

    fn broken_routes(cfg: &mut web::ServiceConfig) {
        cfg.route(
            "/api/hazards/geojson",
            web::get().to(|| async {
                HttpResponse::Ok()
                    .content_type("text/html")
                    .body("<html><body>Maintenance</body></html>")
            }),
        )
        .route(
            "/api/evacuation/geojson",
            web::get().to(|| async { HttpResponse::ServiceUnavailable().finish() }),
        );
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let feed = HttpFeed::new("http://localhost:8000/api/").unwrap();
        assert_eq!(feed.base_url(), "http://localhost:8000/api");
    }

    #[tokio::test]
    async fn catalog_feed_lists_every_entity() {
        let feed = CatalogFeed::new(HazardCatalog::builtin());
        assert_eq!(feed.hazards().await.unwrap().features.len(), 4);
        assert_eq!(feed.evacuation_centers().await.unwrap().features.len(), 3);
    }

    #[actix_web::test]
    async fn http_feed_reads_running_server() {
        let (base_url, handle) = start_server(HazardCatalog::builtin(), sagip_server::configure);
        let feed = HttpFeed::new(&base_url).unwrap();

        let data = resolve_map_data(&feed).await;
        assert_eq!(data.hazards.provenance, Provenance::Live);
        assert_eq!(data.centers.provenance, Provenance::Live);
        assert_eq!(data.status().backend, BackendStatus::Connected);
        assert_eq!(data.hazards.value.len(), 4);
        assert_eq!(data.centers.value.len(), 3);

        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn http_feed_rejects_error_status_and_html_body() {
        let (base_url, handle) = start_server(HazardCatalog::builtin(), broken_routes);
        let feed = HttpFeed::new(&base_url).unwrap();

        assert!(matches!(feed.hazards().await, Err(FetchError::Json(_))));
        match feed.evacuation_centers().await {
            Err(FetchError::Status { url, status }) => {
                assert_eq!(status, 503);
                assert_eq!(url, format!("{base_url}/evacuation/geojson"));
            }
            other => panic!("expected status error, got {other:?}"),
        }

        let data = resolve_map_data(&feed).await;
        assert_eq!(data.hazards.provenance, Provenance::Mock);
        assert_eq!(data.centers.provenance, Provenance::Mock);
        assert_eq!(data.status().backend, BackendStatus::Disconnected);
        assert_eq!(data, MapData::mock());

        handle.stop(true).await;
    }
}
