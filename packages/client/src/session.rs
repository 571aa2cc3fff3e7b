//! A mounted hazard map: resolved data, rendered view, and sync clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use sagip_hazard_models::LayerFilter;
use sagip_map::{
    CenterMarker, HazardOverlay, MapConfig, MapView, TypeSummary, Viewport, hazard_summary,
};
use serde::Serialize;

use crate::periodic::PeriodicTask;
use crate::{ApiStatus, HazardFeed, MapData, resolve_map_data};

/// How often the "last updated" clock advances while mounted.
pub const DEFAULT_SYNC_PERIOD: Duration = Duration::from_secs(60);

/// Serializable snapshot of a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapReport {
    pub status: ApiStatus,
    pub selected_layer: String,
    pub viewport: Viewport,
    pub hazard_overlays: Vec<HazardOverlay>,
    pub evacuation_centers: Vec<CenterMarker>,
    pub summary: Vec<TypeSummary>,
    pub last_updated: DateTime<Utc>,
}

/// Data and view for one mounted map.
///
/// Mounting resolves the data once and starts the sync ticker; the data is
/// not refetched for the lifetime of the session.
#[derive(Debug)]
pub struct MapSession {
    data: MapData,
    view: MapView,
    last_updated: Arc<AtomicI64>,
    ticker: Option<PeriodicTask>,
}

impl MapSession {
    /// Resolves data from `feed`, renders every layer, and starts the sync
    /// ticker.
    pub async fn mount(feed: &dyn HazardFeed, config: MapConfig, sync_period: Duration) -> Self {
        let data = resolve_map_data(feed).await;

        let mut view = MapView::new(config);
        view.render(&data.hazards.value, &data.centers.value, LayerFilter::All);

        let last_updated = Arc::new(AtomicI64::new(Utc::now().timestamp_millis()));
        let clock = Arc::clone(&last_updated);
        let ticker = PeriodicTask::start(sync_period, move || {
            clock.store(Utc::now().timestamp_millis(), Ordering::Relaxed);
            async {}
        });

        Self {
            data,
            view,
            last_updated,
            ticker: Some(ticker),
        }
    }

    /// Switches the visible layer. Returns whether the view was rebuilt.
    pub fn select_layer(&mut self, layer: LayerFilter) -> bool {
        self.view
            .sync(&self.data.hazards.value, &self.data.centers.value, layer)
    }

    #[must_use]
    pub const fn data(&self) -> &MapData {
        &self.data
    }

    #[must_use]
    pub const fn view(&self) -> &MapView {
        &self.view
    }

    #[must_use]
    pub const fn status(&self) -> ApiStatus {
        self.data.status()
    }

    /// Time of the last sync tick.
    #[must_use]
    pub fn last_updated(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_updated.load(Ordering::Relaxed))
            .unwrap_or_default()
    }

    /// Whether the sync ticker is running.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.ticker.as_ref().is_some_and(PeriodicTask::is_running)
    }

    /// Per-type summary over every resolved hazard, regardless of the
    /// selected layer.
    #[must_use]
    pub fn summary(&self) -> Vec<TypeSummary> {
        hazard_summary(&self.data.hazards.value)
    }

    #[must_use]
    pub fn report(&self) -> MapReport {
        MapReport {
            status: self.status(),
            selected_layer: self.view.selected_layer().to_string(),
            viewport: self.view.viewport(),
            hazard_overlays: self.view.hazard_overlays().to_vec(),
            evacuation_centers: self.view.center_markers().to_vec(),
            summary: self.summary(),
            last_updated: self.last_updated(),
        }
    }

    /// Stops the sync ticker.
    pub async fn unmount(mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::CatalogFeed;
    use crate::{BackendStatus, Provenance};
    use sagip_catalog::HazardCatalog;
    use sagip_hazard_models::HazardType;

    #[tokio::test]
    async fn mount_renders_live_catalog() {
        let feed = CatalogFeed::new(HazardCatalog::builtin());
        let mut session = MapSession::mount(&feed, MapConfig::default(), DEFAULT_SYNC_PERIOD).await;

        assert!(session.is_mounted());
        assert_eq!(session.status().backend, BackendStatus::Connected);
        assert_eq!(session.view().hazard_overlays().len(), 4);
        assert!(
            session
                .view()
                .hazard_overlays()
                .iter()
                .all(|o| matches!(o, HazardOverlay::Zone(_)))
        );
        assert_eq!(session.view().center_markers().len(), 3);

        assert!(session.select_layer(LayerFilter::Only(HazardType::Landslide)));
        assert_eq!(session.view().hazard_overlays().len(), 2);
        assert!(!session.select_layer(LayerFilter::Only(HazardType::Landslide)));

        let summary = session.summary();
        assert_eq!(summary[0].count, 2);
        assert_eq!(summary[1].count, 2);

        session.unmount().await;
    }

    #[tokio::test]
    async fn mock_session_draws_markers() {
        struct Down;

        #[async_trait::async_trait]
        impl HazardFeed for Down {
            async fn hazards(&self) -> Result<geojson::FeatureCollection, crate::FetchError> {
                Err(crate::FetchError::Status {
                    url: "http://localhost:8000/api/hazards/geojson".to_string(),
                    status: 502,
                })
            }

            async fn evacuation_centers(
                &self,
            ) -> Result<geojson::FeatureCollection, crate::FetchError> {
                Err(crate::FetchError::Status {
                    url: "http://localhost:8000/api/evacuation/geojson".to_string(),
                    status: 502,
                })
            }

            fn describe(&self) -> String {
                "down".to_string()
            }
        }

        let session = MapSession::mount(&Down, MapConfig::default(), DEFAULT_SYNC_PERIOD).await;
        let report = session.report();

        assert_eq!(report.status.hazards, Provenance::Mock);
        assert_eq!(report.selected_layer, "all");
        assert_eq!(report.hazard_overlays.len(), 3);
        assert!(
            report
                .hazard_overlays
                .iter()
                .all(|o| matches!(o, HazardOverlay::Marker(_)))
        );
        assert_eq!(report.hazard_overlays[0].label().text, "3");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"]["backend"], "disconnected");
        assert_eq!(json["hazardOverlays"][0]["kind"], "marker");

        session.unmount().await;
    }
}
