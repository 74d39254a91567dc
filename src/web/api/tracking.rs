use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::tracker::TrackingSnapshot;
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::state::{run_bounded, AppState};

#[derive(Debug, Deserialize)]
pub struct TrackingQuery {
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReloadResponse {
    pub satellite_count: usize,
}

#[utoipa::path(
    get,
    path = "/api/tracking",
    tag = "tracking",
    params(
        ("at" = Option<String>, Query, description = "Snapshot instant (RFC3339), defaults to now")
    ),
    responses(
        (status = 200, description = "Status of every loaded satellite", body = TrackingSnapshot),
        (status = 504, description = "Snapshot exceeded the query deadline", body = ErrorResponse)
    )
)]
pub async fn get_tracking(
    State(state): State<AppState>,
    Query(query): Query<TrackingQuery>,
) -> ApiResult<Json<TrackingSnapshot>> {
    let now = query.at.unwrap_or_else(Utc::now);
    let catalog = state.catalog.clone();
    let tracker = state.tracker.clone();

    let snapshot = run_bounded(move || {
        let catalog = catalog.blocking_read();
        let mut tracker = tracker.blocking_lock();
        tracker.snapshot(&catalog, now)
    })
    .await?;

    Ok(Json(snapshot))
}

#[utoipa::path(
    post,
    path = "/api/catalog/reload",
    tag = "tracking",
    responses(
        (status = 200, description = "Catalog reloaded", body = ReloadResponse),
        (status = 503, description = "Catalog could not be loaded; previous one kept", body = ErrorResponse)
    )
)]
pub async fn reload_catalog(State(state): State<AppState>) -> ApiResult<Json<ReloadResponse>> {
    let config = state.config.clone();
    let fresh = run_bounded(move || config.load_catalog()).await?;
    let fresh = match fresh {
        Ok(catalog) => catalog,
        Err(e) => {
            log::warn!("Catalog reload failed, keeping current one: {}", e);
            return Err(e.into());
        }
    };

    let satellite_count = fresh.len();
    *state.catalog.write().await = fresh;
    state.tracker.lock().await.reset();

    log::info!("Catalog reloaded with {} satellites", satellite_count);
    Ok(Json(ReloadResponse { satellite_count }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::tle::Catalog;
    use crate::web::build_state;

    #[tokio::test(flavor = "multi_thread")]
    async fn snapshot_lists_every_satellite() {
        let state = build_state(Config::default(), Catalog::builtin().unwrap()).unwrap();
        let at = state.catalog.read().await.get("37387").unwrap().elements.epoch;

        let Json(snapshot) = get_tracking(State(state), Query(TrackingQuery { at: Some(at) }))
            .await
            .unwrap();

        assert_eq!(snapshot.timestamp, at);
        assert_eq!(snapshot.satellites.len(), 6);
        assert_eq!(snapshot.observer.latitude_deg, 28.6139);
    }

    #[tokio::test]
    async fn reload_restores_builtin_catalog() {
        let state = build_state(Config::default(), Catalog::default()).unwrap();
        let Json(response) = reload_catalog(State(state.clone())).await.unwrap();
        assert_eq!(response.satellite_count, 6);
        assert_eq!(state.catalog.read().await.len(), 6);
    }
}
