use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::predict::{
    ground_track, is_over_location, next_pass, GroundTrackPoint, PassPrediction,
};
use crate::propagate::{GeodeticPosition, Propagator};
use crate::tle::{SatelliteInfo, TleElements};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::{run_bounded, AppState};

#[derive(Debug, Deserialize)]
pub struct PositionQuery {
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PositionResponse {
    pub norad_id: String,
    pub timestamp: DateTime<Utc>,
    pub position: GeodeticPosition,
    /// Observer lies inside the configured swath
    pub overhead: bool,
}

#[derive(Debug, Deserialize)]
pub struct GroundTrackQuery {
    pub at: Option<DateTime<Utc>>,
    pub window_minutes: Option<f64>,
    pub step_minutes: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GroundTrackResponse {
    pub norad_id: String,
    pub points: Vec<GroundTrackPoint>,
}

#[derive(Debug, Deserialize)]
pub struct NextPassQuery {
    pub from: Option<DateTime<Utc>>,
    pub min_elevation: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NextPassResponse {
    pub norad_id: String,
    pub reference: DateTime<Utc>,
    pub min_elevation_deg: f64,
    pub pass: Option<PassPrediction>,
}

#[utoipa::path(
    get,
    path = "/api/satellites",
    tag = "satellites",
    responses(
        (status = 200, description = "Loaded satellites", body = Vec<SatelliteInfo>)
    )
)]
pub async fn list_satellites(State(state): State<AppState>) -> Json<Vec<SatelliteInfo>> {
    let catalog = state.catalog.read().await;
    Json(catalog.entries().map(|entry| entry.info()).collect())
}

#[utoipa::path(
    get,
    path = "/api/satellites/{id}/position",
    tag = "satellites",
    params(
        ("id" = String, Path, description = "NORAD catalog number or name"),
        ("at" = Option<String>, Query, description = "Query instant (RFC3339), defaults to now")
    ),
    responses(
        (status = 200, description = "Sub-satellite point", body = PositionResponse),
        (status = 404, description = "Unknown satellite", body = ErrorResponse),
        (status = 422, description = "Propagation failed", body = ErrorResponse)
    )
)]
pub async fn get_position(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PositionQuery>,
) -> ApiResult<Json<PositionResponse>> {
    let elements = find_elements(&state, &id).await?;
    let at = query.at.unwrap_or_else(Utc::now);

    let propagator = Propagator::new(&elements, state.config.propagation.model)?;
    let position = propagator.position_at(at)?;

    let overhead = is_over_location(&position, &state.observer, state.settings.overhead_swath_km);

    Ok(Json(PositionResponse {
        norad_id: elements.norad_id,
        timestamp: at,
        position,
        overhead,
    }))
}

#[utoipa::path(
    get,
    path = "/api/satellites/{id}/ground_track",
    tag = "satellites",
    params(
        ("id" = String, Path, description = "NORAD catalog number or name"),
        ("at" = Option<String>, Query, description = "Window centre (RFC3339), defaults to now"),
        ("window_minutes" = Option<f64>, Query, description = "Window length in minutes"),
        ("step_minutes" = Option<f64>, Query, description = "Sample spacing in minutes")
    ),
    responses(
        (status = 200, description = "Ground track samples", body = GroundTrackResponse),
        (status = 400, description = "Invalid window or step", body = ErrorResponse),
        (status = 404, description = "Unknown satellite", body = ErrorResponse),
        (status = 422, description = "Propagation failed", body = ErrorResponse)
    )
)]
pub async fn get_ground_track(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<GroundTrackQuery>,
) -> ApiResult<Json<GroundTrackResponse>> {
    let elements = find_elements(&state, &id).await?;
    let settings = state.settings;
    let center = query.at.unwrap_or_else(Utc::now);
    let window = query
        .window_minutes
        .map(minutes_to_duration)
        .transpose()?
        .unwrap_or(settings.ground_track_window);
    let step = query
        .step_minutes
        .map(minutes_to_duration)
        .transpose()?
        .unwrap_or(settings.ground_track_step);

    let norad_id = elements.norad_id.clone();
    let model = state.config.propagation.model;
    let points = run_bounded(move || -> ApiResult<_> {
        let propagator = Propagator::new(&elements, model)?;
        Ok(ground_track(&propagator, center, window, step)?)
    })
    .await??;

    Ok(Json(GroundTrackResponse { norad_id, points }))
}

#[utoipa::path(
    get,
    path = "/api/satellites/{id}/next_pass",
    tag = "satellites",
    params(
        ("id" = String, Path, description = "NORAD catalog number or name"),
        ("from" = Option<String>, Query, description = "Search start (RFC3339), defaults to now"),
        ("min_elevation" = Option<f64>, Query, description = "Elevation threshold (degrees)")
    ),
    responses(
        (status = 200, description = "Next pass within 24 hours, if any", body = NextPassResponse),
        (status = 400, description = "Invalid threshold", body = ErrorResponse),
        (status = 404, description = "Unknown satellite", body = ErrorResponse),
        (status = 422, description = "Propagation failed", body = ErrorResponse),
        (status = 504, description = "Search exceeded the query deadline", body = ErrorResponse)
    )
)]
pub async fn get_next_pass(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<NextPassQuery>,
) -> ApiResult<Json<NextPassResponse>> {
    let elements = find_elements(&state, &id).await?;
    let observer = state.observer;
    let reference = query.from.unwrap_or_else(Utc::now);
    let min_elevation_deg = query
        .min_elevation
        .unwrap_or(state.settings.min_elevation_deg);

    let norad_id = elements.norad_id.clone();
    let model = state.config.propagation.model;
    let pass = run_bounded(move || -> ApiResult<_> {
        let propagator = Propagator::new(&elements, model)?;
        Ok(next_pass(&propagator, &observer, min_elevation_deg, reference)?)
    })
    .await??;

    Ok(Json(NextPassResponse {
        norad_id,
        reference,
        min_elevation_deg,
        pass,
    }))
}

async fn find_elements(state: &AppState, id: &str) -> ApiResult<TleElements> {
    let catalog = state.catalog.read().await;
    catalog
        .find(id)
        .map(|entry| entry.elements.clone())
        .ok_or_else(|| ApiError::NotFound(id.to_string()))
}

fn minutes_to_duration(minutes: f64) -> ApiResult<Duration> {
    if !minutes.is_finite() || minutes.abs() > 1e7 {
        return Err(ApiError::Validation(format!(
            "invalid minute value {}",
            minutes
        )));
    }
    Ok(Duration::milliseconds((minutes * 60_000.0).round() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::tle::Catalog;
    use crate::web::build_state;

    fn state() -> AppState {
        build_state(Config::default(), Catalog::builtin().unwrap()).unwrap()
    }

    async fn epoch_of(state: &AppState, id: &str) -> DateTime<Utc> {
        state.catalog.read().await.get(id).unwrap().elements.epoch
    }

    #[tokio::test]
    async fn lists_builtin_catalog() {
        let Json(satellites) = list_satellites(State(state())).await;
        assert_eq!(satellites.len(), 6);
        assert!(satellites.iter().any(|s| s.name == "RESOURCESAT-2"));
    }

    #[tokio::test]
    async fn position_by_name_or_id() {
        let state = state();
        let at = epoch_of(&state, "37387").await;

        let Json(by_id) = get_position(
            State(state.clone()),
            Path("37387".to_string()),
            Query(PositionQuery { at: Some(at) }),
        )
        .await
        .unwrap();
        let Json(by_name) = get_position(
            State(state),
            Path("resourcesat-2".to_string()),
            Query(PositionQuery { at: Some(at) }),
        )
        .await
        .unwrap();

        assert_eq!(by_id.norad_id, "37387");
        assert_eq!(by_id.timestamp, at);
        assert_eq!(by_id.position, by_name.position);
        assert!(by_id.position.altitude_km > 700.0);
    }

    #[tokio::test]
    async fn unknown_satellite_is_not_found() {
        let result = get_position(
            State(state()),
            Path("99999".to_string()),
            Query(PositionQuery { at: None }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn ground_track_uses_query_window() {
        let state = state();
        let at = epoch_of(&state, "37387").await;

        let Json(track) = get_ground_track(
            State(state.clone()),
            Path("37387".to_string()),
            Query(GroundTrackQuery {
                at: Some(at),
                window_minutes: Some(10.0),
                step_minutes: Some(1.0),
            }),
        )
        .await
        .unwrap();
        assert_eq!(track.points.len(), 11);
        assert_eq!(track.points[5].timestamp, at);

        let result = get_ground_track(
            State(state),
            Path("37387".to_string()),
            Query(GroundTrackQuery {
                at: Some(at),
                window_minutes: None,
                step_minutes: Some(0.0),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn queries_do_not_wait_for_tracker() {
        let state = state();
        let at = epoch_of(&state, "37387").await;
        let _busy = state.tracker.clone().lock_owned().await;

        let deadline = std::time::Duration::from_secs(5);
        let position = tokio::time::timeout(
            deadline,
            get_position(
                State(state.clone()),
                Path("37387".to_string()),
                Query(PositionQuery { at: Some(at) }),
            ),
        )
        .await
        .expect("position query blocked on the tracker");
        assert!(position.is_ok());

        let track = tokio::time::timeout(
            deadline,
            get_ground_track(
                State(state.clone()),
                Path("37387".to_string()),
                Query(GroundTrackQuery {
                    at: Some(at),
                    window_minutes: Some(4.0),
                    step_minutes: Some(2.0),
                }),
            ),
        )
        .await
        .expect("ground track query blocked on the tracker");
        assert_eq!(track.unwrap().0.points.len(), 3);

        let pass = tokio::time::timeout(
            deadline,
            get_next_pass(
                State(state),
                Path("37387".to_string()),
                Query(NextPassQuery {
                    from: Some(at),
                    min_elevation: None,
                }),
            ),
        )
        .await
        .expect("next pass query blocked on the tracker");
        assert!(pass.is_ok());
    }

    #[tokio::test]
    async fn next_pass_rejects_nan_threshold() {
        let result = get_next_pass(
            State(state()),
            Path("37387".to_string()),
            Query(NextPassQuery {
                from: None,
                min_elevation: Some(f64::NAN),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn next_pass_defaults_threshold_from_settings() {
        let state = state();
        let from = epoch_of(&state, "37387").await;

        let Json(response) = get_next_pass(
            State(state),
            Path("37387".to_string()),
            Query(NextPassQuery {
                from: Some(from),
                min_elevation: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.reference, from);
        assert_eq!(response.min_elevation_deg, 10.0);
        if let Some(pass) = response.pass {
            assert!(pass.start >= from);
            assert!(pass.peak_elevation_deg >= 10.0);
        }
    }
}
