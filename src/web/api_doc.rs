use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::satellites::{GroundTrackResponse, NextPassResponse, PositionResponse};
use super::api::tracking::ReloadResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::satellites::list_satellites,
        super::api::satellites::get_position,
        super::api::satellites::get_ground_track,
        super::api::satellites::get_next_pass,
        super::api::tracking::get_tracking,
        super::api::tracking::reload_catalog,
    ),
    components(
        schemas(
            PositionResponse,
            GroundTrackResponse,
            NextPassResponse,
            ReloadResponse,
            ErrorResponse,
            crate::tle::SatelliteInfo,
            crate::propagate::GeodeticPosition,
            crate::predict::ObserverLocation,
            crate::predict::GroundTrackPoint,
            crate::predict::PassPrediction,
            crate::tracker::TrackedSatellite,
            crate::tracker::TrackingSnapshot,
            crate::tracker::TrackingStatus,
        )
    ),
    info(
        title = "Sat-O-Track API",
        description = "Satellite positions, ground tracks and pass predictions",
        version = "0.1.0"
    ),
    tags(
        (name = "satellites", description = "Per-satellite queries"),
        (name = "tracking", description = "Observer dashboard snapshot")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/satellites",
            "/api/satellites/{id}/position",
            "/api/satellites/{id}/ground_track",
            "/api/satellites/{id}/next_pass",
            "/api/tracking",
            "/api/catalog/reload",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
