use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::predict::{GroundTrackPoint, ObserverLocation, PassPrediction};
use crate::propagate::{GeodeticPosition, PropagationModel};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TrackingStatus {
    /// In orbit, no pass within the next hour
    Active,
    /// Observer is inside the swath right now
    Passing,
    /// Next pass starts within the hour
    Horizon,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrackedSatellite {
    pub norad_id: String,
    pub name: String,
    pub provider: Option<String>,
    /// Absent when propagation failed; never a stale or zeroed coordinate.
    pub position: Option<GeodeticPosition>,
    pub ground_track: Vec<GroundTrackPoint>,
    pub status: TrackingStatus,
    pub next_pass: Option<PassPrediction>,
    pub next_pass_label: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrackingSnapshot {
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observer_name: Option<String>,
    pub observer: ObserverLocation,
    pub satellites: Vec<TrackedSatellite>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingSettings {
    pub model: PropagationModel,
    pub ground_track_window: Duration,
    pub ground_track_step: Duration,
    pub overhead_swath_km: f64,
    pub min_elevation_deg: f64,
    pub cache_resolution: Duration,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            model: PropagationModel::default(),
            ground_track_window: Duration::minutes(120),
            ground_track_step: Duration::minutes(2),
            overhead_swath_km: 500.0,
            min_elevation_deg: 10.0,
            cache_resolution: Duration::seconds(1),
        }
    }
}
