use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::propagate::GeodeticPosition;

/// One ground-track sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct GroundTrackPoint {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub position: GeodeticPosition,
}

/// Samples ordered by strictly increasing timestamp.
pub type GroundTrack = Vec<GroundTrackPoint>;

/// The next interval where elevation stays at or above the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct PassPrediction {
    /// First scanned minute at or above the threshold
    pub start: DateTime<Utc>,
    pub peak_elevation_deg: f64,
    pub peak_time: DateTime<Utc>,
    /// First scanned minute back below the threshold; absent only when a
    /// range scan ended during the pass.
    pub end: Option<DateTime<Utc>>,
}

impl PassPrediction {
    pub fn duration_minutes(&self) -> Option<i64> {
        self.end.map(|end| (end - self.start).num_minutes())
    }
}
