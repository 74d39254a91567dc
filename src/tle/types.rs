use chrono::{DateTime, Utc};
use serde::Serialize;

/// Orbital elements decoded from a single two-line element set.
///
/// Angles are kept in degrees and mean motion in revolutions per day, as
/// published; the propagator converts to radians and minutes on use.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TleElements {
    pub name: Option<String>,
    pub norad_id: String,
    pub classification: char,
    pub international_designator: String,
    pub epoch: DateTime<Utc>,
    /// First derivative of mean motion divided by two (rev/day²).
    pub mean_motion_dot: f64,
    /// Second derivative of mean motion divided by six (rev/day³).
    pub mean_motion_ddot: f64,
    pub bstar: f64,
    pub element_set_number: u32,
    pub inclination_deg: f64,
    pub right_ascension_deg: f64,
    pub eccentricity: f64,
    pub argument_of_perigee_deg: f64,
    pub mean_anomaly_deg: f64,
    /// Revolutions per day.
    pub mean_motion: f64,
    pub revolution_number: u32,
    #[serde(skip)]
    pub line1: String,
    #[serde(skip)]
    pub line2: String,
}

impl TleElements {
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("NORAD {}", self.norad_id))
    }

    /// Orbital period in minutes.
    pub fn period_minutes(&self) -> f64 {
        1440.0 / self.mean_motion
    }
}
