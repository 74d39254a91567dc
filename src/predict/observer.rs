use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A point on the ground the satellite is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct ObserverLocation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    #[serde(default)]
    pub altitude_km: f64,
}

impl ObserverLocation {
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_km: 0.0,
        }
    }

    pub fn with_altitude_km(mut self, altitude_km: f64) -> Self {
        self.altitude_km = altitude_km;
        self
    }

    /// Parse `"lat,lon"` in degrees; altitude is given in metres.
    pub fn from_coordinates(coordinates: &str, altitude_m: Option<f64>) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return None;
        }
        let lat: f64 = parts[0].parse().ok()?;
        let lon: f64 = parts[1].parse().ok()?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        let alt_km = altitude_m.unwrap_or(0.0) / 1000.0;
        Some(Self::new(lat, lon).with_altitude_km(alt_km))
    }
}
