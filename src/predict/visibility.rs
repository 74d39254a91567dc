//! Surface-distance visibility model.
//!
//! Distances use the haversine formula on a spherical Earth. Elevation is
//! approximated as `atan2(altitude difference, surface distance)` and clamped
//! at zero, so anything below the horizon reads as 0 rather than a negative
//! angle. This is a monotonic "how high above the horizon" signal, not the
//! literal topocentric elevation.

use crate::predict::observer::ObserverLocation;
use crate::propagate::GeodeticPosition;

/// Mean Earth radius (km)
pub const MEAN_EARTH_RADIUS_KM: f64 = 6371.0;

/// Anything with a geodetic latitude, longitude, and altitude.
pub trait SurfacePoint {
    fn latitude_deg(&self) -> f64;
    fn longitude_deg(&self) -> f64;
    fn altitude_km(&self) -> f64;
}

impl SurfacePoint for ObserverLocation {
    fn latitude_deg(&self) -> f64 {
        self.latitude_deg
    }

    fn longitude_deg(&self) -> f64 {
        self.longitude_deg
    }

    fn altitude_km(&self) -> f64 {
        self.altitude_km
    }
}

impl SurfacePoint for GeodeticPosition {
    fn latitude_deg(&self) -> f64 {
        self.latitude_deg
    }

    fn longitude_deg(&self) -> f64 {
        self.longitude_deg
    }

    fn altitude_km(&self) -> f64 {
        self.altitude_km
    }
}

/// Great-circle distance between two surface points (km).
pub fn surface_distance_km(a: &impl SurfacePoint, b: &impl SurfacePoint) -> f64 {
    let lat1 = a.latitude_deg().to_radians();
    let lat2 = b.latitude_deg().to_radians();
    let d_lat = (b.latitude_deg() - a.latitude_deg()).to_radians();
    let d_lon = (b.longitude_deg() - a.longitude_deg()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt());
    MEAN_EARTH_RADIUS_KM * c
}

/// Approximate elevation of `subpoint` seen from `observer`, degrees, >= 0.
pub fn elevation_deg(observer: &impl SurfacePoint, subpoint: &impl SurfacePoint) -> f64 {
    let distance = surface_distance_km(observer, subpoint);
    let height = subpoint.altitude_km() - observer.altitude_km();
    height.atan2(distance).to_degrees().max(0.0)
}

/// True when `target` lies inside the swath centred on the sub-satellite point.
pub fn is_over_location(
    satellite: &impl SurfacePoint,
    target: &impl SurfacePoint,
    swath_width_km: f64,
) -> bool {
    surface_distance_km(satellite, target) < swath_width_km / 2.0
}
