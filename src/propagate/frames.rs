use std::f64::consts::TAU;

use chrono::{DateTime, Utc};

use crate::propagate::error::PropagationError;
use crate::propagate::types::{GeodeticPosition, StateVector};

// WGS-84 constants
const WGS84_A_KM: f64 = 6378.137;
const WGS84_F: f64 = 1.0 / 298.257_223_563;

const JULIAN_DATE_UNIX_EPOCH: f64 = 2_440_587.5;
const JULIAN_DATE_J2000: f64 = 2_451_545.0;
const GEODETIC_TOLERANCE_RAD: f64 = 1e-12;
const GEODETIC_MAX_ITERATIONS: usize = 10;

pub fn julian_date(at: DateTime<Utc>) -> f64 {
    let seconds = at.timestamp() as f64 + f64::from(at.timestamp_subsec_nanos()) * 1e-9;
    JULIAN_DATE_UNIX_EPOCH + seconds / 86_400.0
}

/// Greenwich mean sidereal time in radians, IAU-82 polynomial.
pub fn gmst(at: DateTime<Utc>) -> f64 {
    let t = (julian_date(at) - JULIAN_DATE_J2000) / 36_525.0;
    let seconds = 67_310.548_41 + (876_600.0 * 3600.0 + 8_640_184.812_866) * t
        + 0.093_104 * t * t
        - 6.2e-6 * t * t * t;
    (seconds * TAU / 86_400.0).rem_euclid(TAU)
}

/// Rotate an inertial vector by -GMST about the polar axis.
pub fn eci_to_ecef(position: [f64; 3], gmst: f64) -> [f64; 3] {
    let (sin_gmst, cos_gmst) = gmst.sin_cos();
    [
        position[0] * cos_gmst + position[1] * sin_gmst,
        -position[0] * sin_gmst + position[1] * cos_gmst,
        position[2],
    ]
}

/// Geodetic (latitude rad, longitude rad, altitude km) of an ECEF point by
/// fixed-point iteration on the ellipsoid footpoint.
pub fn ecef_to_geodetic(ecef: [f64; 3]) -> (f64, f64, f64) {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let [x, y, z] = ecef;

    let longitude = y.atan2(x);
    let r = x.hypot(y);

    let mut latitude = z.atan2(r);
    for _ in 0..GEODETIC_MAX_ITERATIONS {
        let sin_lat = latitude.sin();
        let c = 1.0 / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let next = (z + WGS84_A_KM * c * e2 * sin_lat).atan2(r);
        let delta = (next - latitude).abs();
        latitude = next;
        if delta < GEODETIC_TOLERANCE_RAD {
            break;
        }
    }

    let (sin_lat, cos_lat) = latitude.sin_cos();
    let altitude = r * cos_lat + z * sin_lat - WGS84_A_KM * (1.0 - e2 * sin_lat * sin_lat).sqrt();

    (latitude, longitude, altitude)
}

/// Sub-satellite point and speed for an inertial state at `at`.
pub fn eci_to_geodetic(
    state: &StateVector,
    at: DateTime<Utc>,
) -> Result<GeodeticPosition, PropagationError> {
    if !state.is_finite() {
        return Err(PropagationError::InvalidState(format!(
            "non-finite state vector at {}",
            at
        )));
    }

    let ecef = eci_to_ecef(state.position_km, gmst(at));
    let (latitude, longitude, altitude_km) = ecef_to_geodetic(ecef);

    let position = GeodeticPosition {
        latitude_deg: latitude.to_degrees(),
        longitude_deg: longitude.to_degrees(),
        altitude_km,
        speed_km_s: state.speed_km_s(),
    };

    if !(position.latitude_deg.is_finite()
        && position.longitude_deg.is_finite()
        && position.altitude_km.is_finite())
    {
        return Err(PropagationError::InvalidState(format!(
            "geodetic conversion produced non-finite values at {}",
            at
        )));
    }

    Ok(position)
}
