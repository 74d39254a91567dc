//! Two-body propagation with J2 secular drift.
//!
//! Mean anomaly advances linearly with the J2-corrected mean motion, while
//! the node regresses and the perigee precesses at their closed-form
//! secular rates. Short-period terms, drag
//! and deep-space resonances are not modeled, so accuracy degrades for
//! highly eccentric and geosynchronous orbits.

use std::f64::consts::{PI, TAU};

use chrono::{DateTime, Utc};

use crate::propagate::error::PropagationError;
use crate::propagate::types::StateVector;
use crate::tle::TleElements;

/// Earth gravitational parameter (km³/s²)
pub const MU_EARTH_KM3_S2: f64 = 398_600.8;
/// Equatorial radius used by the J2 rates (km)
pub const EARTH_RADIUS_KM: f64 = 6378.135;
pub const J2: f64 = 1.082_616e-3;

const MINUTES_PER_DAY: f64 = 1440.0;
const KEPLER_TOLERANCE_RAD: f64 = 1e-8;
const KEPLER_MAX_ITERATIONS: usize = 10;

/// Propagate with the simplified J2 model.
pub fn propagate(
    elements: &TleElements,
    at: DateTime<Utc>,
) -> Result<StateVector, PropagationError> {
    SecularElements::from_tle(elements).state_at(minutes_since_epoch(elements, at))
}

pub fn minutes_since_epoch(elements: &TleElements, at: DateTime<Utc>) -> f64 {
    let delta = at.signed_duration_since(elements.epoch);
    match delta.num_microseconds() {
        Some(us) => us as f64 / 60e6,
        None => delta.num_milliseconds() as f64 / 60_000.0,
    }
}

/// Elements in radians and minutes, with J2 secular rates precomputed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecularElements {
    pub semi_major_axis_km: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub right_ascension: f64,
    pub argument_of_perigee: f64,
    pub mean_anomaly: f64,
    /// J2-corrected mean motion (rad/min)
    pub mean_motion: f64,
    /// Nodal regression rate (rad/min)
    pub right_ascension_rate: f64,
    /// Apsidal precession rate (rad/min)
    pub argument_of_perigee_rate: f64,
}

impl SecularElements {
    pub fn from_tle(tle: &TleElements) -> Self {
        let n0 = tle.mean_motion * TAU / MINUTES_PER_DAY;
        let n0_per_s = n0 / 60.0;
        let semi_major_axis_km = (MU_EARTH_KM3_S2 / (n0_per_s * n0_per_s)).cbrt();

        let e = tle.eccentricity;
        let inclination = tle.inclination_deg.to_radians();
        let beta = (1.0 - e * e).sqrt();
        let semi_latus_rectum = semi_major_axis_km * (1.0 - e * e);
        let k = 1.5 * J2 * (EARTH_RADIUS_KM / semi_latus_rectum).powi(2);

        let cos_i = inclination.cos();
        let sin2_i = 1.0 - cos_i * cos_i;
        let mean_motion = n0 * (1.0 + k * beta * (1.0 - 1.5 * sin2_i));

        Self {
            semi_major_axis_km,
            eccentricity: e,
            inclination,
            right_ascension: tle.right_ascension_deg.to_radians(),
            argument_of_perigee: tle.argument_of_perigee_deg.to_radians(),
            mean_anomaly: tle.mean_anomaly_deg.to_radians(),
            mean_motion,
            right_ascension_rate: -k * mean_motion * cos_i,
            argument_of_perigee_rate: 0.5 * k * mean_motion * (5.0 * cos_i * cos_i - 1.0),
        }
    }

    /// ECI state `minutes` after epoch (negative values propagate backward).
    pub fn state_at(&self, minutes: f64) -> Result<StateVector, PropagationError> {
        let mean_anomaly = (self.mean_anomaly + self.mean_motion * minutes).rem_euclid(TAU);
        let right_ascension = self.right_ascension + self.right_ascension_rate * minutes;
        let argument_of_perigee = self.argument_of_perigee + self.argument_of_perigee_rate * minutes;

        let e = self.eccentricity;
        let a = self.semi_major_axis_km;
        let eccentric_anomaly = solve_kepler(mean_anomaly, e)?;

        let (sin_e, cos_e) = eccentric_anomaly.sin_cos();
        let beta = (1.0 - e * e).sqrt();
        let radius = a * (1.0 - e * cos_e);

        // Perifocal frame, x toward perigee
        let r_pqw = [a * (cos_e - e), a * beta * sin_e, 0.0];
        let v_factor = (MU_EARTH_KM3_S2 * a).sqrt() / radius;
        let v_pqw = [-v_factor * sin_e, v_factor * beta * cos_e, 0.0];

        let rot = perifocal_to_eci(right_ascension, self.inclination, argument_of_perigee);
        let state = StateVector {
            position_km: rotate(&rot, r_pqw),
            velocity_km_s: rotate(&rot, v_pqw),
        };

        if !state.is_finite() {
            return Err(PropagationError::InvalidState(format!(
                "non-finite state {} minutes from epoch",
                minutes
            )));
        }
        Ok(state)
    }
}

/// Solve Kepler's equation `E - e sin E = M` by Newton-Raphson.
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> Result<f64, PropagationError> {
    let residual_of = |e_anom: f64| e_anom - eccentricity * e_anom.sin() - mean_anomaly;

    let mut ecc_anomaly = initial_guess(mean_anomaly, eccentricity);
    for _ in 0..KEPLER_MAX_ITERATIONS {
        let residual = residual_of(ecc_anomaly);
        if residual.abs() <= KEPLER_TOLERANCE_RAD {
            return Ok(ecc_anomaly);
        }
        ecc_anomaly -= residual / (1.0 - eccentricity * ecc_anomaly.cos());
    }

    let residual = residual_of(ecc_anomaly);
    if residual.abs() <= KEPLER_TOLERANCE_RAD {
        Ok(ecc_anomaly)
    } else {
        Err(PropagationError::Divergence {
            mean_anomaly,
            eccentricity,
            residual,
        })
    }
}

/// Newton start value. Near-parabolic orbits use the cube-root solution of
/// `E³/6 = M`, which stays on the convergent side of the root near perigee.
fn initial_guess(mean_anomaly: f64, eccentricity: f64) -> f64 {
    if eccentricity < 0.8 {
        return mean_anomaly;
    }
    let reduced = mean_anomaly.rem_euclid(TAU);
    let revolutions = mean_anomaly - reduced;
    let guess = if reduced <= PI {
        (6.0 * reduced).cbrt().min(PI)
    } else {
        TAU - (6.0 * (TAU - reduced)).cbrt().min(PI)
    };
    revolutions + guess
}

fn perifocal_to_eci(raan: f64, inclination: f64, argp: f64) -> [[f64; 3]; 3] {
    let (sin_raan, cos_raan) = raan.sin_cos();
    let (sin_i, cos_i) = inclination.sin_cos();
    let (sin_w, cos_w) = argp.sin_cos();

    [
        [
            cos_raan * cos_w - sin_raan * sin_w * cos_i,
            -cos_raan * sin_w - sin_raan * cos_w * cos_i,
            sin_raan * sin_i,
        ],
        [
            sin_raan * cos_w + cos_raan * sin_w * cos_i,
            -sin_raan * sin_w + cos_raan * cos_w * cos_i,
            -cos_raan * sin_i,
        ],
        [sin_w * sin_i, cos_w * sin_i, cos_i],
    ]
}

fn rotate(rot: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (row, value) in rot.iter().zip(out.iter_mut()) {
        *value = row[0] * v[0] + row[1] * v[1] + row[2] * v[2];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tle::{parse, Catalog};
    use chrono::Duration;

    fn resourcesat() -> TleElements {
        Catalog::builtin()
            .unwrap()
            .get("37387")
            .unwrap()
            .elements
            .clone()
    }

    fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    #[test]
    fn kepler_solution_meets_tolerance() {
        for &e in &[0.0, 0.001, 0.1, 0.5, 0.9] {
            for step in 0..36 {
                let m = step as f64 * TAU / 36.0;
                let ecc = solve_kepler(m, e).unwrap();
                assert!((ecc - e * ecc.sin() - m).abs() <= KEPLER_TOLERANCE_RAD);
            }
        }
    }

    #[test]
    fn near_parabolic_orbits_converge_at_perigee() {
        let anomalies = [
            0.0,
            1e-12,
            1e-9,
            1e-6,
            1e-3,
            0.05,
            TAU - 1e-3,
            TAU - 1e-6,
            TAU - 1e-9,
        ];
        for step in 0..=199 {
            let e = 0.8 + step as f64 * 0.001;
            for &m in anomalies.iter().chain([PI, 1.0, 5.0].iter()) {
                let ecc = solve_kepler(m, e)
                    .unwrap_or_else(|err| panic!("e={} M={}: {}", e, m, err));
                assert!((ecc - e * ecc.sin() - m).abs() <= KEPLER_TOLERANCE_RAD);
            }
        }

        assert_eq!(solve_kepler(0.0, 0.999).unwrap(), 0.0);
    }

    #[test]
    fn kepler_accepts_unreduced_anomaly() {
        let m = 3.0 * TAU + 0.2;
        let ecc = solve_kepler(m, 0.95).unwrap();
        assert!((ecc - 0.95 * ecc.sin() - m).abs() <= KEPLER_TOLERANCE_RAD);
    }

    #[test]
    fn kepler_reports_divergence() {
        match solve_kepler(1.0, f64::NAN) {
            Err(PropagationError::Divergence { .. }) => {}
            other => panic!("expected divergence, got {:?}", other),
        }
    }

    #[test]
    fn epoch_state_matches_elements() {
        let tle = resourcesat();
        let secular = SecularElements::from_tle(&tle);
        let state = propagate(&tle, tle.epoch).unwrap();

        // M = 270 deg and w = 90 deg put the satellite at the ascending node.
        let r = state.radius_km();
        let a = secular.semi_major_axis_km;
        assert!((r - a).abs() <= a * tle.eccentricity + 1e-6);
        assert!(state.position_km[2].abs() < 5.0);
        let node_longitude = state.position_km[1].atan2(state.position_km[0]).to_degrees();
        assert!((node_longitude - tle.right_ascension_deg).abs() < 0.05);

        // Angular momentum gives back the inclination.
        let h = cross(state.position_km, state.velocity_km_s);
        let inclination = (h[2] / crate::propagate::types::norm(h)).acos().to_degrees();
        assert!((inclination - tle.inclination_deg).abs() < 1e-9);

        // Vis-viva gives back the semi-major axis.
        let v = state.speed_km_s();
        let energy = v * v / 2.0 - MU_EARTH_KM3_S2 / r;
        let sma = -MU_EARTH_KM3_S2 / (2.0 * energy);
        assert!((sma - a).abs() < 1e-6 * a);
    }

    #[test]
    fn mean_anomaly_advances_linearly() {
        let tle = resourcesat();
        let mut dragged = tle.clone();
        dragged.mean_motion_dot = 0.01;

        let at = tle.epoch + Duration::days(3);
        assert_eq!(
            propagate(&tle, at).unwrap(),
            propagate(&dragged, at).unwrap()
        );
    }

    #[test]
    fn propagation_is_deterministic() {
        let tle = resourcesat();
        let at = tle.epoch + Duration::minutes(4321);
        assert_eq!(propagate(&tle, at).unwrap(), propagate(&tle, at).unwrap());
    }

    #[test]
    fn one_period_returns_near_start() {
        let tle = resourcesat();
        let period_ms = (tle.period_minutes() * 60_000.0).round() as i64;
        let start = propagate(&tle, tle.epoch).unwrap();
        let later = propagate(&tle, tle.epoch + Duration::milliseconds(period_ms)).unwrap();

        let dx: Vec<f64> = (0..3)
            .map(|i| later.position_km[i] - start.position_km[i])
            .collect();
        let distance = (dx[0] * dx[0] + dx[1] * dx[1] + dx[2] * dx[2]).sqrt();
        // Only J2 drift separates the two points.
        assert!(distance < 100.0, "drifted {} km", distance);
    }

    #[test]
    fn sun_synchronous_node_drifts_east() {
        let secular = SecularElements::from_tle(&resourcesat());
        let degrees_per_day = secular.right_ascension_rate.to_degrees() * MINUTES_PER_DAY;
        assert!((degrees_per_day - 0.9856).abs() < 0.1, "{}", degrees_per_day);
    }

    #[test]
    fn backward_propagation_works() {
        let tle = parse(
            "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927",
            "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537",
        )
        .unwrap();
        let state = propagate(&tle, tle.epoch - Duration::hours(12)).unwrap();
        assert!(state.is_finite());
        let altitude = state.radius_km() - EARTH_RADIUS_KM;
        assert!((250.0..450.0).contains(&altitude), "{}", altitude);
    }
}
