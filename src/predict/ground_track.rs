use chrono::{DateTime, Duration, Utc};

use crate::predict::error::PredictError;
use crate::predict::types::{GroundTrack, GroundTrackPoint};
use crate::propagate::Propagator;

const MAX_SAMPLES: i64 = 100_000;

/// Sample the sub-satellite point from `center - window/2` to
/// `center + window/2` inclusive, every `step`.
pub fn ground_track(
    propagator: &Propagator,
    center: DateTime<Utc>,
    window: Duration,
    step: Duration,
) -> Result<GroundTrack, PredictError> {
    if step.num_milliseconds() <= 0 {
        return Err(PredictError::InvalidParameters(format!(
            "step must be positive, got {} ms",
            step.num_milliseconds()
        )));
    }
    if window < Duration::zero() {
        return Err(PredictError::InvalidParameters(format!(
            "window must not be negative, got {} ms",
            window.num_milliseconds()
        )));
    }

    let intervals = window.num_milliseconds() / step.num_milliseconds();
    if intervals >= MAX_SAMPLES {
        return Err(PredictError::InvalidParameters(format!(
            "{} samples requested, limit is {}",
            intervals + 1,
            MAX_SAMPLES
        )));
    }

    let half_window = window / 2;
    let (Some(start), Some(_)) = (
        center.checked_sub_signed(half_window),
        center.checked_add_signed(half_window),
    ) else {
        return Err(PredictError::InvalidParameters(format!(
            "window of {} ms around {} leaves the representable time range",
            window.num_milliseconds(),
            center
        )));
    };
    let mut points = Vec::with_capacity(intervals as usize + 1);

    for index in 0..=intervals {
        // Offsets are computed from the start, not accumulated, so spacing
        // stays exact.
        let timestamp = start + step * index as i32;
        let position = propagator.position_at(timestamp)?;
        points.push(GroundTrackPoint {
            timestamp,
            position,
        });
    }

    log::debug!(
        "ground track for {}: {} samples from {}",
        propagator.elements().norad_id,
        points.len(),
        start
    );

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tle::Catalog;

    fn propagator() -> Propagator {
        let catalog = Catalog::builtin().unwrap();
        Propagator::simplified(&catalog.get("37387").unwrap().elements)
    }

    #[test]
    fn two_hour_window_two_minute_step() {
        let propagator = propagator();
        let center = propagator.elements().epoch;
        let track =
            ground_track(&propagator, center, Duration::minutes(120), Duration::minutes(2)).unwrap();

        assert_eq!(track.len(), 61);
        assert_eq!(track[0].timestamp, center - Duration::minutes(60));
        assert_eq!(track[60].timestamp, center + Duration::minutes(60));
        assert_eq!(track[30].timestamp, center);
    }

    #[test]
    fn window_past_time_range_is_rejected() {
        let propagator = propagator();
        let window = Duration::days(365 * 600_000);
        assert!(matches!(
            ground_track(&propagator, propagator.elements().epoch, window, window),
            Err(PredictError::InvalidParameters(_))
        ));
    }

    #[test]
    fn timestamps_strictly_increasing_and_evenly_spaced() {
        let propagator = propagator();
        let step = Duration::seconds(45);
        let track = ground_track(
            &propagator,
            propagator.elements().epoch + Duration::hours(3),
            Duration::minutes(95),
            step,
        )
        .unwrap();

        assert_eq!(track.len(), (95 * 60 / 45) + 1);
        for pair in track.windows(2) {
            assert!(pair[1].timestamp > pair[0].timestamp);
            assert_eq!(pair[1].timestamp - pair[0].timestamp, step);
        }
    }

    #[test]
    fn zero_window_yields_single_sample() {
        let propagator = propagator();
        let center = propagator.elements().epoch;
        let track = ground_track(&propagator, center, Duration::zero(), Duration::minutes(1)).unwrap();
        assert_eq!(track.len(), 1);
        assert_eq!(track[0].timestamp, center);
        assert_eq!(track[0].position, propagator.position_at(center).unwrap());
    }

    #[test]
    fn rejects_degenerate_parameters() {
        let propagator = propagator();
        let center = propagator.elements().epoch;

        for step in [Duration::zero(), Duration::minutes(-1)] {
            assert!(matches!(
                ground_track(&propagator, center, Duration::minutes(10), step),
                Err(PredictError::InvalidParameters(_))
            ));
        }
        assert!(matches!(
            ground_track(&propagator, center, Duration::minutes(-10), Duration::minutes(1)),
            Err(PredictError::InvalidParameters(_))
        ));
    }
}
