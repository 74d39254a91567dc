use chrono::{DateTime, Duration, Utc};

use crate::predict::error::PredictError;
use crate::predict::observer::ObserverLocation;
use crate::predict::types::PassPrediction;
use crate::predict::visibility::elevation_deg;
use crate::propagate::Propagator;

/// Scan length of `next_pass`, one sample per minute.
pub const SEARCH_HORIZON_MINUTES: i64 = 1440;
const SCAN_STEP: Duration = Duration::minutes(1);

#[derive(Debug, Clone, Copy)]
enum ScanState {
    Searching,
    InPass {
        start: DateTime<Utc>,
        peak_elevation_deg: f64,
        peak_time: DateTime<Utc>,
    },
}

impl ScanState {
    /// Feed one sample; returns the pass once elevation drops back below the
    /// threshold.
    fn advance(
        &mut self,
        at: DateTime<Utc>,
        elevation: f64,
        min_elevation: f64,
    ) -> Option<PassPrediction> {
        let above = elevation >= min_elevation;
        match *self {
            ScanState::Searching => {
                if above {
                    *self = ScanState::InPass {
                        start: at,
                        peak_elevation_deg: elevation,
                        peak_time: at,
                    };
                }
                None
            }
            ScanState::InPass {
                start,
                peak_elevation_deg,
                peak_time,
            } => {
                if above {
                    if elevation > peak_elevation_deg {
                        *self = ScanState::InPass {
                            start,
                            peak_elevation_deg: elevation,
                            peak_time: at,
                        };
                    }
                    None
                } else {
                    *self = ScanState::Searching;
                    Some(PassPrediction {
                        start,
                        peak_elevation_deg,
                        peak_time,
                        end: Some(at),
                    })
                }
            }
        }
    }

    /// A pass still open when the scan stops, with no end time.
    fn finish(self) -> Option<PassPrediction> {
        match self {
            ScanState::Searching => None,
            ScanState::InPass {
                start,
                peak_elevation_deg,
                peak_time,
            } => Some(PassPrediction {
                start,
                peak_elevation_deg,
                peak_time,
                end: None,
            }),
        }
    }
}

/// Find the first pass at or after `reference` whose elevation reaches
/// `min_elevation_deg`, scanning minute by minute for 24 hours. The pass
/// must also drop back below the threshold within that horizon.
pub fn next_pass(
    propagator: &Propagator,
    observer: &ObserverLocation,
    min_elevation_deg: f64,
    reference: DateTime<Utc>,
) -> Result<Option<PassPrediction>, PredictError> {
    validate_threshold(min_elevation_deg)?;

    if reference
        .checked_add_signed(SCAN_STEP * SEARCH_HORIZON_MINUTES as i32)
        .is_none()
    {
        return Err(PredictError::InvalidParameters(format!(
            "search from {} runs past the representable time range",
            reference
        )));
    }

    let mut state = ScanState::Searching;
    for minute in 0..SEARCH_HORIZON_MINUTES {
        let at = reference + SCAN_STEP * minute as i32;
        let elevation = elevation_at(propagator, observer, at)?;
        if let Some(pass) = state.advance(at, elevation, min_elevation_deg) {
            return Ok(Some(pass));
        }
    }

    // A pass still running at the horizon has no observed end, so it does
    // not count as found.
    log::debug!(
        "no complete pass of {} above {} deg within {} minutes of {} ({:?})",
        propagator.elements().norad_id,
        min_elevation_deg,
        SEARCH_HORIZON_MINUTES,
        reference,
        state
    );
    Ok(None)
}

/// Find all passes for a satellite within a time range
pub fn predict_passes(
    propagator: &Propagator,
    observer: &ObserverLocation,
    min_elevation_deg: f64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<PassPrediction>, PredictError> {
    validate_threshold(min_elevation_deg)?;
    if end < start {
        return Err(PredictError::InvalidParameters(format!(
            "end {} precedes start {}",
            end, start
        )));
    }

    let mut passes = Vec::new();
    let mut state = ScanState::Searching;
    let mut cursor = start;

    while cursor <= end {
        let elevation = elevation_at(propagator, observer, cursor)?;
        if let Some(pass) = state.advance(cursor, elevation, min_elevation_deg) {
            passes.push(pass);
        }
        match cursor.checked_add_signed(SCAN_STEP) {
            Some(next) => cursor = next,
            None => break,
        }
    }

    // Handle pass in progress at end of window
    passes.extend(state.finish());

    Ok(passes)
}

fn elevation_at(
    propagator: &Propagator,
    observer: &ObserverLocation,
    at: DateTime<Utc>,
) -> Result<f64, PredictError> {
    let position = propagator.position_at(at)?;
    Ok(elevation_deg(observer, &position))
}

fn validate_threshold(min_elevation_deg: f64) -> Result<(), PredictError> {
    if min_elevation_deg.is_finite() {
        Ok(())
    } else {
        Err(PredictError::InvalidParameters(format!(
            "minimum elevation must be finite, got {}",
            min_elevation_deg
        )))
    }
}
