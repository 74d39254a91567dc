use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::propagate::error::PropagationError;
use crate::propagate::frames::eci_to_geodetic;
use crate::propagate::kepler::{minutes_since_epoch, SecularElements};
use crate::propagate::types::{GeodeticPosition, StateVector};
use crate::tle::TleElements;

/// Which orbit model produces state vectors. Everything downstream of the
/// propagator only sees `StateVector`s and does not care.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PropagationModel {
    /// Two-body Kepler with J2 secular drift
    #[default]
    SimplifiedJ2,
    /// NORAD SGP4/SDP4 via the `sgp4` crate
    FullSgp4,
}

enum Backend {
    SimplifiedJ2(SecularElements),
    FullSgp4(Box<sgp4::Constants>),
}

/// An element set bound to a propagation model.
pub struct Propagator {
    elements: TleElements,
    backend: Backend,
}

impl Propagator {
    pub fn new(elements: &TleElements, model: PropagationModel) -> Result<Self, PropagationError> {
        let backend = match model {
            PropagationModel::SimplifiedJ2 => {
                Backend::SimplifiedJ2(SecularElements::from_tle(elements))
            }
            PropagationModel::FullSgp4 => {
                let sgp4_elements = sgp4::Elements::from_tle(
                    elements.name.clone(),
                    elements.line1.as_bytes(),
                    elements.line2.as_bytes(),
                )
                .map_err(|e| PropagationError::InvalidElements(e.to_string()))?;
                let constants = sgp4::Constants::from_elements(&sgp4_elements)
                    .map_err(|e| PropagationError::InvalidElements(e.to_string()))?;
                Backend::FullSgp4(Box::new(constants))
            }
        };

        Ok(Self {
            elements: elements.clone(),
            backend,
        })
    }

    /// Simplified J2 propagator; construction cannot fail.
    pub fn simplified(elements: &TleElements) -> Self {
        Self {
            elements: elements.clone(),
            backend: Backend::SimplifiedJ2(SecularElements::from_tle(elements)),
        }
    }

    pub fn model(&self) -> PropagationModel {
        match self.backend {
            Backend::SimplifiedJ2(_) => PropagationModel::SimplifiedJ2,
            Backend::FullSgp4(_) => PropagationModel::FullSgp4,
        }
    }

    pub fn elements(&self) -> &TleElements {
        &self.elements
    }

    pub fn state_at(&self, at: DateTime<Utc>) -> Result<StateVector, PropagationError> {
        let minutes = minutes_since_epoch(&self.elements, at);
        match &self.backend {
            Backend::SimplifiedJ2(secular) => secular.state_at(minutes),
            Backend::FullSgp4(constants) => {
                let prediction = constants.propagate(sgp4::MinutesSinceEpoch(minutes))?;
                let state = StateVector {
                    position_km: prediction.position,
                    velocity_km_s: prediction.velocity,
                };
                if !state.is_finite() {
                    return Err(PropagationError::InvalidState(format!(
                        "SGP4 returned a non-finite state {} minutes from epoch",
                        minutes
                    )));
                }
                Ok(state)
            }
        }
    }

    /// Propagate and convert to the geodetic sub-satellite point.
    pub fn position_at(&self, at: DateTime<Utc>) -> Result<GeodeticPosition, PropagationError> {
        let state = self.state_at(at)?;
        eci_to_geodetic(&state, at)
    }
}
