mod error;
mod frames;
mod kepler;
mod model;
mod types;

pub use error::PropagationError;
pub use frames::{eci_to_ecef, eci_to_geodetic, ecef_to_geodetic, gmst, julian_date};
pub use kepler::{minutes_since_epoch, propagate, solve_kepler, SecularElements};
pub use model::{PropagationModel, Propagator};
pub use types::{GeodeticPosition, StateVector};
