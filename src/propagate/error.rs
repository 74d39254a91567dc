use thiserror::Error;

#[derive(Debug, Error)]
pub enum PropagationError {
    #[error(
        "propagation divergence: Kepler solver did not converge (M = {mean_anomaly}, e = {eccentricity}, residual = {residual:e})"
    )]
    Divergence {
        mean_anomaly: f64,
        eccentricity: f64,
        residual: f64,
    },
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("invalid elements: {0}")]
    InvalidElements(String),
    #[error("SGP4 propagation error: {0}")]
    Sgp4(String),
}

impl From<sgp4::Error> for PropagationError {
    fn from(err: sgp4::Error) -> Self {
        PropagationError::Sgp4(err.to_string())
    }
}
