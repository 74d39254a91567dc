use thiserror::Error;

use crate::propagate::PropagationError;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("propagation error: {0}")]
    Propagation(#[from] PropagationError),
}
