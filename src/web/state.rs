use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};

use crate::config::Config;
use crate::predict::ObserverLocation;
use crate::tle::Catalog;
use crate::tracker::{Tracker, TrackingSettings};
use crate::web::api::error::{ApiError, ApiResult};

/// Upper bound for one engine query; pass searches scan up to a day of
/// samples and are abandoned past this point.
const QUERY_DEADLINE: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub observer: ObserverLocation,
    pub settings: TrackingSettings,
    pub catalog: Arc<RwLock<Catalog>>,
    /// Only the snapshot endpoint needs this; it owns the position cache.
    pub tracker: Arc<Mutex<Tracker>>,
}

/// Run a CPU-bound engine call off the async workers, with a deadline.
pub async fn run_bounded<T, F>(f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    match tokio::time::timeout(QUERY_DEADLINE, tokio::task::spawn_blocking(f)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ApiError::Internal(e.to_string())),
        Err(_) => {
            log::warn!("Query abandoned after {:?}", QUERY_DEADLINE);
            Err(ApiError::Timeout)
        }
    }
}
