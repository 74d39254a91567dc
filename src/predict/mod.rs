mod error;
mod ground_track;
mod observer;
mod pass_finder;
mod types;
mod visibility;

pub use error::PredictError;
pub use ground_track::ground_track;
pub use observer::ObserverLocation;
pub use pass_finder::{next_pass, predict_passes, SEARCH_HORIZON_MINUTES};
pub use types::{GroundTrack, GroundTrackPoint, PassPrediction};
pub use visibility::{
    elevation_deg, is_over_location, surface_distance_km, SurfacePoint, MEAN_EARTH_RADIUS_KM,
};
