mod cache;
mod label;
mod tracker;
mod types;

pub use cache::PositionCache;
pub use label::next_pass_label;
pub use tracker::Tracker;
pub use types::{TrackedSatellite, TrackingSettings, TrackingSnapshot, TrackingStatus};
