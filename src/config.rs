use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration as StdDuration;
use thiserror::Error;

use crate::predict::ObserverLocation;
use crate::propagate::PropagationModel;
use crate::tle::{Catalog, TleError, TleLoader};
use crate::tracker::{Tracker, TrackingSettings};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid observer coordinates: {0}")]
    InvalidObserver(String),
    #[error("invalid tracking setting: {0}")]
    InvalidTracking(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub observer: ObserverConfig,
    pub tle_folder: Option<PathBuf>,
    pub propagation: PropagationConfig,
    pub tracking: TrackingConfig,
    pub web: WebConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObserverConfig {
    pub name: Option<String>,
    #[serde(default = "default_coordinates")]
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            name: None,
            coordinates: default_coordinates(),
            altitude_m: 0.0,
        }
    }
}

fn default_coordinates() -> String {
    "28.6139,77.209".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropagationConfig {
    #[serde(default)]
    pub model: PropagationModel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_window", deserialize_with = "deserialize_duration")]
    pub ground_track_window: StdDuration,
    #[serde(default = "default_step", deserialize_with = "deserialize_duration")]
    pub ground_track_step: StdDuration,
    #[serde(default = "default_swath")]
    pub overhead_swath_km: f64,
    #[serde(default = "default_min_elevation")]
    pub min_elevation_deg: f64,
    #[serde(default = "default_refresh", deserialize_with = "deserialize_duration")]
    pub refresh_interval: StdDuration,
    #[serde(default = "default_cache_resolution", deserialize_with = "deserialize_duration")]
    pub cache_resolution: StdDuration,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            ground_track_window: default_window(),
            ground_track_step: default_step(),
            overhead_swath_km: default_swath(),
            min_elevation_deg: default_min_elevation(),
            refresh_interval: default_refresh(),
            cache_resolution: default_cache_resolution(),
        }
    }
}

fn default_window() -> StdDuration {
    StdDuration::from_secs(120 * 60)
}

fn default_step() -> StdDuration {
    StdDuration::from_secs(2 * 60)
}

fn default_swath() -> f64 {
    500.0
}

fn default_min_elevation() -> f64 {
    10.0
}

fn default_refresh() -> StdDuration {
    StdDuration::from_secs(5)
}

fn default_cache_resolution() -> StdDuration {
    StdDuration::from_secs(1)
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<StdDuration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    pub fn observer(&self) -> Result<ObserverLocation, ConfigError> {
        ObserverLocation::from_coordinates(
            &self.observer.coordinates,
            Some(self.observer.altitude_m),
        )
        .ok_or_else(|| ConfigError::InvalidObserver(self.observer.coordinates.clone()))
    }

    pub fn tracking_settings(&self) -> Result<TrackingSettings, ConfigError> {
        let tracking = &self.tracking;
        let to_chrono = |name: &str, d: StdDuration| {
            chrono::Duration::from_std(d)
                .map_err(|e| ConfigError::InvalidTracking(format!("{}: {}", name, e)))
        };

        if tracking.ground_track_step.is_zero() {
            return Err(ConfigError::InvalidTracking(
                "ground_track_step must be positive".into(),
            ));
        }
        if !(tracking.overhead_swath_km > 0.0 && tracking.overhead_swath_km.is_finite()) {
            return Err(ConfigError::InvalidTracking(format!(
                "overhead_swath_km must be positive, got {}",
                tracking.overhead_swath_km
            )));
        }

        Ok(TrackingSettings {
            model: self.propagation.model,
            ground_track_window: to_chrono("ground_track_window", tracking.ground_track_window)?,
            ground_track_step: to_chrono("ground_track_step", tracking.ground_track_step)?,
            overhead_swath_km: tracking.overhead_swath_km,
            min_elevation_deg: tracking.min_elevation_deg,
            cache_resolution: to_chrono("cache_resolution", tracking.cache_resolution)?,
        })
    }

    /// Catalog from `tle_folder` when configured, otherwise the bundled
    /// sample set.
    pub fn tracker(&self) -> Result<Tracker, ConfigError> {
        Ok(Tracker::new(self.observer()?, self.tracking_settings()?)
            .with_observer_name(self.observer.name.clone()))
    }

    pub fn load_catalog(&self) -> Result<Catalog, TleError> {
        match &self.tle_folder {
            Some(folder) => {
                let mut loader = TleLoader::new(folder.clone());
                loader.load_all()?;
                Ok(loader.into_catalog())
            }
            None => Catalog::builtin(),
        }
    }
}
