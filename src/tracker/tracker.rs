use chrono::{DateTime, Utc};

use super::cache::PositionCache;
use super::label::{next_pass_label, PASSING_LABEL};
use super::types::{TrackedSatellite, TrackingSettings, TrackingSnapshot, TrackingStatus};
use crate::predict::{ground_track, is_over_location, next_pass, ObserverLocation};
use crate::propagate::Propagator;
use crate::tle::{Catalog, CatalogEntry};

const HORIZON_MINUTES: i64 = 60;

/// Builds display snapshots for an observer. The only state kept between
/// calls is the last-position cache; the caller decides when to poll.
pub struct Tracker {
    observer_name: Option<String>,
    observer: ObserverLocation,
    settings: TrackingSettings,
    cache: PositionCache,
}

impl Tracker {
    pub fn new(observer: ObserverLocation, settings: TrackingSettings) -> Self {
        Self {
            observer_name: None,
            observer,
            settings,
            cache: PositionCache::new(settings.cache_resolution),
        }
    }

    /// Label the observer in snapshots, e.g. a ground station name.
    pub fn with_observer_name(mut self, name: Option<String>) -> Self {
        self.observer_name = name;
        self
    }

    /// Drop cached positions, e.g. after the catalog was reloaded.
    pub fn reset(&mut self) {
        self.cache.clear();
    }

    pub fn snapshot(&mut self, catalog: &Catalog, now: DateTime<Utc>) -> TrackingSnapshot {
        let satellites = catalog.entries().map(|entry| self.track(entry, now)).collect();
        TrackingSnapshot {
            timestamp: now,
            observer_name: self.observer_name.clone(),
            observer: self.observer,
            satellites,
        }
    }

    pub fn track(&mut self, entry: &CatalogEntry, now: DateTime<Utc>) -> TrackedSatellite {
        let elements = &entry.elements;
        let mut tracked = TrackedSatellite {
            norad_id: elements.norad_id.clone(),
            name: elements.display_name(),
            provider: entry.provider.clone(),
            position: None,
            ground_track: Vec::new(),
            status: TrackingStatus::Active,
            next_pass: None,
            next_pass_label: next_pass_label(None, now),
        };

        let propagator = match Propagator::new(elements, self.settings.model) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Cannot build propagator for {}: {}", tracked.name, e);
                return tracked;
            }
        };

        tracked.position = match self.cache.position_at(&propagator, now) {
            Ok(position) => Some(position),
            Err(e) => {
                log::warn!("No position for {} at {}: {}", tracked.name, now, e);
                None
            }
        };

        tracked.ground_track = ground_track(
            &propagator,
            now,
            self.settings.ground_track_window,
            self.settings.ground_track_step,
        )
        .unwrap_or_else(|e| {
            log::warn!("No ground track for {}: {}", tracked.name, e);
            Vec::new()
        });

        let Some(position) = tracked.position else {
            return tracked;
        };

        if is_over_location(&position, &self.observer, self.settings.overhead_swath_km) {
            tracked.status = TrackingStatus::Passing;
            tracked.next_pass_label = PASSING_LABEL.to_string();
            return tracked;
        }

        match next_pass(&propagator, &self.observer, self.settings.min_elevation_deg, now) {
            Ok(pass) => {
                tracked.next_pass = pass;
                tracked.next_pass_label = next_pass_label(pass.map(|p| p.start), now);
                if let Some(pass) = pass {
                    if (pass.start - now).num_minutes() < HORIZON_MINUTES {
                        tracked.status = TrackingStatus::Horizon;
                    }
                }
            }
            Err(e) => log::warn!("Pass prediction failed for {}: {}", tracked.name, e),
        }

        tracked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn catalog() -> Catalog {
        Catalog::builtin().unwrap()
    }

    #[test]
    fn observer_under_satellite_is_passing() {
        let catalog = catalog();
        let entry = catalog.get("37387").unwrap();
        let now = entry.elements.epoch + Duration::minutes(45);
        let position = Propagator::simplified(&entry.elements)
            .position_at(now)
            .unwrap();

        let observer = ObserverLocation::new(position.latitude_deg, position.longitude_deg);
        let mut tracker = Tracker::new(observer, TrackingSettings::default());
        let tracked = tracker.track(entry, now);

        assert_eq!(tracked.status, TrackingStatus::Passing);
        assert_eq!(tracked.next_pass_label, "NOW");
        assert_eq!(tracked.ground_track.len(), 61);
        assert_eq!(tracked.provider.as_deref(), Some("ISRO"));
    }

    #[test]
    fn upcoming_pass_is_on_horizon() {
        let catalog = catalog();
        let entry = catalog.get("37387").unwrap();
        let overhead_at = entry.elements.epoch + Duration::minutes(45);
        let position = Propagator::simplified(&entry.elements)
            .position_at(overhead_at)
            .unwrap();
        let observer = ObserverLocation::new(position.latitude_deg, position.longitude_deg);

        let now = overhead_at - Duration::minutes(25);
        let mut tracker = Tracker::new(observer, TrackingSettings::default());
        let tracked = tracker.track(entry, now);

        assert_eq!(tracked.status, TrackingStatus::Horizon);
        let pass = tracked.next_pass.unwrap();
        assert!(pass.start > now && pass.start < overhead_at);
        assert!(tracked.next_pass_label.ends_with('m'));
        assert!(!tracked.next_pass_label.contains('h'));
    }

    #[test]
    fn snapshot_carries_observer_name() {
        let catalog = catalog();
        let now = catalog.get("37387").unwrap().elements.epoch;
        let mut tracker = Tracker::new(
            ObserverLocation::new(12.9716, 77.5946),
            TrackingSettings::default(),
        )
        .with_observer_name(Some("Bengaluru".to_string()));

        let snapshot = tracker.snapshot(&catalog, now);
        assert_eq!(snapshot.observer_name.as_deref(), Some("Bengaluru"));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["observer_name"], "Bengaluru");
    }

    #[test]
    fn snapshot_covers_catalog() {
        let catalog = catalog();
        let now = catalog.get("37387").unwrap().elements.epoch;
        let mut tracker = Tracker::new(
            ObserverLocation::new(28.6139, 77.209),
            TrackingSettings::default(),
        );
        let snapshot = tracker.snapshot(&catalog, now);

        assert_eq!(snapshot.satellites.len(), catalog.len());
        assert_eq!(snapshot.timestamp, now);
        assert_eq!(snapshot.observer_name, None);
        for sat in &snapshot.satellites {
            assert!(sat.position.is_some(), "{} has no position", sat.name);
            assert_eq!(sat.ground_track.len(), 61);
            match sat.status {
                TrackingStatus::Passing => assert_eq!(sat.next_pass_label, "NOW"),
                TrackingStatus::Horizon => assert!(sat.next_pass.is_some()),
                TrackingStatus::Active => {}
            }
        }
    }
}
