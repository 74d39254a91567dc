use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::propagate::{GeodeticPosition, PropagationError, Propagator};

/// Remembers the last computed position per satellite, keyed by the query
/// instant rounded down to `resolution`. Values are computed at the rounded
/// instant so a hit returns exactly what a miss would have.
#[derive(Debug)]
pub struct PositionCache {
    resolution_ms: i64,
    last: HashMap<String, (i64, GeodeticPosition)>,
}

impl PositionCache {
    pub fn new(resolution: Duration) -> Self {
        Self {
            resolution_ms: resolution.num_milliseconds().max(1),
            last: HashMap::new(),
        }
    }

    pub fn position_at(
        &mut self,
        propagator: &Propagator,
        at: DateTime<Utc>,
    ) -> Result<GeodeticPosition, PropagationError> {
        let bucket = at.timestamp_millis().div_euclid(self.resolution_ms);
        let norad_id = &propagator.elements().norad_id;

        if let Some((cached_bucket, position)) = self.last.get(norad_id) {
            if *cached_bucket == bucket {
                return Ok(*position);
            }
        }

        let rounded = self.bucket_instant(bucket).unwrap_or(at);
        match propagator.position_at(rounded) {
            Ok(position) => {
                self.last.insert(norad_id.clone(), (bucket, position));
                Ok(position)
            }
            Err(e) => {
                // A failure must not leave an older position behind.
                self.last.remove(norad_id);
                Err(e)
            }
        }
    }

    pub fn clear(&mut self) {
        self.last.clear();
    }

    pub fn len(&self) -> usize {
        self.last.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }

    fn bucket_instant(&self, bucket: i64) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(bucket.checked_mul(self.resolution_ms)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tle::Catalog;

    fn propagator() -> Propagator {
        let catalog = Catalog::builtin().unwrap();
        Propagator::simplified(&catalog.get("40697").unwrap().elements)
    }

    #[test]
    fn same_bucket_hits() {
        let propagator = propagator();
        let mut cache = PositionCache::new(Duration::seconds(5));
        let t0 = propagator.elements().epoch;

        let first = cache.position_at(&propagator, t0).unwrap();
        let second = cache
            .position_at(&propagator, t0 + Duration::milliseconds(1500))
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn value_is_computed_at_rounded_instant() {
        let propagator = propagator();
        let mut cache = PositionCache::new(Duration::seconds(10));
        let t0 = propagator.elements().epoch;
        let bucket_start =
            DateTime::<Utc>::from_timestamp_millis(t0.timestamp_millis().div_euclid(10_000) * 10_000)
                .unwrap();

        let cached = cache
            .position_at(&propagator, bucket_start + Duration::seconds(7))
            .unwrap();
        assert_eq!(cached, propagator.position_at(bucket_start).unwrap());
    }

    #[test]
    fn new_bucket_recomputes() {
        let propagator = propagator();
        let mut cache = PositionCache::new(Duration::seconds(1));
        let t0 = propagator.elements().epoch;

        let first = cache.position_at(&propagator, t0).unwrap();
        let later = cache
            .position_at(&propagator, t0 + Duration::minutes(5))
            .unwrap();
        assert_ne!(first, later);

        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
