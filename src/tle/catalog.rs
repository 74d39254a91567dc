use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::tle::error::TleError;
use crate::tle::parser::parse_with_name;
use crate::tle::types::TleElements;

/// Sample element sets (name, provider, line 1, line 2) bundled for offline
/// use until a TLE folder is configured.
const BUILTIN_ELEMENTS: [(&str, &str, &str, &str); 6] = [
    (
        "RESOURCESAT-2",
        "ISRO",
        "1 37387U 11015A   24015.50000000  .00000100  00000-0  10000-3 0  9998",
        "2 37387  98.7500  80.0000 0001000  90.0000 270.0000 14.21500000100000",
    ),
    (
        "SENTINEL-2A",
        "ESA",
        "1 40697U 15028A   24015.50000000  .00000050  00000-0  50000-4 0  9993",
        "2 40697  98.5680 100.5000 0001200  85.0000 275.0000 14.30820000100009",
    ),
    (
        "CARTOSAT-3",
        "ISRO",
        "1 44804U 19089A   24015.50000000  .00000150  00000-0  15000-3 0  9999",
        "2 44804  97.5000  60.0000 0001500  95.0000 265.0000 15.19000000100009",
    ),
    (
        "OCEANSAT-3",
        "ISRO",
        "1 54358U 22137A   24015.50000000  .00000080  00000-0  80000-4 0  9997",
        "2 54358  98.3000  90.0000 0001100  88.0000 272.0000 14.25000000100008",
    ),
    (
        "RISAT-2BR1",
        "ISRO",
        "1 44857U 19089F   24015.50000000  .00000200  00000-0  20000-3 0  9999",
        "2 44857  37.0000  45.0000 0010000 100.0000 260.0000 15.08000000100004",
    ),
    (
        "SENTINEL-1A",
        "ESA",
        "1 39634U 14016A   24015.50000000  .00000040  00000-0  40000-4 0  9996",
        "2 39634  98.1820  95.0000 0001300  82.0000 278.0000 14.59200000100002",
    ),
];

#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub elements: TleElements,
    pub provider: Option<String>,
    pub source: String,
}

impl CatalogEntry {
    pub fn new(elements: TleElements, provider: Option<String>, source: &str) -> Self {
        Self {
            elements,
            provider,
            source: source.to_string(),
        }
    }

    pub fn info(&self) -> SatelliteInfo {
        SatelliteInfo {
            name: self.elements.display_name(),
            norad_id: self.elements.norad_id.clone(),
            provider: self.provider.clone(),
            tle_source: self.source.clone(),
            epoch: self.elements.epoch,
            period_minutes: self.elements.period_minutes(),
        }
    }
}

/// Information about a single satellite in the catalog
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SatelliteInfo {
    pub name: String,
    pub norad_id: String,
    pub provider: Option<String>,
    pub tle_source: String,
    pub epoch: chrono::DateTime<chrono::Utc>,
    pub period_minutes: f64,
}

/// Element sets keyed by NORAD catalog number. Entries are replaced
/// wholesale on reload, never patched.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn builtin() -> Result<Self, TleError> {
        let mut catalog = Catalog::default();
        for (name, provider, line1, line2) in BUILTIN_ELEMENTS {
            let elements = parse_with_name(Some(name.to_string()), line1, line2)?;
            catalog.insert(CatalogEntry::new(
                elements,
                Some(provider.to_string()),
                "builtin",
            ));
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, entry: CatalogEntry) {
        self.entries
            .insert(entry.elements.norad_id.clone(), entry);
    }

    pub fn get(&self, norad_id: &str) -> Option<&CatalogEntry> {
        self.entries.get(norad_id)
    }

    /// Look up by catalog number first, then by case-insensitive name.
    pub fn find(&self, query: &str) -> Option<&CatalogEntry> {
        let query = query.trim();
        self.get(query).or_else(|| {
            self.entries.values().find(|entry| {
                entry
                    .elements
                    .name
                    .as_deref()
                    .map(|name| name.eq_ignore_ascii_case(query))
                    .unwrap_or(false)
            })
        })
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_parses() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), BUILTIN_ELEMENTS.len());

        let resourcesat = catalog.get("37387").unwrap();
        assert_eq!(resourcesat.elements.name.as_deref(), Some("RESOURCESAT-2"));
        assert_eq!(resourcesat.provider.as_deref(), Some("ISRO"));
        assert!((resourcesat.elements.inclination_deg - 98.75).abs() < 1e-12);
        assert!((resourcesat.elements.mean_motion - 14.215).abs() < 1e-12);
    }

    #[test]
    fn find_by_id_or_name() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.find("40697").unwrap().elements.norad_id, "40697");
        assert_eq!(
            catalog.find("sentinel-1a").unwrap().elements.norad_id,
            "39634"
        );
        assert!(catalog.find("HUBBLE").is_none());
    }

    #[test]
    fn insert_replaces_existing_entry() {
        let mut catalog = Catalog::builtin().unwrap();
        let mut entry = catalog.get("44804").unwrap().clone();
        entry.source = "refreshed.tle".into();
        catalog.insert(entry);

        assert_eq!(catalog.len(), BUILTIN_ELEMENTS.len());
        assert_eq!(catalog.get("44804").unwrap().source, "refreshed.tle");
    }
}
