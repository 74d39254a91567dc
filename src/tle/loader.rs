use std::fs;
use std::path::{Path, PathBuf};

use crate::tle::catalog::{Catalog, CatalogEntry};
use crate::tle::error::TleError;
use crate::tle::parser::read_records;

pub struct TleLoader {
    tle_dir: PathBuf,
    catalog: Catalog,
}

impl TleLoader {
    pub fn new(tle_dir: PathBuf) -> Self {
        Self {
            tle_dir,
            catalog: Catalog::default(),
        }
    }

    /// Load all TLE files from the directory, replacing the previous catalog.
    pub fn load_all(&mut self) -> Result<(), TleError> {
        if !self.tle_dir.exists() {
            return Err(TleError::DirectoryNotFound(
                self.tle_dir.display().to_string(),
            ));
        }

        let mut catalog = Catalog::default();

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.tle_dir)? {
            let path = entry?.path();
            if path.is_file() && has_tle_extension(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            match parse_tle_file(&path) {
                Ok(entries) => {
                    for entry in entries {
                        catalog.insert(entry);
                    }
                }
                Err(e) => {
                    log::warn!("Failed to parse TLE file {}: {}", path.display(), e);
                    // Continue with other files
                }
            }
        }

        if catalog.is_empty() {
            return Err(TleError::NoSatellites);
        }

        log::info!(
            "Loaded {} satellites from {}",
            catalog.len(),
            self.tle_dir.display()
        );
        self.catalog = catalog;
        Ok(())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }
}

fn has_tle_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "tle" || ext == "txt")
        .unwrap_or(false)
}

/// Parse a single TLE file (may contain multiple satellites)
pub(crate) fn parse_tle_file(path: &Path) -> Result<Vec<CatalogEntry>, TleError> {
    let content = fs::read_to_string(path)?;
    let filename = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    read_records(&content)
        .iter()
        .map(|record| {
            record
                .parse()
                .map(|elements| CatalogEntry::new(elements, None, &filename))
                .map_err(|e| TleError::InvalidFile {
                    file: filename.clone(),
                    message: format!("line {}: {}", record.line_number, e),
                })
        })
        .collect()
}
