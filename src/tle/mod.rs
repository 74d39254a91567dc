mod catalog;
mod error;
mod loader;
mod parser;
mod types;

pub use catalog::{Catalog, CatalogEntry, SatelliteInfo};
pub use error::TleError;
pub use loader::TleLoader;
pub use parser::{checksum, parse, parse_with_name, read_records, TleRecord};
pub use types::TleElements;
