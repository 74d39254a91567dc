pub mod error;
pub mod satellites;
pub mod tracking;
