//! Satellite position, ground-track and pass queries over a TLE catalog.

pub mod config;
pub mod predict;
pub mod propagate;
pub mod tle;
pub mod tracker;
pub mod web;
