//! Core directory functionality
//!
//! This module contains the data model and the pure logic behind the map and
//! list screens. It provides:
//!
//! - [`campground`]: Entry data structures and load-time record validation
//! - [`dataset`]: The bundled dataset and its process-wide accessor
//! - [`filter`]: Hookup/search/bookmark filtering
//! - [`ids`]: Stable entry IDs used for bookmarks and marker keys
//! - [`geo`]: Coordinates, regions and bounding boxes
//! - [`error`]: Error types and user-facing alerts

pub mod campground;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod geo;
pub mod ids;

#[cfg(test)]
pub mod test_helpers;
