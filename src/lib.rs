//! rvtrails - RV campgrounds with bicycle-trail access
//!
//! Core logic behind a map-based campground directory: a bundled dataset,
//! filtering and search, stable IDs for bookmarks, and a debounced map
//! camera that keeps the current results in view.
//!
//! # Architecture
//!
//! - [`core`] - Data model, dataset loading, filtering, stable IDs, geometry
//! - [`viewport`] - Fit planning, debounced fitter, camera lock, async session
//! - [`store`] - Local key-value persistence
//! - [`prefs`] - Map-app and theme preferences, first-launch flag
//! - [`bookmarks`] - Persisted bookmark set
//! - [`throttle`] - Free-tier view counting mirrored to billing
//! - [`billing`] - Subscription SDK seam
//! - [`location`] - Locate-me
//! - [`directions`] - External map app links
//! - [`config`] - Configuration persistence
//! - [`utils`] - Utility functions (XDG directories, text display)
//!
//! # Failure policy
//!
//! - Malformed dataset records are dropped at load time and logged
//! - Storage and SDK failures degrade to defaults
//! - Only user-initiated actions (locate-me, purchase, restore) surface an
//!   [`Alert`](crate::core::error::Alert)

// Allow pedantic clippy warnings that are not worth fixing for this codebase
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::needless_lifetimes)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]

pub mod billing;
pub mod bookmarks;
pub mod config;
pub mod core;
pub mod directions;
pub mod location;
pub mod prefs;
pub mod store;
pub mod throttle;
pub mod utils;
pub mod viewport;

// Re-export commonly used types
pub use crate::core::campground::{CampgroundEntry, HookupType};
pub use crate::core::error::{Error, Result};
pub use crate::core::filter::{FilterCriteria, HookupFilter, filter_campgrounds};
