//! Shared test utilities for core module tests
//!
//! Provides common entry builders to avoid duplication across test suites.
//! This module is only compiled in test mode.

use crate::core::campground::{Campground, CampgroundEntry, HookupType};
use std::collections::HashSet;

/// Creates a test entry with an optional campground name and no coordinate.
///
/// `name = None` yields an entry without a campground payload, which is kept
/// in datasets but never displayed.
pub fn create_test_entry(
    city: &str,
    state: &str,
    hookup_type: HookupType,
    name: Option<&str>,
) -> CampgroundEntry {
    CampgroundEntry::new(city, state, hookup_type, name.map(Campground::named))
}

/// The three-entry Tucson/Phoenix/Denver fixture, each with a coordinate.
///
/// This is the canonical helper for filter scenarios.
pub fn create_scenario_entries() -> Vec<CampgroundEntry> {
    vec![
        create_test_entry("Tucson", "AZ", HookupType::Full, Some("Test Campground 1"))
            .with_coordinate(32.2226, -110.9747),
        create_test_entry("Phoenix", "AZ", HookupType::Partial, Some("Test Campground 2"))
            .with_coordinate(33.4484, -112.0740),
        create_test_entry("Denver", "CO", HookupType::Full, Some("Test Campground 3"))
            .with_coordinate(39.7392, -104.9903),
    ]
}

/// Collects the stable IDs of `entries` into a bookmark set.
pub fn bookmark_set<'a>(entries: impl IntoIterator<Item = &'a CampgroundEntry>) -> HashSet<String> {
    entries.into_iter().map(|e| e.id().to_string()).collect()
}
