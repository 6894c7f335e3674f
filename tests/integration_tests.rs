//! Integration tests for rvtrails
//!
//! These tests run the public API end to end: the bundled dataset, filtering
//! with bookmarks persisted in a temporary store directory, and the viewport
//! session framing filter results on a recording camera.
//!
//! ```bash
//! cargo test --test integration_tests
//! ```

#![allow(clippy::uninlined_format_args)]

use rvtrails::bookmarks::{BookmarkState, BookmarkStore};
use rvtrails::core::dataset::Dataset;
use rvtrails::core::error::Result;
use rvtrails::core::geo::{Coordinate, EdgePadding, Region};
use rvtrails::core::ids::generate_id;
use rvtrails::directions::{DirectionsAction, DirectionsTarget, Platform, build_urls};
use rvtrails::prefs::{self, MapApp};
use rvtrails::store::FileStore;
use rvtrails::viewport::{FitKind, FitRequest, FitterConfig, FitterEvent, MapCamera, spawn_session};
use rvtrails::{CampgroundEntry, FilterCriteria, HookupFilter, filter_campgrounds};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Camera that records the number of points each move framed
#[derive(Clone, Default)]
struct CountingCamera {
    moves: Arc<Mutex<Vec<usize>>>,
}

impl MapCamera for CountingCamera {
    fn animate_to_region(&mut self, _region: Region, _duration: Duration) -> Result<()> {
        self.moves.lock().unwrap().push(1);
        Ok(())
    }

    fn fit_to_coordinates(
        &mut self,
        coordinates: &[Coordinate],
        _padding: EdgePadding,
        _animated: bool,
    ) -> Result<()> {
        self.moves.lock().unwrap().push(coordinates.len());
        Ok(())
    }
}

fn bundled() -> Dataset {
    Dataset::bundled().expect("bundled dataset must parse")
}

fn bookmark_set<'a>(entries: impl IntoIterator<Item = &'a CampgroundEntry>) -> HashSet<String> {
    entries.into_iter().map(|e| e.id().to_string()).collect()
}

#[test]
fn test_bundled_ids_match_generator() {
    let dataset = bundled();
    for entry in dataset.entries() {
        assert_eq!(entry.id(), generate_id(&entry.city, &entry.state, entry.name()));
    }
    assert!(dataset.find("tucson-az-catalina-state-park").is_some());
}

#[test]
fn test_bundled_filter_scenarios() {
    let dataset = bundled();
    let entries = dataset.entries();

    let az_full = FilterCriteria::new()
        .with_hookup(HookupFilter::Full)
        .with_search("AZ");
    let cities: Vec<&str> = filter_campgrounds(entries, &az_full)
        .iter()
        .map(|e| e.city.as_str())
        .collect();
    assert_eq!(cities, vec!["Tucson", "Yuma"]);

    let moab = filter_campgrounds(entries, &FilterCriteria::new().with_search("  Moab "));
    assert_eq!(moab.len(), 1);
    assert_eq!(moab[0].name(), Some("Dead Horse Point State Park"));

    // One character is not a search yet
    let everything = filter_campgrounds(entries, &FilterCriteria::new().with_search("m"));
    assert_eq!(everything.len(), entries.len());
}

#[tokio::test]
async fn test_bookmarks_round_trip_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let dataset = bundled();
    let entries = dataset.entries();

    let mut bookmarks = BookmarkStore::new(FileStore::new(&path));
    assert_eq!(bookmarks.state(), &BookmarkState::Loading);
    bookmarks.load().await;
    bookmarks.toggle(entries[0].id()).await.unwrap();
    bookmarks.toggle(entries[4].id()).await.unwrap();

    // New process, same file
    let mut reopened = BookmarkStore::new(FileStore::new(&path));
    let state = reopened.load().await.clone();
    assert_eq!(state.ids(), Some(&bookmark_set([&entries[0], &entries[4]])));

    let criteria = FilterCriteria::new().with_bookmarks(true, state.ids());
    let results = filter_campgrounds(entries, &criteria);
    assert_eq!(results.len(), 2);

    // Still loading: the bookmark filter does not apply yet
    let still_loading = BookmarkState::Loading;
    let loading = FilterCriteria::new().with_bookmarks(true, still_loading.ids());
    assert_eq!(filter_campgrounds(entries, &loading).len(), entries.len());
}

#[tokio::test]
async fn test_preferences_share_store_file_with_bookmarks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let store = FileStore::new(&path);
    prefs::set_map_app(&store, MapApp::Waze).await.unwrap();
    let mut bookmarks = BookmarkStore::new(store);
    bookmarks.toggle("tucson-az-catalina-state-park").await.unwrap();

    let reopened = FileStore::new(&path);
    assert_eq!(prefs::map_app(&reopened).await, Some(MapApp::Waze));
    assert!(prefs::is_first_launch(&reopened).await);
}

#[test]
fn test_directions_for_bundled_entry() {
    let dataset = bundled();
    let entry = dataset.find("moab-ut-dead-horse-point-state-park").unwrap();
    let links = build_urls(
        &DirectionsTarget::from_entry(entry),
        MapApp::Apple,
        Platform::Ios,
        DirectionsAction::Search,
    );
    assert_eq!(
        links.web,
        "https://maps.apple.com/?q=Dead%20Horse%20Point%20State%20Park%2C%20Moab%2C%20UT"
    );
}

#[tokio::test(start_paused = true)]
async fn test_typing_a_search_frames_results_once() {
    let dataset = bundled();
    let entries = dataset.entries();
    let camera = CountingCamera::default();
    let config = FitterConfig::default();
    let (handle, mut events, task) = spawn_session(config.clone(), camera.clone());

    // Keystrokes 100 ms apart: "o", "or", "ore", "oreg" ...
    let typed = ["o", "or", "ore", "oreg"];
    for (i, query) in typed.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        let criteria = FilterCriteria::new().with_search(query);
        let filtered = filter_campgrounds(entries, &criteria);
        handle
            .fit(FitRequest::from_results(
                &criteria,
                &filtered,
                entries,
                config.single_result_delta,
            ))
            .await
            .unwrap();
    }

    // "oreg" matches nothing by name or state code, so the pending fit is cancelled
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(camera.moves.lock().unwrap().is_empty());

    let criteria = FilterCriteria::new().with_search("or");
    let filtered = filter_campgrounds(entries, &criteria);
    handle
        .fit(FitRequest::from_results(&criteria, &filtered, entries, config.single_result_delta))
        .await
        .unwrap();
    assert_eq!(events.recv().await, Some(FitterEvent::Fitted(FitKind::Bounds)));
    assert_eq!(camera.moves.lock().unwrap().as_slice(), &[filtered.len()]);

    handle.teardown().await.unwrap();
    task.await.unwrap();
}

/// Runs the CLI against a fresh data directory, so every run is a first launch.
fn run_cli(home: &std::path::Path, args: &[&str]) -> std::process::Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_rvtrails"))
        .args(args)
        .env("HOME", home)
        .env("XDG_DATA_HOME", home.join("data"))
        .env("XDG_STATE_HOME", home.join("state"))
        .env("XDG_CONFIG_HOME", home.join("config"))
        .output()
        .expect("failed to run rvtrails")
}

#[test]
fn test_cli_json_output_is_clean_on_first_launch() {
    let home = tempfile::tempdir().unwrap();
    let output = run_cli(home.path(), &["stats", "--json"]);
    assert!(output.status.success());

    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["total"], bundled().entries().len());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Welcome to rvtrails"));
}

#[test]
fn test_cli_list_prints_ids_that_can_be_passed_back() {
    let home = tempfile::tempdir().unwrap();
    let long_id = "hilton-head-island-sc-hilton-head-harbor-rv-resort";
    assert!(bundled().find(long_id).is_some());

    let listing = run_cli(home.path(), &["list", "--search", "hilton"]);
    assert!(listing.status.success());
    assert!(String::from_utf8_lossy(&listing.stdout).contains(long_id));

    let bookmark = run_cli(home.path(), &["bookmark", long_id]);
    assert!(bookmark.status.success());
    assert!(String::from_utf8_lossy(&bookmark.stdout).contains("Bookmarked Hilton Head Harbor RV Resort"));
}
