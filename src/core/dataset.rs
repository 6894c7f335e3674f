//! The campground dataset
//!
//! The directory ships as a bundled JSON asset that is loaded once and never
//! mutated afterwards. [`global`] exposes it as a process-wide read-only
//! singleton; [`init_global`] lets the CLI substitute a different file before
//! first use.
//!
//! Both on-disk shapes are accepted: a bare array of records, or an object
//! `{ "entries": [...], "metadata": {...} }` as written by the extraction
//! tooling. Records that fail validation are logged and skipped.

use crate::core::campground::{CampgroundEntry, HookupType};
use crate::core::error::{DatasetError, Result};
use crate::core::geo::Coordinate;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

/// Dataset compiled into the binary
pub const BUNDLED_DATASET: &str = include_str!("../../assets/campgrounds.json");

static GLOBAL: OnceLock<Dataset> = OnceLock::new();

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    entries: Vec<CampgroundEntry>,
    rejected: usize,
}

/// Result of [`Dataset::upsert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DatasetStats {
    pub total: usize,
    pub displayable: usize,
    pub mappable: usize,
    pub full_hookups: usize,
    pub partial_hookups: usize,
    pub states: usize,
    /// Source records dropped during validation
    pub rejected: usize,
}

impl Dataset {
    pub fn from_entries(entries: Vec<CampgroundEntry>) -> Self {
        Self {
            entries,
            rejected: 0,
        }
    }

    /// Parses and validates a dataset document.
    ///
    /// Only a document that is not JSON, or has neither accepted shape, is an
    /// error. Individual bad records are skipped.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(json)?;
        let records = match &document {
            Value::Array(records) => records,
            Value::Object(obj) => match obj.get("entries") {
                Some(Value::Array(records)) => records,
                _ => return Err(DatasetError::UnexpectedShape("an object without entries").into()),
            },
            Value::Null => return Err(DatasetError::UnexpectedShape("null").into()),
            Value::Bool(_) => return Err(DatasetError::UnexpectedShape("a boolean").into()),
            Value::Number(_) => return Err(DatasetError::UnexpectedShape("a number").into()),
            Value::String(_) => return Err(DatasetError::UnexpectedShape("a string").into()),
        };

        let mut entries = Vec::with_capacity(records.len());
        let mut rejected = 0;
        for (index, record) in records.iter().enumerate() {
            match CampgroundEntry::from_record(record) {
                Ok(entry) => {
                    if !entry.is_displayable() {
                        tracing::debug!(index, city = %entry.city, "Record has no campground payload");
                    }
                    entries.push(entry);
                }
                Err(e) => {
                    rejected += 1;
                    tracing::warn!(index, error = %e, "Skipping malformed dataset record");
                }
            }
        }

        if entries.is_empty() && !records.is_empty() {
            return Err(DatasetError::Empty.into());
        }

        tracing::info!(loaded = entries.len(), rejected, "Loaded campground dataset");
        Ok(Self { entries, rejected })
    }

    /// The dataset compiled into the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_DATASET)
    }

    /// Reads a dataset file.
    ///
    /// # Async
    /// Uses `tokio::fs` for non-blocking I/O.
    pub async fn load_file(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json_str(&json)
    }

    /// Every record, including ones without a campground payload.
    pub fn entries(&self) -> &[CampgroundEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Looks up a displayable entry by stable ID.
    pub fn find(&self, id: &str) -> Option<&CampgroundEntry> {
        self.entries
            .iter()
            .find(|e| e.is_displayable() && e.id() == id)
    }

    /// Coordinates of every entry that can appear on the map.
    pub fn mappable_coordinates(&self) -> Vec<Coordinate> {
        self.entries
            .iter()
            .filter(|e| e.is_displayable())
            .filter_map(|e| e.coordinate)
            .collect()
    }

    /// Replaces the entry with the same city, state and campground name, or
    /// appends a new one.
    pub fn upsert(&mut self, entry: CampgroundEntry) -> UpsertOutcome {
        let existing = self.entries.iter().position(|e| {
            e.city == entry.city && e.state == entry.state && e.name() == entry.name()
        });
        if let Some(index) = existing {
            self.entries[index] = entry;
            UpsertOutcome::Replaced
        } else {
            self.entries.push(entry);
            UpsertOutcome::Inserted
        }
    }

    pub fn stats(&self) -> DatasetStats {
        let displayable: Vec<&CampgroundEntry> =
            self.entries.iter().filter(|e| e.is_displayable()).collect();
        let states: BTreeSet<&str> = displayable.iter().map(|e| e.state.as_str()).collect();
        DatasetStats {
            total: self.entries.len(),
            displayable: displayable.len(),
            mappable: displayable.iter().filter(|e| e.coordinate.is_some()).count(),
            full_hookups: displayable
                .iter()
                .filter(|e| e.hookup_type == HookupType::Full)
                .count(),
            partial_hookups: displayable
                .iter()
                .filter(|e| e.hookup_type == HookupType::Partial)
                .count(),
            states: states.len(),
            rejected: self.rejected,
        }
    }

    /// Serializes the dataset back to the canonical array form.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }
}

/// Installs `dataset` as the process-wide dataset.
///
/// Fails if [`global`] or `init_global` already ran.
pub fn init_global(dataset: Dataset) -> Result<&'static Dataset> {
    GLOBAL
        .set(dataset)
        .map_err(|_| DatasetError::AlreadyInitialized)?;
    GLOBAL
        .get()
        .ok_or_else(|| crate::Error::Internal("dataset vanished after init".into()))
}

/// The process-wide dataset, loading the bundled asset on first use.
///
/// A broken bundled asset degrades to an empty dataset rather than taking
/// the map screen down with it.
pub fn global() -> &'static Dataset {
    GLOBAL.get_or_init(|| {
        Dataset::bundled().unwrap_or_else(|e| {
            tracing::error!("Bundled dataset unusable: {e}");
            Dataset::default()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::campground::Campground;
    use crate::core::test_helpers::create_test_entry;

    #[test]
    fn test_bundled_dataset_is_valid() {
        let dataset = Dataset::bundled().unwrap();
        assert!(dataset.len() >= 10);
        assert_eq!(dataset.rejected(), 0);
        let stats = dataset.stats();
        assert_eq!(stats.displayable, stats.total);
        assert_eq!(stats.mappable, stats.total);
        assert!(stats.full_hookups > 0 && stats.partial_hookups > 0);
    }

    #[test]
    fn test_bundled_ids_are_unique() {
        let dataset = Dataset::bundled().unwrap();
        let ids: BTreeSet<&str> = dataset.entries().iter().map(CampgroundEntry::id).collect();
        assert_eq!(ids.len(), dataset.len());
    }

    #[test]
    fn test_wrapped_document() {
        let json = r#"{
            "metadata": {"version": "2.0"},
            "entries": [
                {"city": "Tucson", "state": "AZ", "campground": {"name": "A"}},
                {"city": "Mesa", "state": "AZ", "campground": {"name": "B"}}
            ]
        }"#;
        let dataset = Dataset::from_json_str(json).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let json = r#"[
            {"city": "Tucson", "state": "AZ", "campground": {"name": "A"}},
            "not a record",
            {"state": "AZ"},
            {"city": "Denver", "state": "CO", "campground": null}
        ]"#;
        let dataset = Dataset::from_json_str(json).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rejected(), 2);
        let stats = dataset.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.displayable, 1);
        assert!(dataset.find("denver-co-").is_none());
        assert!(dataset.find("tucson-az-a").is_some());
    }

    #[test]
    fn test_unexpected_shapes() {
        assert!(matches!(
            Dataset::from_json_str("42"),
            Err(crate::Error::Dataset(DatasetError::UnexpectedShape(_)))
        ));
        assert!(matches!(
            Dataset::from_json_str(r#"{"rows": []}"#),
            Err(crate::Error::Dataset(DatasetError::UnexpectedShape(_)))
        ));
        assert!(matches!(
            Dataset::from_json_str("[{\"nope\": 1}]"),
            Err(crate::Error::Dataset(DatasetError::Empty))
        ));
        assert!(matches!(
            Dataset::from_json_str("{"),
            Err(crate::Error::Serialization(_))
        ));
        assert!(Dataset::from_json_str("[]").unwrap().is_empty());
    }

    #[test]
    fn test_upsert_dedupes_by_place() {
        let mut dataset = Dataset::from_entries(vec![
            create_test_entry("Tucson", "AZ", HookupType::Full, Some("A")),
            create_test_entry("Mesa", "AZ", HookupType::Full, Some("B")),
        ]);
        let mut replacement = CampgroundEntry::new(
            "Tucson",
            "AZ",
            HookupType::Partial,
            Some(Campground::named("A")),
        );
        replacement.blog_post = Some("updated".into());
        assert_eq!(dataset.upsert(replacement), UpsertOutcome::Replaced);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.entries()[0].hookup_type, HookupType::Partial);

        let new = create_test_entry("Yuma", "AZ", HookupType::Full, Some("C"));
        assert_eq!(dataset.upsert(new), UpsertOutcome::Inserted);
        assert_eq!(dataset.entries()[2].city, "Yuma");
    }

    #[test]
    fn test_mappable_coordinates_skip_hidden_entries() {
        let dataset = Dataset::from_entries(vec![
            create_test_entry("Tucson", "AZ", HookupType::Full, Some("A")).with_coordinate(32.2, -110.9),
            create_test_entry("Mesa", "AZ", HookupType::Full, None).with_coordinate(33.4, -111.8),
            create_test_entry("Yuma", "AZ", HookupType::Full, Some("C")),
        ]);
        assert_eq!(dataset.mappable_coordinates().len(), 1);
    }

    #[test]
    fn test_json_round_trip_preserves_entries() {
        let dataset = Dataset::bundled().unwrap();
        let json = dataset.to_json_pretty().unwrap();
        let reparsed = Dataset::from_json_str(&json).unwrap();
        assert_eq!(reparsed.entries(), dataset.entries());
    }

    #[test]
    fn test_global_is_initialized_once() {
        let first = global();
        let second = global();
        assert!(std::ptr::eq(first, second));
        assert!(matches!(
            init_global(Dataset::default()),
            Err(crate::Error::Dataset(DatasetError::AlreadyInitialized))
        ));
    }
}
