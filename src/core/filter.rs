//! Campground filtering and search
//!
//! [`filter_campgrounds`] is a single stable pass over the dataset. It never
//! fails: records that cannot be shown are dropped, never reported.
//!
//! # Bookmark loading
//!
//! The bookmark set is read asynchronously when a screen gains focus. Until it
//! arrives, [`FilterCriteria::bookmarked_ids`] is `None` and the bookmark
//! filter is not applied. An empty loaded set is treated the same way, so
//! toggling "bookmarked" never produces a false-empty result list.

use crate::core::campground::{CampgroundEntry, HookupType};
use std::collections::HashSet;

/// Queries shorter than this (after trimming) do not filter.
pub const MIN_SEARCH_CHARS: usize = 2;

/// Hookup filter selected in the UI
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum HookupFilter {
    #[default]
    #[strum(serialize = "all")]
    All,
    #[strum(serialize = "full")]
    Full,
    #[strum(serialize = "partial")]
    Partial,
}

impl HookupFilter {
    pub fn matches(self, hookup_type: HookupType) -> bool {
        match self {
            HookupFilter::All => true,
            HookupFilter::Full => hookup_type == HookupType::Full,
            HookupFilter::Partial => hookup_type == HookupType::Partial,
        }
    }
}

/// Filter state, rebuilt from UI state on every keystroke or toggle
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterCriteria<'a> {
    pub hookup: HookupFilter,
    pub search_query: &'a str,
    pub bookmarked_only: bool,
    /// `None` while bookmarks are still loading
    pub bookmarked_ids: Option<&'a HashSet<String>>,
}

impl<'a> FilterCriteria<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hookup(mut self, hookup: HookupFilter) -> Self {
        self.hookup = hookup;
        self
    }

    pub fn with_search(mut self, query: &'a str) -> Self {
        self.search_query = query;
        self
    }

    pub fn with_bookmarks(mut self, only: bool, ids: Option<&'a HashSet<String>>) -> Self {
        self.bookmarked_only = only;
        self.bookmarked_ids = ids;
        self
    }

    /// Trimmed, lower-cased query, or `None` when it is too short to filter.
    pub fn effective_query(&self) -> Option<String> {
        let trimmed = self.search_query.trim();
        (trimmed.chars().count() >= MIN_SEARCH_CHARS).then(|| trimmed.to_lowercase())
    }

    /// Bookmark set to restrict to, if the bookmark filter actually applies.
    fn active_bookmarks(&self) -> Option<&'a HashSet<String>> {
        if !self.bookmarked_only {
            return None;
        }
        self.bookmarked_ids.filter(|ids| !ids.is_empty())
    }

    /// True when any filter would narrow the result set.
    pub fn is_active(&self) -> bool {
        self.hookup != HookupFilter::All
            || self.effective_query().is_some()
            || self.active_bookmarks().is_some()
    }

    /// Key summarizing the filter state, used to skip redundant map fits.
    ///
    /// Queries below [`MIN_SEARCH_CHARS`] map to the empty query, so the first
    /// keystroke of a search does not change the signature. While the bookmark
    /// filter applies, the sorted bookmark IDs are appended, so bookmarks
    /// arriving or changing under the toggle count as a new filter state.
    pub fn signature(&self) -> String {
        let mut signature = format!(
            "{}|{}|{}",
            self.hookup,
            self.effective_query().unwrap_or_default(),
            self.bookmarked_only
        );
        if let Some(ids) = self.active_bookmarks() {
            let mut ids: Vec<&str> = ids.iter().map(String::as_str).collect();
            ids.sort_unstable();
            signature.push('|');
            signature.push_str(&ids.join(","));
        }
        signature
    }
}

/// Counts for "showing N of M" labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSummary {
    /// Every record in the backing dataset
    pub total: usize,
    /// Records with a campground payload
    pub displayable: usize,
    /// Records passing the current criteria
    pub matched: usize,
}

/// Returns the entries matching `criteria`, in dataset order.
pub fn filter_campgrounds<'e>(
    entries: &'e [CampgroundEntry],
    criteria: &FilterCriteria<'_>,
) -> Vec<&'e CampgroundEntry> {
    let query = criteria.effective_query();
    let bookmarks = criteria.active_bookmarks();

    entries
        .iter()
        .filter(|entry| entry.is_displayable())
        .filter(|entry| criteria.hookup.matches(entry.hookup_type))
        .filter(|entry| query.as_deref().is_none_or(|q| entry.matches_lowercase(q)))
        .filter(|entry| bookmarks.is_none_or(|ids| ids.contains(entry.id())))
        .collect()
}

/// Same as [`filter_campgrounds`], plus the counts needed by list headers.
pub fn filter_with_summary<'e>(
    entries: &'e [CampgroundEntry],
    criteria: &FilterCriteria<'_>,
) -> (Vec<&'e CampgroundEntry>, FilterSummary) {
    let matched = filter_campgrounds(entries, criteria);
    let summary = FilterSummary {
        total: entries.len(),
        displayable: entries.iter().filter(|e| e.is_displayable()).count(),
        matched: matched.len(),
    };
    tracing::debug!(
        total = summary.total,
        matched = summary.matched,
        signature = %criteria.signature(),
        "Filtered campgrounds"
    );
    (matched, summary)
}
