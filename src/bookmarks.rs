//! Bookmarked campgrounds
//!
//! Bookmarks are a set of stable entry IDs persisted as a JSON array under
//! [`BOOKMARKS_KEY`]. The set is loaded asynchronously, so screens see
//! [`BookmarkState::Loading`] first; filters treat that the same as "no
//! bookmark filter" until the set arrives.

use crate::core::error::Result;
use crate::store::{self, KeyValueStore};
use std::collections::{BTreeSet, HashSet};

pub const BOOKMARKS_KEY: &str = "bookmarks";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BookmarkState {
    #[default]
    Loading,
    Ready(HashSet<String>),
}

impl BookmarkState {
    /// The loaded set, or `None` while loading.
    pub fn ids(&self) -> Option<&HashSet<String>> {
        match self {
            BookmarkState::Loading => None,
            BookmarkState::Ready(ids) => Some(ids),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, BookmarkState::Loading)
    }
}

/// Bookmark set bound to a store
#[derive(Debug)]
pub struct BookmarkStore<S> {
    store: S,
    state: BookmarkState,
}

impl<S: KeyValueStore> BookmarkStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: BookmarkState::Loading,
        }
    }

    /// Reads the persisted set. A missing or corrupt value loads as empty.
    pub async fn load(&mut self) -> &BookmarkState {
        let ids: HashSet<String> = store::load::<Vec<String>>(&self.store, BOOKMARKS_KEY)
            .await
            .unwrap_or_default()
            .into_iter()
            .collect();
        tracing::debug!(count = ids.len(), "Loaded bookmarks");
        self.state = BookmarkState::Ready(ids);
        &self.state
    }

    pub fn state(&self) -> &BookmarkState {
        &self.state
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state.ids().is_some_and(|ids| ids.contains(id))
    }

    /// Bookmarked IDs in sorted order. Empty while loading.
    pub fn ids(&self) -> Vec<&str> {
        let sorted: BTreeSet<&str> = self
            .state
            .ids()
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect();
        sorted.into_iter().collect()
    }

    /// Adds or removes `id` and persists the new set.
    ///
    /// Returns whether `id` is bookmarked afterwards. On a failed write the
    /// in-memory set is left unchanged.
    pub async fn toggle(&mut self, id: &str) -> Result<bool> {
        if self.state.is_loading() {
            self.load().await;
        }
        let mut ids = self.state.ids().cloned().unwrap_or_default();
        let bookmarked = if ids.remove(id) {
            false
        } else {
            ids.insert(id.to_string());
            true
        };

        let mut persisted: Vec<&str> = ids.iter().map(String::as_str).collect();
        persisted.sort_unstable();
        store::save(&self.store, BOOKMARKS_KEY, &persisted).await?;

        tracing::info!(id, bookmarked, "Bookmark toggled");
        self.state = BookmarkState::Ready(ids);
        Ok(bookmarked)
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}
