//! Typed user preferences over the key-value store
//!
//! Values are stored as lowercase strings. Anything unrecognised reads as the
//! default, so a downgrade or a hand-edited store never breaks startup.

use crate::core::error::Result;
use crate::store::{self, KeyValueStore};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString};

pub const MAP_APP_KEY: &str = "map_app";
pub const THEME_MODE_KEY: &str = "theme_mode";
pub const HAS_LAUNCHED_KEY: &str = "has_launched";

/// External map app used for directions
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MapApp {
    Apple,
    Google,
    Waze,
}

impl MapApp {
    pub fn label(self) -> &'static str {
        match self {
            MapApp::Apple => "Apple Maps",
            MapApp::Google => "Google Maps",
            MapApp::Waze => "Waze",
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

async fn load_enum<T: FromStr>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let raw: String = store::load(store, key).await?;
    let parsed = raw.parse().ok();
    if parsed.is_none() {
        tracing::debug!(key, value = %raw, "Unknown stored preference, using default");
    }
    parsed
}

/// Preferred map app, or `None` if the user has not picked one yet.
pub async fn map_app(store: &impl KeyValueStore) -> Option<MapApp> {
    load_enum(store, MAP_APP_KEY).await
}

pub async fn set_map_app(store: &impl KeyValueStore, app: MapApp) -> Result<()> {
    tracing::info!(%app, "Map app preference changed");
    store::save(store, MAP_APP_KEY, &app).await
}

pub async fn theme_mode(store: &impl KeyValueStore) -> ThemeMode {
    load_enum(store, THEME_MODE_KEY).await.unwrap_or_default()
}

pub async fn set_theme_mode(store: &impl KeyValueStore, mode: ThemeMode) -> Result<()> {
    store::save(store, THEME_MODE_KEY, &mode).await
}

/// True until [`mark_launched`] has been persisted.
pub async fn is_first_launch(store: &impl KeyValueStore) -> bool {
    !store::load::<bool>(store, HAS_LAUNCHED_KEY)
        .await
        .unwrap_or(false)
}

pub async fn mark_launched(store: &impl KeyValueStore) -> Result<()> {
    store::save(store, HAS_LAUNCHED_KEY, &true).await
}
