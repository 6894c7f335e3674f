use crate::core::geo::EdgePadding;
use crate::throttle::ThrottleConfig;
use crate::utils::get_data_dir;
use crate::viewport::fitter::FitterConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Allowed debounce range
pub const MIN_DEBOUNCE_MS: u64 = 300;
pub const MAX_DEBOUNCE_MS: u64 = 500;

/// Application configuration: dataset source, viewport tuning and throttle limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Dataset file to use instead of the bundled one
    #[serde(default)]
    pub dataset_path: Option<PathBuf>,
    /// Quiet period before the map refits after a filter change
    ///
    /// Clamped to 300..=500 ms when read through [`AppConfig::fitter_config`].
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_animation_ms")]
    pub animation_ms: u64,
    #[serde(default = "default_detail_open_delay_ms")]
    pub detail_open_delay_ms: u64,
    /// Span in degrees used to frame a single result
    #[serde(default = "default_single_result_delta")]
    pub single_result_delta: f64,
    #[serde(default)]
    pub fit_padding: EdgePadding,
    #[serde(default = "default_free_view_limit")]
    pub free_view_limit: u32,
    #[serde(default = "default_view_window_hours")]
    pub view_window_hours: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset_path: None,
            debounce_ms: default_debounce_ms(),
            animation_ms: default_animation_ms(),
            detail_open_delay_ms: default_detail_open_delay_ms(),
            single_result_delta: default_single_result_delta(),
            fit_padding: EdgePadding::default(),
            free_view_limit: default_free_view_limit(),
            view_window_hours: default_view_window_hours(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    400
}

fn default_animation_ms() -> u64 {
    500
}

fn default_detail_open_delay_ms() -> u64 {
    600
}

fn default_single_result_delta() -> f64 {
    0.05
}

fn default_free_view_limit() -> u32 {
    5
}

fn default_view_window_hours() -> u32 {
    24
}

impl AppConfig {
    /// Viewport timings with out-of-range values clamped.
    pub fn fitter_config(&self) -> FitterConfig {
        let single_result_delta = if self.single_result_delta.is_finite() {
            self.single_result_delta
                .clamp(crate::core::geo::MIN_DELTA, crate::core::geo::MAX_DELTA)
        } else {
            default_single_result_delta()
        };
        FitterConfig {
            debounce: Duration::from_millis(self.debounce_ms.clamp(MIN_DEBOUNCE_MS, MAX_DEBOUNCE_MS)),
            animation_duration: Duration::from_millis(self.animation_ms),
            detail_open_delay: Duration::from_millis(self.detail_open_delay_ms),
            single_result_delta,
            padding: self.fit_padding,
        }
    }

    pub fn throttle_config(&self) -> ThrottleConfig {
        ThrottleConfig {
            free_view_limit: self.free_view_limit,
            window: chrono::Duration::hours(i64::from(self.view_window_hours.max(1))),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    get_data_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Saves the config to `path` using an atomic write pattern.
/// 1. Writes to a temporary file next to the target.
/// 2. Sets restrictive permissions (0o600).
/// 3. Atomically renames to the target path.
///
/// # Async
/// Uses `tokio::fs` for non-blocking I/O.
pub async fn save_config_to(config: &AppConfig, path: &Path) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    let temp_path = path.with_extension("json.tmp");

    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }

    #[cfg(unix)]
    {
        use tokio::fs::OpenOptions;
        use tokio::io::AsyncWriteExt;

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .mode(0o600) // Set permissions BEFORE any data is written
            .open(&temp_path)
            .await?;

        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
    }

    #[cfg(not(unix))]
    {
        use tokio::io::AsyncWriteExt;

        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
    }

    tokio::fs::rename(&temp_path, path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::StorageFull {
            std::io::Error::new(
                std::io::ErrorKind::StorageFull,
                "Disk full: cannot save configuration. Free up space and try again.",
            )
        } else {
            e
        }
    })
}

/// Saves the config to the default location, if a data directory exists.
pub async fn save_config(config: &AppConfig) -> std::io::Result<()> {
    match default_config_path() {
        Some(path) => save_config_to(config, &path).await,
        None => Ok(()),
    }
}

/// Loads the config from `path`. Missing or corrupt files yield defaults.
pub async fn load_config_from(path: &Path) -> AppConfig {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), "Ignoring corrupt config: {e}");
            AppConfig::default()
        }),
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), "Failed to read config: {e}");
            }
            AppConfig::default()
        }
    }
}

/// Loads the config from the default location, or returns defaults.
pub async fn load_config() -> AppConfig {
    match default_config_path() {
        Some(path) => load_config_from(&path).await,
        None => AppConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"debounce_ms": 450}"#).unwrap();
        assert_eq!(config.debounce_ms, 450);
        assert_eq!(config.free_view_limit, 5);
        assert_eq!(config.fit_padding, EdgePadding::default());
        assert_eq!(config.fitter_config().debounce, Duration::from_millis(450));
    }

    #[test]
    fn test_debounce_is_clamped() {
        let fast = AppConfig {
            debounce_ms: 50,
            ..AppConfig::default()
        };
        assert_eq!(fast.fitter_config().debounce, Duration::from_millis(300));
        let slow = AppConfig {
            debounce_ms: 5000,
            ..AppConfig::default()
        };
        assert_eq!(slow.fitter_config().debounce, Duration::from_millis(500));
    }

    #[test]
    fn test_defaults_match_fitter_defaults() {
        assert_eq!(AppConfig::default().fitter_config(), FitterConfig::default());
        assert_eq!(AppConfig::default().throttle_config(), ThrottleConfig::default());
    }

    #[test]
    fn test_bad_delta_falls_back() {
        let config = AppConfig {
            single_result_delta: f64::NAN,
            ..AppConfig::default()
        };
        assert_eq!(config.fitter_config().single_result_delta, 0.05);
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let config = AppConfig {
            dataset_path: Some(PathBuf::from("/tmp/campgrounds.json")),
            free_view_limit: 3,
            ..AppConfig::default()
        };
        save_config_to(&config, &path).await.unwrap();
        assert_eq!(load_config_from(&path).await, config);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_or_corrupt_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        assert_eq!(load_config_from(&path).await, AppConfig::default());
        tokio::fs::write(&path, "{ nope").await.unwrap();
        assert_eq!(load_config_from(&path).await, AppConfig::default());
    }
}
