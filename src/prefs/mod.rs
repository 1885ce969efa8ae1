use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::feed::UpdateRecord;

/// Which of the two dashboard layouts is active.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    Timeline,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Grid => ViewMode::Timeline,
            ViewMode::Timeline => ViewMode::Grid,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct PreferenceData {
    #[serde(rename = "view-mode")]
    view_mode: ViewMode,
}

/// Key-value preference storage under the state directory.
///
/// Entries are read once at startup and written back on every change.
/// There is no versioning or migration; an unreadable file falls back to
/// defaults with a warning.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    prefs_file: PathBuf,
    feed_cache_file: PathBuf,
}

impl PreferenceStore {
    pub fn open(state_dir: &Path) -> Result<Self> {
        fs::create_dir_all(state_dir)
            .with_context(|| format!("creating state directory {}", state_dir.display()))?;
        Ok(Self {
            prefs_file: state_dir.join("preferences.json"),
            feed_cache_file: state_dir.join("feed-cache.json"),
        })
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode_or(ViewMode::default())
    }

    /// The persisted view mode, or `fallback` while no entry exists yet.
    /// The configured default applies only until the user toggles once.
    pub fn view_mode_or(&self, fallback: ViewMode) -> ViewMode {
        if !self.prefs_file.exists() {
            return fallback;
        }
        match self.read_data() {
            Ok(data) => data.view_mode,
            Err(err) => {
                tracing::warn!(?err, "unreadable preferences, using defaults");
                fallback
            }
        }
    }

    pub fn set_view_mode(&self, mode: ViewMode) -> Result<()> {
        let mut data = self.read_data().unwrap_or_default();
        data.view_mode = mode;
        let json = serde_json::to_string_pretty(&data).context("serializing preferences")?;
        fs::write(&self.prefs_file, json)
            .with_context(|| format!("writing preferences {}", self.prefs_file.display()))?;
        Ok(())
    }

    /// The most recently loaded feed, if one was ever cached.
    pub fn cached_feed(&self) -> Result<Option<Vec<UpdateRecord>>> {
        if !self.feed_cache_file.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.feed_cache_file)
            .with_context(|| format!("reading feed cache {}", self.feed_cache_file.display()))?;
        let records = serde_json::from_str(&raw).context("parsing cached feed")?;
        Ok(Some(records))
    }

    pub fn cache_feed(&self, records: &[UpdateRecord]) -> Result<()> {
        let json = serde_json::to_string(records).context("serializing feed cache")?;
        fs::write(&self.feed_cache_file, json)
            .with_context(|| format!("writing feed cache {}", self.feed_cache_file.display()))?;
        Ok(())
    }

    fn read_data(&self) -> Result<PreferenceData> {
        if !self.prefs_file.exists() {
            return Ok(PreferenceData::default());
        }
        let raw = fs::read_to_string(&self.prefs_file)
            .with_context(|| format!("reading preferences {}", self.prefs_file.display()))?;
        serde_json::from_str(&raw).context("parsing preferences json")
    }
}
