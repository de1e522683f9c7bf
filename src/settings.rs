use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::{models::Coordinate, position::FeedOptions};

/// Initial map view, before any position fix arrives.
pub const DEFAULT_CENTER: Coordinate = Coordinate::new(35.6895, 139.6917);
pub const DEFAULT_ZOOM: u8 = 15;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SketchSettings {
    pub default_center: Coordinate,
    pub zoom: u8,
    pub feed: FeedOptions,
    /// Where exported CSV files land. `None` uses the platform download dir.
    pub export_dir: Option<PathBuf>,
}

impl Default for SketchSettings {
    fn default() -> Self {
        Self {
            default_center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            feed: FeedOptions::default(),
            export_dir: None,
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<SketchSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            SketchSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self) -> SketchSettings {
        self.data
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn update(&self, settings: SketchSettings) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.persist(&settings)?;
        *guard = settings;
        Ok(())
    }

    fn persist(&self, data: &SketchSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
