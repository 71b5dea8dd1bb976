use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::models::Coordinates;

pub const APP_NAME: &str = "salawaat";

/// Guards the config file across threads of this process.
static CONFIG_LOCK: RwLock<()> = RwLock::new(());

fn default_notice_period() -> u32 {
    15
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,
    /// Minutes before a prayer to send the "upcoming" alert.
    #[serde(default = "default_notice_period")]
    pub notice_period: u32,
    #[serde(default = "default_true")]
    pub relative: bool,
    /// Show the tray status lines.
    #[serde(default = "default_true")]
    pub status_icon: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            latitude: String::new(),
            longitude: String::new(),
            notice_period: default_notice_period(),
            relative: true,
            status_icon: true,
        }
    }
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME).context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join(format!("{}.json", APP_NAME)))
    }

    /// Where year tables are cached. Falls back to the temp dir.
    pub fn cache_dir() -> PathBuf {
        Self::project_dirs()
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|_| std::env::temp_dir().join(APP_NAME))
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude.trim(), self.longitude.trim())
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let _guard = CONFIG_LOCK.read().unwrap_or_else(|e| e.into_inner());
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig =
            serde_json::from_slice(&content).with_context(|| format!("Parsing {:?}", path))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let _guard = CONFIG_LOCK.write().unwrap_or_else(|e| e.into_inner());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }
}
