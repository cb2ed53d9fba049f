use crate::domain::{IndependentTimelineRule, SyncMode, TimelineError, TimelineModel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveCamwallHomeError {
    #[error("home directory not found")]
    HomeDirNotFound,
}

pub fn resolve_camwall_home() -> Result<PathBuf, ResolveCamwallHomeError> {
    if let Some(override_dir) = std::env::var_os("CAMWALL_HOME") {
        return Ok(PathBuf::from(override_dir));
    }

    let Some(home) = dirs::home_dir() else {
        return Err(ResolveCamwallHomeError::HomeDirNotFound);
    };
    Ok(home.join(".camwall"))
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    pub cell_count: u32,
    pub segment_count: usize,
    pub total_hours: u32,
    pub default_archive_position: u32,
    pub sync_mode: SyncMode,
    pub independent_timeline_rule: IndependentTimelineRule,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            cell_count: 4,
            segment_count: 12,
            total_hours: 24,
            default_archive_position: 3600,
            sync_mode: SyncMode::Synced,
            independent_timeline_rule: IndependentTimelineRule::PromoteToSynced,
        }
    }
}

/// Largest wall the terminal grid can lay out.
pub const MAX_CELLS: u32 = 64;

#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum ConfigError {
    #[error("cell_count must be at least 1")]
    NoCells,

    #[error("cell_count {count} exceeds the maximum of {max}")]
    TooManyCells { count: u32, max: u32 },

    #[error(transparent)]
    Timeline(#[from] TimelineError),
}

impl WallConfig {
    /// Checks the configuration and builds the timeline it describes.
    pub fn timeline(&self) -> Result<TimelineModel, ConfigError> {
        if self.cell_count == 0 {
            return Err(ConfigError::NoCells);
        }
        if self.cell_count > MAX_CELLS {
            return Err(ConfigError::TooManyCells {
                count: self.cell_count,
                max: MAX_CELLS,
            });
        }
        Ok(TimelineModel::new(self.total_hours, self.segment_count)?)
    }
}

/// Command-line values that win over the config file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WallConfigOverrides {
    pub cell_count: Option<u32>,
    pub segment_count: Option<usize>,
    pub total_hours: Option<u32>,
    pub default_archive_position: Option<u32>,
    pub sync_mode: Option<SyncMode>,
    pub independent_timeline_rule: Option<IndependentTimelineRule>,
}

impl WallConfigOverrides {
    pub fn apply(&self, config: WallConfig) -> WallConfig {
        WallConfig {
            cell_count: self.cell_count.unwrap_or(config.cell_count),
            segment_count: self.segment_count.unwrap_or(config.segment_count),
            total_hours: self.total_hours.unwrap_or(config.total_hours),
            default_archive_position: self
                .default_archive_position
                .unwrap_or(config.default_archive_position),
            sync_mode: self.sync_mode.unwrap_or(config.sync_mode),
            independent_timeline_rule: self
                .independent_timeline_rule
                .unwrap_or(config.independent_timeline_rule),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadWallConfigError {
    #[error("failed to read wall config: {0}")]
    Read(#[from] io::Error),

    #[error("failed to parse wall config: {0}")]
    Parse(#[from] serde_json::Error),
}

pub fn wall_config_path(home: &Path) -> PathBuf {
    home.join("config.json")
}

pub fn load_wall_config(home: &Path) -> Result<WallConfig, LoadWallConfigError> {
    let path = wall_config_path(home);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Ok(WallConfig::default());
        }
        Err(error) => return Err(error.into()),
    };

    let config = serde_json::from_str(&raw)?;
    log::debug!("loaded wall config from {}", path.display());
    Ok(config)
}
