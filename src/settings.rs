use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::viewer::ViewerConfig;

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "docshelf";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("failed to encode settings: {0}")]
    Encode(serde_yaml::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Size of one terminal cell in gesture units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellSize {
    pub width: f32,
    pub height: f32,
}

impl Default for CellSize {
    fn default() -> Self {
        Self {
            width: 8.0,
            height: 16.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Catalog file opened when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub mouse: bool,

    #[serde(default)]
    pub cell_size: CellSize,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub viewer: ViewerConfig,
}

fn default_true() -> bool {
    true
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            catalog: None,
            mouse: true,
            cell_size: CellSize::default(),
            log_level: default_log_level(),
            viewer: ViewerConfig::default(),
        }
    }
}

pub fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

impl Settings {
    /// Read settings from `path`; every missing field takes its default
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings: Settings =
            serde_yaml::from_str(&content).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if settings.version < CURRENT_VERSION {
            migrate_settings(&mut settings);
        }
        settings.viewer = settings.viewer.sanitized();
        debug!("Loaded settings from {path:?}");
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let mut content = String::from(SETTINGS_HEADER);
        content.push_str(&serde_yaml::to_string(self).map_err(SettingsError::Encode)?);
        fs::write(path, content).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Saved settings to {path:?}");
        Ok(())
    }
}

/// Load settings from `explicit`, or the config dir. A missing default file
/// is created; a broken one is reported and replaced by defaults in memory.
pub fn load_settings(explicit: Option<&Path>) -> Settings {
    if let Some(path) = explicit {
        return Settings::load_from(path).unwrap_or_else(|e| {
            error!("{e}");
            Settings::default()
        });
    }

    let Some(path) = preferred_config_path() else {
        warn!("Could not determine config directory, using default settings");
        return Settings::default();
    };
    if !path.exists() {
        info!("Settings file not found, creating with defaults at {path:?}");
        let settings = Settings::default();
        if let Err(e) = settings.save_to(&path) {
            error!("{e}");
        }
        return settings;
    }
    Settings::load_from(&path).unwrap_or_else(|e| {
        error!("{e}");
        Settings::default()
    })
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );
    settings.version = CURRENT_VERSION;
}

const SETTINGS_HEADER: &str = r#"# docshelf settings
#
# viewer.min_scale / max_scale bound every zoom; zoomed_scale is the
# double-tap target. Distances are in gesture units (terminal cells
# multiplied by cell_size), durations in milliseconds.

"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "mouse: false\nviewer:\n  max_scale: 4.0\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert!(!settings.mouse);
        assert_eq!(settings.viewer.max_scale, 4.0);
        assert_eq!(settings.viewer.min_scale, ViewerConfig::default().min_scale);
        assert_eq!(settings.cell_size, CellSize::default());
        assert_eq!(settings.version, CURRENT_VERSION);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let settings = Settings {
            catalog: Some(PathBuf::from("/srv/catalog.yaml")),
            log_level: "debug".into(),
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "viewer: [not, a, map]\n").unwrap();

        assert!(matches!(
            Settings::load_from(&path),
            Err(SettingsError::Parse { .. })
        ));
        assert_eq!(load_settings(Some(&path)), Settings::default());
    }
}
