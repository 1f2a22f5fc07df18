//! User preferences persisted under the platform config directory

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::constants::config;

/// Front-end preferences: which control profile is the default, whether the
/// FPS indicator draws, and where skins and digit fonts live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPrefs {
    /// Default touchscreen control profile; empty means no default selected.
    #[serde(default)]
    pub touchscreen_default_profile: String,

    #[serde(default)]
    pub fps_enabled: bool,

    #[serde(default = "default_skin_dir")]
    pub skin_dir: PathBuf,

    #[serde(default = "default_fonts_dir")]
    pub fonts_dir: PathBuf,
}

fn data_dir() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(config::APP_DIR);
    path
}

fn default_skin_dir() -> PathBuf {
    data_dir().join("skins").join("default")
}

fn default_fonts_dir() -> PathBuf {
    data_dir().join("fonts")
}

impl Default for UserPrefs {
    fn default() -> Self {
        Self {
            touchscreen_default_profile: String::new(),
            fps_enabled: false,
            skin_dir: default_skin_dir(),
            fonts_dir: default_fonts_dir(),
        }
    }
}

impl UserPrefs {
    pub fn path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(config::APP_DIR);
        path.push(config::PREFS_FILENAME);
        path
    }

    /// Load preferences from TOML, creating the default file when absent.
    pub fn load() -> Result<Self> {
        let path = Self::path();
        if !path.exists() {
            info!("Preferences not found, creating defaults at {:?}", path);
            let prefs = Self::default();
            prefs.save()?;
            return Ok(prefs);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read preferences from {:?}", path))?;
        let prefs: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML from {:?}", path))?;
        Ok(prefs)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }
        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize preferences")?;
        fs::write(&path, toml_string)
            .with_context(|| format!("Failed to write preferences to {:?}", path))?;
        info!("Saved preferences to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let prefs: UserPrefs = toml::from_str("").unwrap();
        assert_eq!(prefs.touchscreen_default_profile, "");
        assert!(!prefs.fps_enabled);
        assert_eq!(prefs.skin_dir, default_skin_dir());
        assert_eq!(prefs.fonts_dir, default_fonts_dir());
    }

    #[test]
    fn test_round_trip() {
        let mut prefs = UserPrefs::default();
        prefs.touchscreen_default_profile = "Thumbs".to_string();
        prefs.fps_enabled = true;
        prefs.skin_dir = PathBuf::from("skins/outline");

        let text = toml::to_string_pretty(&prefs).unwrap();
        let back: UserPrefs = toml::from_str(&text).unwrap();
        assert_eq!(back.touchscreen_default_profile, "Thumbs");
        assert!(back.fps_enabled);
        assert_eq!(back.skin_dir, PathBuf::from("skins/outline"));
    }
}
