//! User settings read from `<config dir>/quickcrop/config.toml`.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    DEFAULT_HOTKEY, DOUBLE_CLICK_INTERVAL, HANDLE_HIT_RADIUS, OVERLAY_DIM_ALPHA,
};
use crate::overlay::OverlayStyle;
use crate::persist;
use crate::selection::SurfaceOptions;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    pub hotkey: String,
    /// Defaults to `~/Pictures/QuickCrop` when unset.
    pub save_directory: Option<String>,
    pub ask_save_location: bool,
    pub double_click_ms: u64,
    pub handle_hit_radius: f64,
    pub dim_alpha: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hotkey: DEFAULT_HOTKEY.to_string(),
            save_directory: None,
            ask_save_location: false,
            double_click_ms: DOUBLE_CLICK_INTERVAL.as_millis() as u64,
            handle_hit_radius: HANDLE_HIT_RADIUS,
            dim_alpha: OVERLAY_DIM_ALPHA,
        }
    }
}

impl Config {
    /// Read the user's config file. Missing or broken files give defaults.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("No config at {} ({e}); using defaults", path.display());
                return Self::default();
            }
        };
        match Self::from_toml(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring invalid config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("quickcrop").join("config.toml"))
    }

    pub fn save_directory(&self) -> Option<PathBuf> {
        match &self.save_directory {
            Some(dir) => persist::expand_home(dir),
            None => persist::default_save_directory(),
        }
    }

    pub fn surface_options(&self) -> SurfaceOptions {
        SurfaceOptions {
            double_click_interval: Duration::from_millis(self.double_click_ms),
            handle_hit_radius: self.handle_hit_radius.max(0.0),
        }
    }

    pub fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle {
            dim_alpha: self.dim_alpha.clamp(0.0, 1.0),
            ..OverlayStyle::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(Config::from_toml("").expect("parse"), Config::default());
        assert_eq!(
            Config::default().surface_options().double_click_interval,
            DOUBLE_CLICK_INTERVAL
        );
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            hotkey = "alt+shift+KeyS"
            dim_alpha = 0.5
            save_directory = "/tmp/shots"
            "#,
        )
        .expect("parse");
        assert_eq!(config.hotkey, "alt+shift+KeyS");
        assert_eq!(config.dim_alpha, 0.5);
        assert_eq!(config.double_click_ms, 500);
        assert_eq!(config.save_directory(), Some(PathBuf::from("/tmp/shots")));
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "double_click_ms = \"soon\"").expect("write");
        assert_eq!(Config::load_from(&path), Config::default());
        assert_eq!(Config::load_from(&dir.path().join("missing.toml")), Config::default());
    }

    #[test]
    fn options_are_derived_and_clamped() {
        let config = Config {
            double_click_ms: 250,
            handle_hit_radius: -3.0,
            dim_alpha: 4.0,
            ..Config::default()
        };
        let surface = config.surface_options();
        assert_eq!(surface.double_click_interval, Duration::from_millis(250));
        assert_eq!(surface.handle_hit_radius, 0.0);
        assert_eq!(config.overlay_style().dim_alpha, 1.0);
    }
}
