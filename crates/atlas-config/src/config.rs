//! Viewer settings persisted as `config.ron`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name used inside the config directory.
const CONFIG_FILE: &str = "config.ron";

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    /// Viewer lifecycle settings.
    pub viewer: ViewerConfig,
    /// Accelerated view.
    pub render: RenderConfig,
    /// Colour theme.
    pub theme: ThemeConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Initial inner size in logical pixels.
    pub width: u32,
    pub height: u32,
    /// Present in sync with the display.
    pub vsync: bool,
    pub title: String,
}

/// When the viewer should run its activation sequence.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivationMode {
    /// Activate as soon as the window exists.
    Immediate,
    /// Wait until the window is first visible with a non-zero size.
    #[default]
    OnVisible,
}

/// Viewer lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    /// Skip the capability probe and go straight to the 2D fallback.
    pub force_fallback: bool,
    /// Activation trigger.
    pub activation: ActivationMode,
    /// Quiet period before a burst of resize events is applied.
    pub resize_debounce_ms: u64,
    /// Fraction of the window that must be visible to count as on-screen.
    pub visibility_threshold: f32,
    /// Seed for the mesh perturbation and star field. `None` draws from entropy.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Upper bound for the device pixel ratio used to size the surface.
    pub max_pixel_ratio: f64,
    /// Clear colour of the accelerated view (linear RGB).
    pub clear_color: [f64; 3],
    /// Prefer a high-performance adapter over a low-power one.
    pub high_performance: bool,
}

/// Light or dark page theme.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Default background colour for this theme as `0xRRGGBB`.
    pub fn background(self) -> u32 {
        match self {
            Theme::Light => 0xf4f4f5,
            Theme::Dark => 0x18181b,
        }
    }

    /// Parse a theme name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

/// Theme configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThemeConfig {
    /// Active theme.
    pub theme: Theme,
    /// Explicit background colour (`0xRRGGBB`) overriding the theme default.
    pub background: Option<u32>,
}

impl ThemeConfig {
    /// Background colour the fallback view clears to.
    pub fn background_rgb(&self) -> u32 {
        self.background.unwrap_or_else(|| self.theme.background())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Bare level (`debug`) or a full filter directive (`info,atlas_viewer=trace`).
    pub log_level: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            title: "Atlas Viewer".to_string(),
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            force_fallback: false,
            activation: ActivationMode::OnVisible,
            resize_debounce_ms: 250,
            visibility_threshold: 0.1,
            seed: None,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_pixel_ratio: 2.0,
            clear_color: [0.0, 0.0, 0.0],
            high_performance: true,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Platform config directory for the viewer, if the OS exposes one.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("atlas-viewer"))
}

impl Config {
    /// Read `config.ron` from `config_dir`. A missing file is replaced by
    /// the defaults, which are written back.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        if !path.exists() {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Wrote default viewer config to {}", path.display());
            return Ok(config);
        }
        let config = Self::read(&path)?;
        log::info!("Viewer config loaded from {}", path.display());
        Ok(config)
    }

    /// Write this config as pretty RON, creating `config_dir` if needed.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;
        let path = config_dir.join(CONFIG_FILE);
        let text = ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::new().depth_limit(3).enumerate_arrays(false),
        )?;
        std::fs::write(&path, text).map_err(|source| ConfigError::Write { path, source })
    }

    /// Re-read the file. `Some` only when its contents differ from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = Self::read(&config_dir.join(CONFIG_FILE))?;
        if fresh == *self {
            return Ok(None);
        }
        log::info!("Viewer config changed on disk");
        Ok(Some(fresh))
    }

    /// Copy the settings a running viewer can pick up without restarting:
    /// the visibility threshold and the resize debounce. Everything else
    /// needs a new window or device and is left as is.
    pub fn apply_live_settings(&mut self, fresh: &Config) {
        self.viewer.visibility_threshold = fresh.viewer.visibility_threshold;
        self.viewer.resize_debounce_ms = fresh.viewer.resize_debounce_ms;
    }

    /// Reject values the viewer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &str| -> Result<(), ConfigError> {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            })
        };
        if self.window.width == 0 || self.window.height == 0 {
            return invalid("window", "width and height must be non-zero");
        }
        if !(0.0..=1.0).contains(&self.viewer.visibility_threshold) {
            return invalid("viewer.visibility_threshold", "must lie in [0, 1]");
        }
        if !(self.render.max_pixel_ratio.is_finite() && self.render.max_pixel_ratio > 0.0) {
            return invalid("render.max_pixel_ratio", "must be a positive number");
        }
        if self.render.clear_color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return invalid("render.clear_color", "channels must lie in [0, 1]");
        }
        Ok(())
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = ron::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_write_window_size() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("resize_debounce_ms: 250"));
        assert!(ron_str.contains("activation: OnVisible"));
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (width: 640))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 720, "unset field keeps its default");
        assert_eq!(config.viewer, ViewerConfig::default());
        assert_eq!(config.render.max_pixel_ratio, 2.0);
    }

    #[test]
    fn test_unknown_fields_are_tolerated() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 800;
        config.viewer.force_fallback = true;
        config.viewer.seed = Some(7);
        config.theme.theme = Theme::Dark;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(
            dir.path().join(CONFIG_FILE).exists(),
            "a default config file should be written on first load"
        );
    }

    #[test]
    fn test_reload_returns_edited_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.viewer.resize_debounce_ms = 100;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.map(|c| c.viewer.resize_debounce_ms), Some(100));
    }

    #[test]
    fn test_reload_unchanged_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_malformed_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_out_of_range_value_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "(viewer: (visibility_threshold: 2.5))",
        )
        .unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(
            matches!(result, Err(ConfigError::Invalid { field: "viewer.visibility_threshold", .. })),
            "got {result:?}"
        );
    }

    #[test]
    fn test_live_settings_leave_startup_values() {
        let mut running = Config::default();
        running.viewer.force_fallback = true;
        let mut fresh = Config::default();
        fresh.viewer.visibility_threshold = 0.5;
        fresh.viewer.resize_debounce_ms = 100;
        fresh.window.width = 640;
        running.apply_live_settings(&fresh);
        assert_eq!(running.viewer.visibility_threshold, 0.5);
        assert_eq!(running.viewer.resize_debounce_ms, 100);
        assert_eq!(running.window.width, 1280, "window size needs a restart");
        assert!(running.viewer.force_fallback, "CLI overrides survive a reload");
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
        let mut config = Config::default();
        config.window.width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_theme_background() {
        let mut theme = ThemeConfig::default();
        assert_eq!(theme.background_rgb(), 0xf4f4f5);
        theme.theme = Theme::Dark;
        assert_eq!(theme.background_rgb(), 0x18181b);
        theme.background = Some(0x112233);
        assert_eq!(theme.background_rgb(), 0x112233, "explicit colour wins");
    }

    #[test]
    fn test_theme_from_name() {
        assert_eq!(Theme::from_name("DARK"), Some(Theme::Dark));
        assert_eq!(Theme::from_name("light"), Some(Theme::Light));
        assert_eq!(Theme::from_name("sepia"), None);
    }
}
