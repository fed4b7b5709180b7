// src/config.rs

//! Defines the configuration structures for `draw-world`.
//!
//! Every section has sensible defaults, so an empty or partial JSON file is
//! valid. The process-wide [`CONFIG`] is loaded once, on first use:
//!
//! 1. `DRAW_WORLD_CONFIG` may name a JSON file to read.
//! 2. `DRAW_WORLD_HEADLESS` (`1`/`true`) forces headless canvases.
//! 3. `DRAW_WORLD_SCREENSHOT_DIR` overrides where headless screenshots go.

use crate::color::Color;
use anyhow::{Context, Result};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming a JSON configuration file.
pub const CONFIG_PATH_ENV: &str = "DRAW_WORLD_CONFIG";
/// Environment variable forcing headless mode.
pub const HEADLESS_ENV: &str = "DRAW_WORLD_HEADLESS";
/// Environment variable overriding the screenshot directory.
pub const SCREENSHOT_DIR_ENV: &str = "DRAW_WORLD_SCREENSHOT_DIR";

/// Process-wide configuration, loaded on first access.
pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    let config = Config::from_env().unwrap_or_else(|e| {
        warn!("Failed to load configuration, using defaults: {:#}", e);
        Config::default()
    });
    info!("Configuration loaded: {:?}", config);
    config
});

/// Represents the complete configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window creation and placement.
    pub window: WindowConfig,
    /// Off-screen buffer defaults.
    pub canvas: CanvasConfig,
    /// The pause dialog.
    pub dialog: DialogConfig,
    /// Headless screenshot output.
    pub screenshot: ScreenshotConfig,
    /// Polling granularity of the display and loop threads.
    pub timing: TimingConfig,
}

// --- Window Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Screen position of the first window.
    pub origin_x: i32,
    pub origin_y: i32,
    /// Diagonal offset between successively created windows, in pixels.
    pub placement_step: i32,
    /// Title used by `Canvas::new` when none is given.
    pub default_title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            origin_x: 0,
            origin_y: 0,
            placement_step: 10,
            default_title: "Canvas".to_string(),
        }
    }
}

// --- Canvas Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CanvasConfig {
    /// Color a fresh buffer is cleared to.
    pub background: Color,
    /// Color used by `draw_string`, whatever the caller draws with elsewhere.
    pub text_color: Color,
    /// Start every canvas in headless mode.
    pub headless: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        CanvasConfig {
            background: Color::White,
            text_color: Color::Black,
            headless: false,
        }
    }
}

// --- Dialog Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DialogConfig {
    /// Message shown by `Canvas::pause()` without arguments.
    pub pause_message: String,
    pub title: String,
    pub button_label: String,
}

impl Default for DialogConfig {
    fn default() -> Self {
        DialogConfig {
            pause_message: "Continue?".to_string(),
            title: "Pausing...".to_string(),
            button_label: "OK".to_string(),
        }
    }
}

// --- Screenshot Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScreenshotConfig {
    /// Directory screenshots are written to.
    pub directory: PathBuf,
    /// File name prefix; files are `<prefix>NNNN.png`.
    pub prefix: String,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        ScreenshotConfig {
            directory: PathBuf::from("."),
            prefix: "screenshot".to_string(),
        }
    }
}

// --- Timing Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    /// How long the display thread waits for commands before polling the
    /// window for input again.
    pub poll_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            poll_interval_ms: 5,
        }
    }
}

impl TimingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Config {
    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse configuration JSON")
    }

    /// Reads a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        Self::from_json(&text)
    }

    /// Builds the configuration from the file named by `DRAW_WORLD_CONFIG`
    /// (if any) plus environment overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Config::default(),
        };
        config.apply_overrides(
            std::env::var(HEADLESS_ENV).ok().as_deref(),
            std::env::var_os(SCREENSHOT_DIR_ENV).map(PathBuf::from),
        );
        Ok(config)
    }

    fn apply_overrides(&mut self, headless: Option<&str>, screenshot_dir: Option<PathBuf>) {
        if let Some(value) = headless {
            self.canvas.headless = matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        if let Some(dir) = screenshot_dir {
            self.screenshot.directory = dir;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn empty_json_yields_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.window.placement_step, 10);
        assert_eq!(config.dialog.pause_message, "Continue?");
        assert_eq!(config.screenshot.prefix, "screenshot");
    }

    #[test_log::test]
    fn partial_sections_keep_remaining_defaults() {
        let config = Config::from_json(
            r#"{ "canvas": { "headless": true, "background": "light_gray" },
                 "window": { "placement_step": 25 } }"#,
        )
        .unwrap();
        assert!(config.canvas.headless);
        assert_eq!(config.canvas.background, Color::LightGray);
        assert_eq!(config.canvas.text_color, Color::Black);
        assert_eq!(config.window.placement_step, 25);
        assert_eq!(config.window.default_title, "Canvas");
    }

    #[test_log::test]
    fn malformed_json_is_an_error() {
        assert!(Config::from_json("{ not json").is_err());
    }

    #[test_log::test]
    fn environment_overrides_apply_on_top() {
        let mut config = Config::default();
        config.apply_overrides(Some("TRUE"), Some(PathBuf::from("/tmp/shots")));
        assert!(config.canvas.headless);
        assert_eq!(config.screenshot.directory, PathBuf::from("/tmp/shots"));

        config.apply_overrides(Some("0"), None);
        assert!(!config.canvas.headless);
    }
}
