//! Runtime configuration.
//!
//! Loaded once at startup from `config.json` next to the executable (or the
//! working directory), defaults otherwise. The debug flag picks the log
//! level for the whole run; nothing here is reconfigurable at runtime.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use stagebot_core::{Point, PollOptions};

use crate::engine::ClickOptions;

/// Pointer reset anchor in screen coordinates.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct AnchorConfig {
    pub x: u32,
    pub y: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BotConfig {
    /// Root of the reference-image tree.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
    /// Full trace logging instead of info-and-above.
    #[serde(default)]
    pub debug: bool,
    /// Default match threshold.
    #[serde(default = "default_similarity")]
    pub similarity: f64,
    /// Pointer travel time in seconds.
    #[serde(default = "default_move_duration")]
    pub move_duration: f32,
    /// Sleep between arriving at a target and clicking it.
    #[serde(default = "default_click_pause_ms")]
    pub click_pause_ms: u64,
    /// Sleep between poll ticks.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Sleep before the first check of every poll.
    #[serde(default = "default_poll_delay_ms")]
    pub poll_delay_ms: u64,
    /// Where the pointer parks after a click.
    #[serde(default)]
    pub reset_anchor: AnchorConfig,
}

fn default_assets_dir() -> PathBuf {
    "assets".into()
}

fn default_similarity() -> f64 {
    0.85
}

fn default_move_duration() -> f32 {
    0.5
}

fn default_click_pause_ms() -> u64 {
    1000
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_poll_delay_ms() -> u64 {
    1000
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            assets_dir: default_assets_dir(),
            debug: false,
            similarity: default_similarity(),
            move_duration: default_move_duration(),
            click_pause_ms: default_click_pause_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            poll_delay_ms: default_poll_delay_ms(),
            reset_anchor: AnchorConfig::default(),
        }
    }
}

impl BotConfig {
    /// Load `config.json` or fall back to defaults.
    ///
    /// Runs before the logger is installed, so failures go to stderr
    /// directly.
    pub fn load() -> Self {
        let path = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.join("config.json")))
            .filter(|p| p.exists())
            .unwrap_or_else(|| Path::new("config.json").to_path_buf());

        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(contents) => match serde_json::from_str(&contents) {
                    Ok(config) => return config,
                    Err(e) => {
                        eprintln!("Failed to parse {:?}: {}. Using defaults.", path, e)
                    }
                },
                Err(e) => eprintln!("Failed to read {:?}: {}. Using defaults.", path, e),
            }
        }

        Self::default()
    }

    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            similarity: self.similarity,
            interval: Duration::from_millis(self.poll_interval_ms),
            delay: Duration::from_millis(self.poll_delay_ms),
            result_filter: None,
        }
    }

    pub fn click_options(&self) -> ClickOptions {
        ClickOptions {
            duration: self.move_duration,
            pause: Duration::from_millis(self.click_pause_ms),
            reset: true,
            similarity: self.similarity,
        }
    }

    pub fn anchor(&self) -> Point {
        Point::new(self.reset_anchor.x as f64, self.reset_anchor.y as f64)
    }
}
