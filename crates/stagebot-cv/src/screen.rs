//! Screen capture seam.
//!
//! The engine captures one frame per poll tick through `ScreenSource`, so
//! every pair in a tick is evaluated against the same pixels. The live
//! implementation grabs the primary monitor with xcap.

use anyhow::{Context, bail};
use image::RgbaImage;

use crate::Result;

/// Source of captured frames.
pub trait ScreenSource {
    fn grab(&mut self) -> Result<RgbaImage>;
}

/// Live capture of the primary monitor.
pub struct LiveScreen {
    monitor: xcap::Monitor,
}

impl LiveScreen {
    /// Open the primary monitor, falling back to the first one enumerated.
    pub fn primary() -> Result<Self> {
        let mut monitors = xcap::Monitor::all().context("Failed to enumerate monitors")?;
        if monitors.is_empty() {
            bail!("No monitor available for capture");
        }
        let index = monitors
            .iter()
            .position(|m| m.is_primary())
            .unwrap_or(0);
        Ok(Self {
            monitor: monitors.swap_remove(index),
        })
    }
}

impl ScreenSource for LiveScreen {
    fn grab(&mut self) -> Result<RgbaImage> {
        self.monitor
            .capture_image()
            .context("Failed to capture screen")
    }
}
