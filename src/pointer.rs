//! Pointer control seam.
//!
//! `PointerDevice` is the raw device (move, click); the controller adds the
//! off-screen reset anchor so the pointer does not occlude the regions
//! future captures need to read.

use anyhow::{Result, anyhow};
use log::debug;
use rustautogui::RustAutoGui;

use stagebot_core::Point;

/// Raw pointer operations.
pub trait PointerDevice {
    /// Move the pointer to (x, y) over `duration` seconds (0 = instant).
    fn move_to(&mut self, x: f64, y: f64, duration: f32) -> Result<()>;
    /// Click at the current pointer position.
    fn click(&mut self) -> Result<()>;
}

/// Live pointer backed by rustautogui.
pub struct AutoGuiPointer {
    gui: RustAutoGui,
}

impl AutoGuiPointer {
    pub fn new(debug: bool) -> Result<Self> {
        let gui = RustAutoGui::new(debug).map_err(|e| anyhow!("初始化鼠标控制失败: {e}"))?;
        Ok(Self { gui })
    }
}

impl PointerDevice for AutoGuiPointer {
    fn move_to(&mut self, x: f64, y: f64, duration: f32) -> Result<()> {
        self.gui
            .move_mouse_to_pos(x.max(0.0) as u32, y.max(0.0) as u32, duration)
            .map_err(|e| anyhow!("移动鼠标失败: {e}"))
    }

    fn click(&mut self) -> Result<()> {
        self.gui.left_click().map_err(|e| anyhow!("点击失败: {e}"))
    }
}

/// Pointer device plus the reset anchor.
pub struct PointerController {
    device: Box<dyn PointerDevice>,
    anchor: Point,
}

impl PointerController {
    pub fn new(device: Box<dyn PointerDevice>, anchor: Point) -> Self {
        Self { device, anchor }
    }

    pub fn move_to(&mut self, target: Point, duration: f32) -> Result<()> {
        debug!(
            "移动鼠标到 ({:.0}, {:.0})，持续时间 {} 秒",
            target.x, target.y, duration
        );
        self.device.move_to(target.x, target.y, duration)
    }

    pub fn click(&mut self) -> Result<()> {
        self.device.click()
    }

    /// Park the pointer at the anchor so it stays out of future captures.
    pub fn reset_cursor(&mut self) -> Result<()> {
        self.move_to(self.anchor, 0.5)
    }
}
