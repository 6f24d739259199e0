//! Window: the main hub screen.
//!
//! Recognized whether or not the Drive tab is highlighted, hence two
//! signature pairs with the same payload.

use anyhow::Result;

use stagebot_core::{Action, CheckPair};
use stagebot_cv::AssetLibrary;

use super::Stage;
use crate::engine::Engine;

#[derive(Default)]
pub struct WindowStage {
    assembled_enk_module: bool,
}

impl WindowStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-time assembly of the Enk Module after login.
    fn assemble_enk_module(&mut self, engine: &mut Engine) -> Result<()> {
        let module = engine.assets().load("main", "enk_module")?;
        let cancel = engine.assets().load("main", "enk_cancel")?;
        let max = engine.assets().load("main", "enk_max")?;
        let confirm = engine.assets().load("main", "enk_confirm")?;
        let opts = engine.poll_options();

        engine.check_and_wait::<()>(
            vec![
                CheckPair::new("Enk Module 入口", module)
                    .with_actions(vec![Action::ClickIt, Action::Return]),
            ],
            opts,
        )?;
        let (_, filled) = engine.check_and_wait(
            vec![
                CheckPair::new("拉满组装 Enk Module", max)
                    .with_actions(vec![Action::ClickIt, Action::Return])
                    .with_returns(true),
                CheckPair::new("Enk Module 回落", cancel.clone())
                    .with_actions(vec![Action::ClickIt, Action::Return])
                    .with_returns(false),
            ],
            opts,
        )?;
        if !filled.unwrap_or(false) {
            return Ok(());
        }
        engine.check_and_wait::<()>(
            vec![
                CheckPair::new("组装 Enk Module", confirm)
                    .with_actions(vec![Action::ClickIt, Action::Return]),
            ],
            opts,
        )?;
        engine.check_and_wait::<()>(
            vec![
                CheckPair::new("返回 Window", cancel)
                    .with_actions(vec![Action::ClickIt, Action::Return]),
            ],
            opts,
        )?;
        self.assembled_enk_module = true;
        Ok(())
    }
}

impl Stage for WindowStage {
    fn id(&self) -> &'static str {
        "stage.window"
    }

    fn name(&self) -> &str {
        "Window"
    }

    fn determine_pairs(&self, assets: &AssetLibrary) -> Result<Vec<CheckPair<String>>> {
        Ok(vec![
            CheckPair::new("Window", assets.load("main", "drive_unselected")?)
                .with_actions(vec![Action::Return])
                .with_returns(self.id().to_string()),
            CheckPair::new("Window", assets.load("main", "drive_selected")?)
                .with_actions(vec![Action::Return])
                .with_returns(self.id().to_string()),
        ])
    }

    fn proceed(&mut self, engine: &mut Engine) -> Result<()> {
        if !self.assembled_enk_module {
            self.assemble_enk_module(engine)?;
        }
        Ok(())
    }
}
