//! Drive: mission selection under the Drive tab.

use anyhow::Result;

use stagebot_core::{Action, CheckPair, rightmost};
use stagebot_cv::AssetLibrary;

use super::Stage;
use crate::engine::Engine;

#[derive(Default)]
pub struct DriveStage {
    finished_lux: bool,
}

impl DriveStage {
    pub fn new() -> Self {
        Self::default()
    }

    fn proceed_lux(&mut self, engine: &mut Engine) -> Result<()> {
        let lux = engine.assets().load("drive", "lux")?;
        let opts = engine.poll_options();
        engine.check_and_wait::<()>(
            vec![
                CheckPair::new("进入作战", lux).with_actions(vec![Action::ClickIt, Action::Return]),
            ],
            opts,
        )?;
        self.finished_lux = true;
        Ok(())
    }
}

impl Stage for DriveStage {
    fn id(&self) -> &'static str {
        "stage.drive"
    }

    fn name(&self) -> &str {
        "Drive"
    }

    fn determine_pairs(&self, assets: &AssetLibrary) -> Result<Vec<CheckPair<String>>> {
        Ok(vec![
            CheckPair::new("Drive", assets.load("main", "drive_selected")?)
                .with_actions(vec![Action::Return])
                .with_returns(self.id().to_string()),
        ])
    }

    fn proceed(&mut self, engine: &mut Engine) -> Result<()> {
        if !self.finished_lux {
            self.proceed_lux(engine)?;
        }
        let enter = engine.assets().load("drive", "enter")?;
        // several mission entries can be on screen; take the rightmost one
        let opts = engine.poll_options().with_result_filter(rightmost);
        engine.check_and_wait::<()>(
            vec![
                CheckPair::new("进入作战", enter)
                    .with_actions(vec![Action::ClickIt, Action::Return]),
            ],
            opts,
        )?;
        Ok(())
    }
}
