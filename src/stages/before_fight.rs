//! Before-fight: team editing screen ahead of a battle.

use anyhow::Result;

use stagebot_core::{Action, CheckPair};
use stagebot_cv::AssetLibrary;

use super::Stage;
use crate::engine::Engine;

#[derive(Default)]
pub struct BeforeFightStage;

impl BeforeFightStage {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for BeforeFightStage {
    fn id(&self) -> &'static str {
        "stage.before_drive"
    }

    fn name(&self) -> &str {
        "作战前"
    }

    fn determine_pairs(&self, assets: &AssetLibrary) -> Result<Vec<CheckPair<String>>> {
        Ok(vec![
            CheckPair::new("作战前", assets.load("fight", "edit_team")?)
                .with_actions(vec![Action::Return])
                .with_returns(self.id().to_string()),
        ])
    }

    fn proceed(&mut self, engine: &mut Engine) -> Result<()> {
        let to_battle = engine.assets().load("fight", "to_battle")?;
        let opts = engine.poll_options();
        engine.check_and_wait::<()>(
            vec![
                CheckPair::new("开始作战", to_battle)
                    .with_actions(vec![Action::ClickIt, Action::Return]),
            ],
            opts,
        )?;
        Ok(())
    }
}
