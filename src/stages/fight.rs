//! Fight: the battle loop.
//!
//! Alternates "is the battle label or the reward screen showing" with the
//! win-rate/start click sequence, counting one round per label sighting,
//! until the reward screen ends the battle.

use anyhow::Result;
use log::info;

use stagebot_core::{Action, CheckPair};
use stagebot_cv::AssetLibrary;

use super::Stage;
use crate::engine::Engine;

#[derive(Default)]
pub struct FightStage {
    turn: u32,
}

impl FightStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rounds seen during the most recent `proceed`.
    pub fn rounds(&self) -> u32 {
        self.turn
    }
}

impl Stage for FightStage {
    fn id(&self) -> &'static str {
        "stage.fight"
    }

    fn name(&self) -> &str {
        "作战中"
    }

    fn determine_pairs(&self, assets: &AssetLibrary) -> Result<Vec<CheckPair<String>>> {
        Ok(vec![
            CheckPair::new("作战", assets.load("fight", "label")?)
                .with_actions(vec![Action::Return])
                .with_returns(self.id().to_string()),
        ])
    }

    fn proceed(&mut self, engine: &mut Engine) -> Result<()> {
        let win_rate = engine.assets().load("fight", "win_rate")?;
        let start = engine.assets().load("fight", "start")?;
        let label = engine.assets().load("fight", "label")?;
        let reward = engine.assets().load("fight", "reward")?;
        let confirm = engine.assets().load("fight", "confirm")?;
        let opts = engine.poll_options();

        self.turn = 0;
        loop {
            let (_, finished) = engine.check_and_wait(
                vec![
                    CheckPair::new("作战标签", label.clone())
                        .with_actions(vec![Action::Return])
                        .with_returns(false),
                    CheckPair::new("战利品", reward.clone())
                        .with_actions(vec![Action::Return])
                        .with_returns(true),
                ],
                opts,
            )?;
            if finished.unwrap_or(false) {
                info!("作战完毕，一共 {} 轮", self.turn);
                break;
            }
            self.turn += 1;
            engine.check_and_wait::<()>(
                vec![
                    CheckPair::new("胜率", win_rate.clone())
                        .with_actions(vec![Action::ClickIt, Action::Return]),
                ],
                opts,
            )?;
            engine.check_and_wait::<()>(
                vec![
                    CheckPair::new("开始", start.clone())
                        .with_actions(vec![Action::ClickIt, Action::Return]),
                    CheckPair::new("胜率", win_rate.clone())
                        .with_actions(vec![Action::ClickIt]),
                ],
                opts,
            )?;
        }

        engine.check_and_wait::<()>(
            vec![
                CheckPair::new("确认", confirm)
                    .with_actions(vec![Action::ClickIt, Action::Return]),
            ],
            opts,
        )?;
        Ok(())
    }
}
