//! Launch screen: client boot, update download, login.

use anyhow::Result;

use stagebot_core::{Action, CheckPair};
use stagebot_cv::AssetLibrary;

use super::Stage;
use crate::engine::Engine;

#[derive(Default)]
pub struct LaunchStage;

impl LaunchStage {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for LaunchStage {
    fn id(&self) -> &'static str {
        "stage.launch"
    }

    fn name(&self) -> &str {
        "启动屏幕"
    }

    fn determine_pairs(&self, assets: &AssetLibrary) -> Result<Vec<CheckPair<String>>> {
        Ok(vec![
            CheckPair::new("启动页面", assets.load("launch", "cache")?)
                .with_actions(vec![Action::Return])
                .with_returns(self.id().to_string()),
        ])
    }

    fn proceed(&mut self, engine: &mut Engine) -> Result<()> {
        let banner = engine.assets().load("launch", "banner")?;
        let confirm = engine.assets().load("launch", "confirm")?;
        let combat_tips = engine.assets().load("general", "combat_tips")?;
        let opts = engine.poll_options();

        engine.check_and_wait::<()>(
            vec![
                CheckPair::new("启动横幅", banner)
                    .with_actions(vec![Action::ClickIt, Action::Return]),
            ],
            opts,
        )?;
        engine.check_and_wait::<()>(
            vec![
                CheckPair::new("更新确认按钮", confirm)
                    .with_actions(vec![Action::ClickIt])
                    .with_log("存在未下载的更新，点击确认"),
                CheckPair::new("登入完成", combat_tips)
                    .with_actions(vec![Action::Return])
                    .with_log("已完成登入"),
            ],
            opts,
        )?;
        Ok(())
    }
}
