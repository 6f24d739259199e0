//! Stage state machine.
//!
//! A stage is one recognizable screen of the target application. Each
//! stage knows the signature images that identify it and how to drive the
//! application forward while that screen is showing. The registry is an
//! explicit fixed-order list; registration order is the only tie-break
//! when two stages' signatures both match a frame.

use anyhow::Result;
use log::debug;

use stagebot_core::CheckPair;
use stagebot_cv::AssetLibrary;

use crate::engine::Engine;

mod before_fight;
mod drive;
mod fight;
mod launch;
mod window;

pub use before_fight::BeforeFightStage;
pub use drive::DriveStage;
pub use fight::FightStage;
pub use launch::LaunchStage;
pub use window::WindowStage;

/// A distinct recognizable screen/phase of the target application.
pub trait Stage {
    /// Stable identity; registry dedup key and recognition payload.
    fn id(&self) -> &'static str;

    /// Display name for logging.
    fn name(&self) -> &str;

    /// Signature pairs identifying this stage on the current screen.
    /// Every pair's payload is the stage id.
    fn determine_pairs(&self, assets: &AssetLibrary) -> Result<Vec<CheckPair<String>>>;

    /// Drive the application through this stage to completion.
    fn proceed(&mut self, engine: &mut Engine) -> Result<()>;

    /// Cleanup hook, invoked after every `proceed`.
    fn exit(&mut self) {}
}

/// Process-wide ordered collection of stage instances, deduplicated by id.
pub struct StageRegistry {
    stages: Vec<Box<dyn Stage>>,
}

impl StageRegistry {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Every known stage, constructed once, in a fixed order.
    pub fn bootstrap() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(LaunchStage::new()));
        registry.register(Box::new(WindowStage::new()));
        registry.register(Box::new(DriveStage::new()));
        registry.register(Box::new(BeforeFightStage::new()));
        registry.register(Box::new(FightStage::new()));
        registry
    }

    /// Register a stage; a duplicate id is skipped, not replaced.
    pub fn register(&mut self, stage: Box<dyn Stage>) {
        if self.stages.iter().any(|s| s.id() == stage.id()) {
            debug!("阶段 {} 已注册，跳过", stage.id());
            return;
        }
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Stage> {
        self.stages.iter().map(|s| s.as_ref())
    }

    pub fn get(&self, id: &str) -> Option<&dyn Stage> {
        self.stages.iter().find(|s| s.id() == id).map(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Box<dyn Stage>> {
        self.stages.iter_mut().find(|s| s.id() == id)
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::new()
    }
}
