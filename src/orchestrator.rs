//! Top-level driver.
//!
//! Forever: recognize which stage the application is in, let that stage
//! drive the application forward, run its exit hook, repeat. A process
//! restart re-detects the current screen from scratch; there is no
//! persisted cross-run state.

use anyhow::{Context, Result};
use log::info;

use crate::engine::Engine;
use crate::stages::StageRegistry;

pub struct Orchestrator {
    registry: StageRegistry,
    engine: Engine,
}

impl Orchestrator {
    pub fn new(registry: StageRegistry, engine: Engine) -> Self {
        Self { registry, engine }
    }

    /// Poll the union of every registered stage's signature pairs until one
    /// matches; return the recognized stage's id.
    ///
    /// Signatures of different stages are assumed visually disjoint by
    /// construction; registration order is the only tie-break and nothing
    /// enforces disjointness at runtime.
    pub fn determine_stage(&mut self) -> Result<String> {
        let mut pairs = Vec::new();
        for stage in self.registry.iter() {
            pairs.extend(stage.determine_pairs(self.engine.assets())?);
        }

        let opts = self.engine.poll_options();
        let (_, id) = self.engine.check_and_wait(pairs, opts)?;
        let id = id.context("识别循环在未返回任何阶段的情况下结束")?;

        let stage = self
            .registry
            .get(&id)
            .with_context(|| format!("未注册的阶段 {id}"))?;
        info!("已检测到当前阶段：{}", stage.name());
        Ok(id)
    }

    /// One recognize-proceed-exit cycle.
    pub fn step(&mut self) -> Result<()> {
        let id = self.determine_stage()?;
        let stage = self
            .registry
            .get_mut(&id)
            .with_context(|| format!("未注册的阶段 {id}"))?;
        stage.proceed(&mut self.engine)?;
        info!("阶段 {} 已完成", stage.name());
        stage.exit();
        Ok(())
    }

    /// The main loop. Never terminates on its own; any error propagates
    /// out and kills the process through `main`.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.step()?;
        }
    }
}
