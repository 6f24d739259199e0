use anyhow::Result;
use log::{LevelFilter, info};

use stagebot::config::BotConfig;
use stagebot::engine::{Engine, EngineDefaults};
use stagebot::orchestrator::Orchestrator;
use stagebot::pointer::{AutoGuiPointer, PointerController};
use stagebot::stages::StageRegistry;
use stagebot_cv::{AssetLibrary, LiveScreen, Matcher};

const LOGO: &str = r"
     _                   _           _
 ___| |_ __ _  __ _  ___| |__   ___ | |_
/ __| __/ _` |/ _` |/ _ \ '_ \ / _ \| __|
\__ \ || (_| | (_| |  __/ |_) | (_) | |_
|___/\__\__,_|\__, |\___|_.__/ \___/ \__|
              |___/
";

fn main() -> Result<()> {
    let config = BotConfig::load();
    let level = if config.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    stagebot_core::logger::init_with_level(level)?;
    info!("{LOGO}");

    let screen = LiveScreen::primary()?;
    let pointer = PointerController::new(
        Box::new(AutoGuiPointer::new(config.debug)?),
        config.anchor(),
    );
    let assets = AssetLibrary::new(config.assets_dir.clone());
    let defaults = EngineDefaults {
        poll: config.poll_options(),
        click: config.click_options(),
    };
    let engine = Engine::new(
        Matcher::default(),
        Box::new(screen),
        pointer,
        assets,
        defaults,
    );

    let registry = StageRegistry::bootstrap();
    info!("已注册 {} 个阶段", registry.len());

    Orchestrator::new(registry, engine).run()
}
