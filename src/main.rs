//! Bombz terminal runner (default binary).
//!
//! The render loop runs on the main thread, the current screen on a logic
//! thread and terminal input on a third. Logging goes nowhere useful while
//! the alternate screen is up, so set `BOMBZ_LOG_PATH` to capture it.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info};

use bombz::engine::{Application, EngineConfig, Settings};
use bombz::game::{BuiltinPlatform, MenuScreen, ScreenHub, N_LEVELS};
use bombz::input::InputPump;
use bombz::term::TermRenderContext;

fn init_logging(config: &EngineConfig) -> Result<()> {
    let default_filter = if config.log_path.is_some() { "info" } else { "error" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    builder.format_timestamp_micros();
    if let Some(path) = &config.log_path {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> Result<()> {
    let config = EngineConfig::from_env();
    init_logging(&config)?;
    info!("bombz: starting with {:?}", config);

    let settings = Settings::load(config.settings_path.clone())
        .with_context(|| format!("failed to load {}", config.settings_path.display()))?;
    let profile_dir = config
        .settings_path
        .parent()
        .map_or_else(|| PathBuf::from("."), PathBuf::from);
    let platform = Arc::new(BuiltinPlatform::new(profile_dir));
    let hub = ScreenHub::new(platform, config, settings, N_LEVELS);

    let app = Application::new("bombz");
    app.set_screen(MenuScreen::main(Arc::clone(&hub)));

    let mut rc = TermRenderContext::new().context("failed to set up the terminal")?;
    let input = InputPump::new(Arc::clone(&app))
        .spawn()
        .context("failed to spawn input thread")?;

    let result = app.start(&mut rc);

    // The input thread watches the stop flag.
    app.stop();
    if input.join().is_err() {
        error!("bombz: input thread panicked");
    }
    hub.commit_settings();
    rc.shutdown().context("failed to restore the terminal")?;

    result.context("bombz stopped with an error")?;
    info!("bombz: bye");
    Ok(())
}
