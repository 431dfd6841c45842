use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;

use nautilus::app::NautilusApp;
use nautilus::config::{AppConfig, Cli};
use nautilus::state::AppState;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    config.apply_cli(&cli);
    let load_options = config.load_options()?;

    let mut state = AppState::new(load_options, config.filters.null_casualties);
    if let Some(path) = &config.data.path {
        state.open(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Nautilus – Maritime Incidents",
        options,
        Box::new(|_cc| Ok(Box::new(NautilusApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard: {e}"))
}
