//! The binary entry point for the Atlas viewer.

use atlas_config::{CliArgs, Config, default_config_dir};
use atlas_app::window::ConfigSource;
use clap::Parser;

fn main() {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(default_config_dir)
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    let on_disk = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    let mut config = on_disk.clone();
    config.apply_cli_overrides(&args);
    if let Err(e) = config.validate() {
        eprintln!("{e}, using defaults");
        config = Config::default();
    }

    let log_dir = config_dir.join("logs");
    atlas_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    tracing::info!(
        "Starting Atlas viewer {}x{} (fallback forced: {}, activation: {:?})",
        config.window.width,
        config.window.height,
        config.viewer.force_fallback,
        config.viewer.activation
    );

    let source = ConfigSource {
        dir: config_dir,
        on_disk,
    };
    atlas_app::window::run_with_config(config, Some(source));
}
