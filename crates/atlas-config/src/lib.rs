//! Configuration system for the Atlas viewer.
//!
//! Settings persist to disk as a RON file and can be overridden from the
//! command line. Every section carries defaults, so partial or older files
//! still load.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    ActivationMode, Config, DebugConfig, RenderConfig, Theme, ThemeConfig, ViewerConfig,
    WindowConfig, default_config_dir,
};
pub use error::ConfigError;
