//! Command-line flags layered over the loaded config.

use std::path::PathBuf;

use clap::Parser;

use crate::{ActivationMode, Config, Theme};

/// Flags accepted by the `atlas-viewer` binary. Anything given here wins
/// over `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "atlas-viewer", about = "Adaptive 3D object viewer")]
pub struct CliArgs {
    #[arg(long, value_name = "PX")]
    pub width: Option<u32>,

    #[arg(long, value_name = "PX")]
    pub height: Option<u32>,

    /// Go straight to the 2D canvas view.
    #[arg(long)]
    pub fallback: bool,

    /// Do not wait for the window to become visible before activating.
    #[arg(long)]
    pub immediate: bool,

    /// `light` or `dark`; unknown names are ignored.
    #[arg(long)]
    pub theme: Option<String>,

    /// Fixes the mesh perturbation and star placement.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Level or filter directive, e.g. `debug` or `info,atlas_viewer=trace`.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Directory holding `config.ron` and `logs/`.
    #[arg(long, value_name = "DIR")]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Overlay the flags that were actually passed.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        self.window.width = args.width.unwrap_or(self.window.width);
        self.window.height = args.height.unwrap_or(self.window.height);
        self.viewer.force_fallback |= args.fallback;
        if args.immediate {
            self.viewer.activation = ActivationMode::Immediate;
        }
        if let Some(theme) = args.theme.as_deref().and_then(Theme::from_name) {
            self.theme.theme = theme;
        }
        self.viewer.seed = args.seed.or(self.viewer.seed);
        if let Some(level) = &args.log_level {
            self.debug.log_level.clone_from(level);
        }
    }
}
