//! Structured logging for the Atlas viewer.
//!
//! Installs a `tracing` subscriber with a human-readable console layer and,
//! in debug builds, a JSON file layer. The level comes from `RUST_LOG` when
//! set, otherwise from the config's `debug.log_level`.

use std::fs::{self, File};
use std::path::Path;

use atlas_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Directives appended to every filter to keep the graphics stack quiet.
const BACKEND_DIRECTIVES: &str = "wgpu=warn,naga=warn";

/// File name of the JSON log inside the log directory.
pub const LOG_FILE_NAME: &str = "atlas.log";

/// Build the filter directive string for a config.
///
/// A bare level such as `"debug"` gets the backend directives appended. A
/// string that already contains per-target directives is used as written.
pub fn filter_directive(config: Option<&Config>) -> String {
    let level = config
        .map(|c| c.debug.log_level.trim())
        .filter(|l| !l.is_empty())
        .unwrap_or("info");

    if level.contains(',') || level.contains('=') {
        level.to_string()
    } else {
        format!("{level},{BACKEND_DIRECTIVES}")
    }
}

/// Open (truncating) the JSON log file, creating its directory first.
///
/// Returns `None` when the directory or file cannot be created; logging then
/// stays console-only.
pub fn open_log_file(log_dir: &Path) -> Option<File> {
    fs::create_dir_all(log_dir).ok()?;
    File::create(log_dir.join(LOG_FILE_NAME)).ok()
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `config.debug.log_level`. The JSON file
/// layer is attached only when `debug_build` is set and `log_dir` is usable.
///
/// ```no_run
/// use atlas_log::init_logging;
///
/// init_logging(None, false, None);
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let console = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_timer(fmt::time::uptime());

    let json = log_dir
        .filter(|_| debug_build)
        .and_then(open_log_file)
        .map(|file| {
            fmt::layer()
                .json()
                .with_writer(file)
                .with_ansi(false)
                .with_timer(fmt::time::uptime())
        });

    let file_logging = json.is_some();
    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(json)
        .init();
    tracing::debug!(file_logging, "Logging initialized");
}

/// Filter used when no config is available.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(filter_directive(None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        let filter_str = format!("{}", default_env_filter());
        assert!(filter_str.contains("wgpu=warn"));
        assert!(filter_str.contains("naga=warn"));
        assert!(filter_str.contains("info"));
    }

    #[test]
    fn test_bare_level_gets_backend_directives() {
        let mut config = Config::default();
        config.debug.log_level = "debug".to_string();
        assert_eq!(filter_directive(Some(&config)), "debug,wgpu=warn,naga=warn");
    }

    #[test]
    fn test_explicit_directives_are_kept() {
        let mut config = Config::default();
        config.debug.log_level = "warn,atlas_viewer=trace".to_string();
        assert_eq!(
            filter_directive(Some(&config)),
            "warn,atlas_viewer=trace",
            "per-target directives should be used verbatim"
        );
    }

    #[test]
    fn test_empty_level_falls_back_to_info() {
        let mut config = Config::default();
        config.debug.log_level = "  ".to_string();
        assert_eq!(filter_directive(Some(&config)), "info,wgpu=warn,naga=warn");
    }

    #[test]
    fn test_directives_parse_as_filters() {
        for level in ["info", "debug", "warn,atlas_render=trace", "error,atlas_canvas=debug"] {
            let mut config = Config::default();
            config.debug.log_level = level.to_string();
            let directive = filter_directive(Some(&config));
            assert!(
                EnvFilter::try_new(&directive).is_ok(),
                "directive {directive:?} should parse"
            );
        }
    }

    #[test]
    fn test_open_log_file_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("logs").join("today");
        assert!(open_log_file(&nested).is_some());
        assert!(nested.join(LOG_FILE_NAME).is_file());
    }
}
