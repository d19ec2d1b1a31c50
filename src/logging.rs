//! Logging configuration using the tracing framework
//!
//! Logs go to stderr so that `text` and `json` output on stdout stays clean.
//! Levels are controlled via the RUST_LOG environment variable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "blockchart=info,warn";
const VERBOSE_FILTER: &str = "blockchart=debug,warn";

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER })
    })
}

/// Initialize the logging system
///
/// # Environment Variables
///
/// - `RUST_LOG`: Controls log level (e.g., "debug", "info", "warn", "error")
///   - Default: "blockchart=info,warn" ("blockchart=debug,warn" with `--verbose`)
///   - Examples:
///     - `RUST_LOG=blockchart::aw_client=debug` - Debug logs for the API client only
pub fn init(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_line_number(true)
                .with_file(false),
        )
        .init();
}

/// Initialize logging with an additional daily-rotated log file
///
/// The file is created in the platform data directory under `logs/`,
/// falling back to the current directory.
pub fn init_with_file(log_file_name: &str, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};

    let log_dir = if let Some(proj_dirs) = crate::config::project_dirs() {
        let log_path = proj_dirs.data_dir().join("logs");
        std::fs::create_dir_all(&log_path)?;
        log_path
    } else {
        std::env::current_dir()?
    };

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, log_file_name);

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(file_appender).with_ansi(false))
        .init();

    Ok(())
}

/// Initialize logging for tests
#[allow(dead_code)]
pub fn init_test() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_test_writer())
        .try_init()
        .ok(); // Ignore errors if already initialized
}
