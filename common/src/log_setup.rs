use std::path::Path;
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Where and how verbosely a binary logs.
#[derive(Debug, Clone)]
pub struct LogConfig<'a> {
    /// Filter used when `RUST_LOG` is not set, e.g. `"info"` or `"panorama=debug"`.
    pub base_level: &'a str,
    /// Directory for the rolling log files.
    pub directory: &'a Path,
    /// File name prefix of the rolling log files.
    pub file_prefix: &'a str,
    /// Number of daily files kept before the oldest is removed.
    pub max_files: usize,
}

impl Default for LogConfig<'_> {
    fn default() -> Self {
        Self {
            base_level: "info",
            directory: Path::new("logs"),
            file_prefix: "panorama",
            max_files: 5,
        }
    }
}

/// Console + rolling file logging with the default [`LogConfig`] and the given level.
pub fn setup_logging(base_level: &str) {
    setup_logging_with(&LogConfig {
        base_level,
        ..LogConfig::default()
    });
}

pub fn setup_logging_with(config: &LogConfig<'_>) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.base_level))
        .unwrap_or_else(|e| panic!("Invalid log filter: {}", e));

    std::fs::create_dir_all(config.directory)
        .unwrap_or_else(|e| panic!("Failed to create logs directory: {}", e));

    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix(config.file_prefix)
        .filename_suffix("log")
        .max_log_files(config.max_files)
        .build(config.directory)
        .unwrap_or_else(|e| panic!("Failed to create log file appender: {}", e));

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    LOG_GUARD.set(guard).expect("Logging already initialized");

    let console_writer = std::io::stdout.and(std::io::stderr.with_min_level(Level::WARN));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true)
        .with_writer(console_writer);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .unwrap_or_else(|e| panic!("Logger initialization failed: {}", e));
}

/// Test-friendly subscriber writing through the libtest capture.
///
/// Safe to call from every test; only the first call installs the subscriber.
/// Respects `RUST_LOG`, defaulting to `info`.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
