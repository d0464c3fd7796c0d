use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::config::schema::LoggingConfig;
use crate::utils::{ensure_dir, expand_tilde};

const LOG_FILE_PREFIX: &str = "soulbot.log";
const LOG_RETENTION_DAYS: u64 = 7;

/// Initialize the logging system
///
/// Console output goes to stderr so it never interleaves with chat replies
/// printed on stdout. When the log directory cannot be created, logging
/// continues on the console only and `None` is returned. Otherwise the
/// returned guard must be held for the life of the process or buffered file
/// output is lost.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| config.level.clone());

    let mut filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&log_level_str));

    for (module, level) in &config.overrides {
        if let Ok(directive) = format!("{}={}", module, level).parse() {
            filter = filter.add_directive(directive);
        } else {
            eprintln!("Invalid log directive: {}={}", module, level);
        }
    }

    let format_str = std::env::var("LOG_FORMAT").unwrap_or_else(|_| config.format.clone());
    let is_json = format_str.eq_ignore_ascii_case("json");

    let log_dir = match ensure_dir(expand_tilde(&config.dir)) {
        Ok(dir) => Some(dir),
        Err(e) => {
            eprintln!("Log directory {} unavailable, file logging disabled: {}", config.dir, e);
            None
        }
    };

    let console_layer = if is_json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    // rolling::daily(dir, "soulbot.log") writes soulbot.log.YYYY-MM-DD
    let (file_layer, guard) = match &log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = if is_json {
                fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(false)
                    .boxed()
            } else {
                fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .boxed()
            };
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // try_init: tests and embedders may have installed a subscriber already
    let _ = Registry::default()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    if let Some(dir) = &log_dir {
        if let Err(e) = cleanup_old_logs(dir, LOG_RETENTION_DAYS) {
            eprintln!("Failed to clean up old logs: {}", e);
        }
    }

    guard
}

/// Remove log files older than `days` days
fn cleanup_old_logs(dir: &Path, days: u64) -> std::io::Result<()> {
    if !dir.exists() {
        return Ok(());
    }

    let now = std::time::SystemTime::now();
    let threshold = std::time::Duration::from_secs(days * 24 * 3600);

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX));
        if !is_log {
            continue;
        }

        let age = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok());
        if matches!(age, Some(age) if age > threshold) {
            if let Err(e) = std::fs::remove_file(&path) {
                eprintln!("Failed to remove old log file {:?}: {}", path, e);
            }
        }
    }
    Ok(())
}
