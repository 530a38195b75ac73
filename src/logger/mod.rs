//! Tagged logging for the title server
//!
//! Thin wrapper over the `log` facade with per-subsystem tags, dispatched by
//! `fern` to a colored console output and a dated log file. Log files older
//! than 30 days are removed at startup.
//!
//! ```rust,ignore
//! logger::info(LogTag::Cache, "channels cache invalidated");
//! ```

use std::path::Path;
use std::time::Duration;

use colored::Colorize;

/// Retention window for dated log files
const LOG_RETENTION: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Subsystem tag prepended to every log line
#[derive(Debug, Clone, Copy)]
pub enum LogTag {
    System,
    Cache,
    Database,
    Http,
}

impl LogTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Cache => "CACHE",
            LogTag::Database => "DATABASE",
            LogTag::Http => "HTTP",
        }
    }
}

/// Initialize the logger system
///
/// Must be called once at startup before any logging occurs. Sets up the
/// console and file outputs and prunes old log files.
pub fn init(log_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(log_dir)?;
    clean_old_logs(log_dir);

    let log_file_path = log_dir.join(format!(
        "{}.log",
        chrono::Local::now().format("%Y-%m-%d")
    ));

    let console = fern::Dispatch::new()
        .format(|out, message, record| {
            let level = match record.level() {
                log::Level::Error => "ERROR".red().bold().to_string(),
                log::Level::Warn => "WARN".yellow().to_string(),
                log::Level::Info => "INFO".green().to_string(),
                log::Level::Debug => "DEBUG".blue().to_string(),
                log::Level::Trace => "TRACE".dimmed().to_string(),
            };
            out.finish(format_args!(
                "{} {} {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                level,
                message
            ))
        })
        .chain(std::io::stdout());

    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {} {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%z"),
                record.level(),
                message
            ))
        })
        .chain(fern::log_file(log_file_path)?);

    fern::Dispatch::new()
        .level(log::LevelFilter::Debug)
        .chain(console)
        .chain(file)
        .apply()?;

    Ok(())
}

/// Remove log files older than the retention window
fn clean_old_logs(log_dir: &Path) {
    let Ok(entries) = std::fs::read_dir(log_dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map_or(true, |ext| ext != "log") {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let expired = metadata
            .modified()
            .ok()
            .and_then(|modified| modified.elapsed().ok())
            .map_or(false, |age| age > LOG_RETENTION);
        if expired {
            if let Err(e) = std::fs::remove_file(&path) {
                eprintln!("failed to remove old log file {}: {}", path.display(), e);
            }
        }
    }
}

/// Log at ERROR level (critical failures)
pub fn error(tag: LogTag, message: &str) {
    log::error!("[{}] {}", tag.as_str(), message);
}

/// Log at WARNING level (needs attention, not critical)
pub fn warning(tag: LogTag, message: &str) {
    log::warn!("[{}] {}", tag.as_str(), message);
}

/// Log at INFO level (normal operation)
pub fn info(tag: LogTag, message: &str) {
    log::info!("[{}] {}", tag.as_str(), message);
}

/// Log at DEBUG level (detailed diagnostics)
pub fn debug(tag: LogTag, message: &str) {
    log::debug!("[{}] {}", tag.as_str(), message);
}
