use clap::ValueEnum;
use rhizaman_core::constants::APP_NAME;
use std::path::PathBuf;

/// Level written to the log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => Self::Off,
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}

/// `rhizaman.log` under `$XDG_CACHE_HOME/rhizaman`, falling back to the
/// platform cache directory.
pub fn log_file() -> PathBuf {
    std::env::var_os("XDG_CACHE_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::cache_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_NAME)
        .join(format!("{APP_NAME}.log"))
}

/// Route `log` output to [`log_file`]; the terminal belongs to the dashboard.
/// Returns the file in use, or `None` when logging is off and nothing was created.
pub fn init(level: LogLevel) -> anyhow::Result<Option<PathBuf>> {
    if level == LogLevel::Off {
        return Ok(None);
    }
    let path = log_file();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    simple_log::file(path.to_string_lossy().into_owned(), log::LevelFilter::from(level), 10, 10)
        .map_err(|e| anyhow::anyhow!(e))?;
    log::info!("{APP_NAME} {} started (level={level:?})", env!("CARGO_PKG_VERSION"));
    Ok(Some(path))
}
