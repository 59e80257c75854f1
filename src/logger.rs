/// Tag-based structured logging for the data layer
///
/// Levels are ordered by severity (Error < Warning < Info < Debug < Verbose)
/// and filtered against a process-wide minimum threshold. Errors are always
/// shown. Output is colorized with an aligned `[TAG] [LEVEL]` prefix so logs
/// from the cache, the providers, and the fallback chains line up when
/// interleaved.
///
/// Call `logger::init(LogLevel::Info)` once at startup (main.rs), then:
///
/// ```rust
/// use vendorboard::logger::{self, LogTag};
///
/// logger::info(LogTag::Cache, "Cache initialized");
/// logger::warning(LogTag::Chain, "warehouse gave no answer for contractor:ACME-001:profile");
/// ```
use chrono::Local;
use colored::*;
use once_cell::sync::Lazy;
use std::sync::RwLock;

/// Subsystem tag attached to every log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    System,
    Config,
    Cache,
    Provider,
    Chain,
    Orchestrator,
}

impl LogTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Config => "CONFIG",
            LogTag::Cache => "CACHE",
            LogTag::Provider => "PROVIDER",
            LogTag::Chain => "CHAIN",
            LogTag::Orchestrator => "ORCH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,   // Critical errors, always shown
    Warning = 1, // Important issues that need attention
    Info = 2,    // Standard operational messages (default)
    Debug = 3,   // Detailed diagnostic info
    Verbose = 4, // Very detailed trace info
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Verbose => "VERBOSE",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ERROR" => Some(LogLevel::Error),
            "WARNING" | "WARN" => Some(LogLevel::Warning),
            "INFO" => Some(LogLevel::Info),
            "DEBUG" => Some(LogLevel::Debug),
            "VERBOSE" | "TRACE" => Some(LogLevel::Verbose),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

struct LoggerConfig {
    min_level: LogLevel,
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> = Lazy::new(|| {
    RwLock::new(LoggerConfig {
        min_level: LogLevel::Info,
    })
});

/// Set the minimum log level. Call once at startup.
pub fn init(min_level: LogLevel) {
    if let Ok(mut config) = LOGGER_CONFIG.write() {
        config.min_level = min_level;
    }
}

fn should_log(level: LogLevel) -> bool {
    // Errors always log (critical)
    if level == LogLevel::Error {
        return true;
    }

    match LOGGER_CONFIG.read() {
        Ok(config) => level <= config.min_level,
        Err(_) => level <= LogLevel::Info,
    }
}

/// Log at ERROR level (always shown, critical issues)
pub fn error(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (important issues)
pub fn warning(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level (detailed diagnostics, gated by verbosity)
pub fn debug(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (trace detail, gated by verbosity)
pub fn verbose(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Verbose, message);
}

const TAG_WIDTH: usize = 8;
const LEVEL_WIDTH: usize = 7;

fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if !should_log(level) {
        return;
    }

    let time = Local::now().format("%H:%M:%S").to_string();

    let tag_str = format!("{:<width$}", tag.as_str(), width = TAG_WIDTH);
    let tag_str = match tag {
        LogTag::System => tag_str.cyan(),
        LogTag::Config => tag_str.magenta(),
        LogTag::Cache => tag_str.green(),
        LogTag::Provider => tag_str.blue(),
        LogTag::Chain => tag_str.yellow(),
        LogTag::Orchestrator => tag_str.bright_blue(),
    };

    let level_str = format!("{:<width$}", level.as_str(), width = LEVEL_WIDTH);
    let level_str = match level {
        LogLevel::Error => level_str.red().bold(),
        LogLevel::Warning => level_str.yellow(),
        LogLevel::Info => level_str.normal(),
        LogLevel::Debug => level_str.dimmed(),
        LogLevel::Verbose => level_str.dimmed(),
    };

    let line = format!(
        "{} [{}] [{}] {}",
        time.dimmed(),
        tag_str,
        level_str,
        message
    );

    if level == LogLevel::Error {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Verbose);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!(LogLevel::parse("warn"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::parse("TRACE"), Some(LogLevel::Verbose));
        assert_eq!(LogLevel::parse("nope"), None);
    }
}
