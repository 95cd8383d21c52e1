use derive_more::Display;
use std::sync::OnceLock;

/// Log levels, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum LogLevel {
    #[display(fmt = "TRACE")]
    Trace = 0,
    #[display(fmt = "DEBUG")]
    Debug = 1,
    #[display(fmt = " INFO")]
    Info = 2,
    #[display(fmt = " WARN")]
    Warn = 3,
    #[display(fmt = "ERROR")]
    Error = 4,
}

/// Layer plus sub-component that emitted an entry.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum LogComponent {
    #[display(fmt = "DOM:{}", _0)]
    Domain(&'static str),
    #[display(fmt = "APP:{}", _0)]
    Application(&'static str),
    #[display(fmt = "INF:{}", _0)]
    Infrastructure(&'static str),
    #[display(fmt = "PRE:{}", _0)]
    Presentation(&'static str),
}

/// Structured log entry.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: u64,
    pub level: LogLevel,
    pub component: LogComponent,
    pub message: String,
    pub metadata: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, component: LogComponent, message: &str) -> Self {
        Self {
            timestamp: get_time_provider().current_timestamp(),
            level,
            component,
            message: message.to_string(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: &str) -> Self {
        self.metadata = Some(metadata.to_string());
        self
    }

    /// Single-line rendering shared by the console and test loggers.
    pub fn format_line(&self) -> String {
        let timestamp = get_time_provider().format_timestamp(self.timestamp);
        match &self.metadata {
            Some(metadata) => format!(
                "[{}] {} {} | {} | {}",
                timestamp, self.level, self.component, self.message, metadata
            ),
            None => format!("[{}] {} {} | {}", timestamp, self.level, self.component, self.message),
        }
    }
}

/// Source of timestamps for log entries.
pub trait TimeProvider: Send + Sync {
    fn current_timestamp(&self) -> u64;
    fn format_timestamp(&self, timestamp: u64) -> String;
}

/// Sink for structured log entries.
pub trait Logger: Send + Sync {
    fn log(&self, entry: LogEntry);

    /// Entries below this level are dropped before formatting.
    fn min_level(&self) -> LogLevel {
        LogLevel::Trace
    }

    fn emit(&self, level: LogLevel, component: LogComponent, message: &str) {
        if level >= self.min_level() {
            self.log(LogEntry::new(level, component, message));
        }
    }

    fn trace(&self, component: LogComponent, message: &str) {
        self.emit(LogLevel::Trace, component, message);
    }

    fn debug(&self, component: LogComponent, message: &str) {
        self.emit(LogLevel::Debug, component, message);
    }

    fn info(&self, component: LogComponent, message: &str) {
        self.emit(LogLevel::Info, component, message);
    }

    fn warn(&self, component: LogComponent, message: &str) {
        self.emit(LogLevel::Warn, component, message);
    }

    fn error(&self, component: LogComponent, message: &str) {
        self.emit(LogLevel::Error, component, message);
    }

    fn log_with_metadata(&self, level: LogLevel, component: LogComponent, message: &str, metadata: &str) {
        if level >= self.min_level() {
            self.log(LogEntry::new(level, component, message).with_metadata(metadata));
        }
    }
}

static GLOBAL_LOGGER: OnceLock<Box<dyn Logger>> = OnceLock::new();
static GLOBAL_TIME_PROVIDER: OnceLock<Box<dyn TimeProvider>> = OnceLock::new();

/// Install the process-wide logger. Later calls are ignored.
pub fn init_logger(logger: Box<dyn Logger>) {
    let _ = GLOBAL_LOGGER.set(logger);
}

/// Install the process-wide time provider. Later calls are ignored.
pub fn init_time_provider(time_provider: Box<dyn TimeProvider>) {
    let _ = GLOBAL_TIME_PROVIDER.set(time_provider);
}

pub fn get_logger() -> &'static dyn Logger {
    GLOBAL_LOGGER.get().map(|logger| logger.as_ref()).unwrap_or(&NoOpLogger)
}

pub fn get_time_provider() -> &'static dyn TimeProvider {
    GLOBAL_TIME_PROVIDER
        .get()
        .map(|provider| provider.as_ref())
        .unwrap_or(&SequenceTimeProvider)
}

struct NoOpLogger;

impl Logger for NoOpLogger {
    fn log(&self, _entry: LogEntry) {}

    fn min_level(&self) -> LogLevel {
        LogLevel::Error
    }
}

/// Fallback used before a real clock is installed (and in native tests).
struct SequenceTimeProvider;

impl TimeProvider for SequenceTimeProvider {
    fn current_timestamp(&self) -> u64 {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        COUNTER.fetch_add(1, Ordering::Relaxed)
    }

    fn format_timestamp(&self, timestamp: u64) -> String {
        format!("#{timestamp:06}")
    }
}

#[macro_export]
macro_rules! log_trace {
    ($component:expr, $($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            $crate::domain::logging::get_logger().trace($component, &format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! log_debug {
    ($component:expr, $($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            $crate::domain::logging::get_logger().debug($component, &format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($component:expr, $($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            $crate::domain::logging::get_logger().info($component, &format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($component:expr, $($arg:tt)*) => {
        $crate::domain::logging::get_logger().warn($component, &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_error {
    ($component:expr, $($arg:tt)*) => {
        $crate::domain::logging::get_logger().error($component, &format!($($arg)*));
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Capture {
        lines: Mutex<Vec<String>>,
    }

    impl Logger for Capture {
        fn log(&self, entry: LogEntry) {
            self.lines.lock().unwrap().push(entry.format_line());
        }

        fn min_level(&self) -> LogLevel {
            LogLevel::Info
        }
    }

    #[test]
    fn min_level_filters_entries() {
        let capture = Capture { lines: Mutex::new(Vec::new()) };
        capture.debug(LogComponent::Domain("Scale"), "dropped");
        capture.warn(LogComponent::Domain("Scale"), "kept");
        let lines = capture.lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains(" WARN DOM:Scale | kept"));
    }

    #[test]
    fn metadata_is_appended() {
        let entry = LogEntry::new(LogLevel::Info, LogComponent::Application("Load"), "done")
            .with_metadata("{\"items\":3}");
        assert!(entry.format_line().ends_with("APP:Load | done | {\"items\":3}"));
    }
}
