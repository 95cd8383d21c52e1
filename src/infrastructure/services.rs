use crate::domain::logging::{LogEntry, LogLevel, Logger, TimeProvider};

/// Console logger implementation for WASM environment
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    pub fn new_production() -> Self {
        Self::new(LogLevel::Info)
    }

    pub fn new_development() -> Self {
        Self::new(LogLevel::Debug)
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }
        let formatted = entry.format_line();
        match entry.level {
            LogLevel::Trace | LogLevel::Debug => gloo::console::debug!(formatted),
            LogLevel::Info => gloo::console::info!(formatted),
            LogLevel::Warn => gloo::console::warn!(formatted),
            LogLevel::Error => gloo::console::error!(formatted),
        }
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}

/// Wall clock backed by `Date.now()`.
pub struct BrowserTimeProvider;

impl TimeProvider for BrowserTimeProvider {
    fn current_timestamp(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    fn format_timestamp(&self, timestamp: u64) -> String {
        let date = js_sys::Date::new(&(timestamp as f64).into());
        format!(
            "{:02}:{:02}:{:02}.{:03}",
            date.get_hours(),
            date.get_minutes(),
            date.get_seconds(),
            date.get_milliseconds()
        )
    }
}
