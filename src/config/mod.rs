pub mod hooks;
pub mod serde_helpers;
mod settings;

pub use hooks::{ConsoleOutputListener, FileOutputListener, FileWriter};
pub use settings::{
    DEFAULT_BACKGROUND_FLUSH_DELAY, DEFAULT_BUFFER_SIZE, DEFAULT_FILE_EXTENSION,
    DEFAULT_FILE_PREFIX, DEFAULT_FLUSH_INTERVAL, DEFAULT_QUEUE_CAPACITY, LogSettings,
    default_log_dir,
};

use crate::domain::Severity;
use crate::format::FormatterRegistry;
use settings::{normalize_extension, normalize_prefix, normalize_tag};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Complete configuration of a `Logger`: plain settings plus hooks.
///
/// Built once by the host and handed to `Logger::new`. Setters consume and
/// return `self` so a config reads as one chain:
///
/// ```
/// use rask_logkit::{LogConfig, Severity};
///
/// let config = LogConfig::default()
///     .with_global_tag("MyApp")
///     .with_file_switch(true)
///     .with_file_filter(Severity::Info)
///     .with_save_days(7)
///     .with_buffer_size(10)
///     .with_flush_interval_ms(3000);
/// assert_eq!(config.settings().global_tag, "MyApp");
/// ```
#[derive(Clone, Default)]
pub struct LogConfig {
    settings: LogSettings,
    formatters: FormatterRegistry,
    file_writer: Option<Arc<dyn FileWriter>>,
    console_listener: Option<Arc<dyn ConsoleOutputListener>>,
    file_listener: Option<Arc<dyn FileOutputListener>>,
    extra_head: Vec<(String, String)>,
}

impl LogConfig {
    pub fn from_settings(mut settings: LogSettings) -> Self {
        settings.sanitize();
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(Self::from_settings(LogSettings::from_toml_str(content)?))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Ok(Self::from_settings(LogSettings::from_file(path)?))
    }

    pub fn settings(&self) -> &LogSettings {
        &self.settings
    }

    pub fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }

    pub fn file_writer(&self) -> Option<&Arc<dyn FileWriter>> {
        self.file_writer.as_ref()
    }

    pub fn console_listener(&self) -> Option<&Arc<dyn ConsoleOutputListener>> {
        self.console_listener.as_ref()
    }

    pub fn file_listener(&self) -> Option<&Arc<dyn FileOutputListener>> {
        self.file_listener.as_ref()
    }

    pub fn extra_head(&self) -> &[(String, String)] {
        &self.extra_head
    }

    pub fn effective_dir(&self) -> PathBuf {
        self.settings.effective_dir()
    }

    pub fn with_log_switch(mut self, on: bool) -> Self {
        self.settings.log_switch = on;
        self
    }

    pub fn with_console_switch(mut self, on: bool) -> Self {
        self.settings.console_switch = on;
        self
    }

    pub fn with_file_switch(mut self, on: bool) -> Self {
        self.settings.file_switch = on;
        self
    }

    /// A blank tag clears the global tag.
    pub fn with_global_tag(mut self, tag: impl AsRef<str>) -> Self {
        self.settings.global_tag = normalize_tag(tag.as_ref());
        self
    }

    pub fn with_head_switch(mut self, on: bool) -> Self {
        self.settings.head_switch = on;
        self
    }

    pub fn with_border_switch(mut self, on: bool) -> Self {
        self.settings.border_switch = on;
        self
    }

    pub fn with_single_tag_switch(mut self, on: bool) -> Self {
        self.settings.single_tag_switch = on;
        self
    }

    pub fn with_console_filter(mut self, severity: Severity) -> Self {
        self.settings.console_filter = severity;
        self
    }

    pub fn with_file_filter(mut self, severity: Severity) -> Self {
        self.settings.file_filter = severity;
        self
    }

    pub fn with_stack_deep(mut self, depth: usize) -> Self {
        self.settings.stack_deep = depth.max(1);
        self
    }

    pub fn with_stack_offset(mut self, offset: usize) -> Self {
        self.settings.stack_offset = offset;
        self
    }

    pub fn with_file_prefix(mut self, prefix: impl AsRef<str>) -> Self {
        self.settings.file_prefix = normalize_prefix(prefix.as_ref());
        self
    }

    pub fn with_file_extension(mut self, extension: impl AsRef<str>) -> Self {
        self.settings.file_extension = normalize_extension(extension.as_ref());
        self
    }

    /// An empty path restores the default directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.settings.dir = if dir.as_os_str().is_empty() {
            None
        } else {
            Some(dir)
        };
        self
    }

    /// Zero disables retention.
    pub fn with_save_days(mut self, days: u32) -> Self {
        self.settings.save_days = (days > 0).then_some(days);
        self
    }

    pub fn with_buffer_size(mut self, entries: usize) -> Self {
        self.settings.buffer_size = entries.max(1);
        self
    }

    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.settings.flush_interval = interval;
        }
        self
    }

    pub fn with_flush_interval_ms(self, millis: u64) -> Self {
        self.with_flush_interval(Duration::from_millis(millis))
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        if capacity > 0 {
            self.settings.queue_capacity = capacity;
        }
        self
    }

    pub fn with_background_flush_delay(mut self, delay: Duration) -> Self {
        self.settings.background_flush_delay = delay;
        self
    }

    pub fn with_app_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.settings.app_name = name.into();
        self.settings.app_version = version.into();
        self.settings.sanitize();
        self
    }

    /// Registers a formatter used for every value of type `T`.
    pub fn add_formatter<T, F>(mut self, formatter: F) -> Self
    where
        T: 'static,
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.formatters.register::<T, F>(formatter);
        self
    }

    pub fn with_file_writer(mut self, writer: Arc<dyn FileWriter>) -> Self {
        self.file_writer = Some(writer);
        self
    }

    pub fn with_console_listener(mut self, listener: Arc<dyn ConsoleOutputListener>) -> Self {
        self.console_listener = Some(listener);
        self
    }

    pub fn with_file_listener(mut self, listener: Arc<dyn FileOutputListener>) -> Self {
        self.file_listener = Some(listener);
        self
    }

    /// Extra `key: value` line for the header of every new log file.
    /// Empty keys or values are ignored.
    pub fn add_file_extra_head(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let (key, value) = (key.into(), value.into());
        if key.is_empty() || value.is_empty() {
            return self;
        }
        match self.extra_head.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.extra_head.push((key, value)),
        }
        self
    }
}

impl fmt::Display for LogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.settings;
        let tag = if s.has_global_tag() {
            s.global_tag.as_str()
        } else {
            "null"
        };
        writeln!(f, "logSwitch: {}", s.log_switch)?;
        writeln!(f, "consoleSwitch: {}", s.console_switch)?;
        writeln!(f, "tag: {tag}")?;
        writeln!(f, "headSwitch: {}", s.head_switch)?;
        writeln!(f, "fileSwitch: {}", s.file_switch)?;
        writeln!(f, "dir: {}", self.effective_dir().display())?;
        writeln!(f, "filePrefix: {}", s.file_prefix)?;
        writeln!(f, "fileExtension: {}", s.file_extension)?;
        writeln!(f, "borderSwitch: {}", s.border_switch)?;
        writeln!(f, "singleTagSwitch: {}", s.single_tag_switch)?;
        writeln!(f, "consoleFilter: {}", s.console_filter)?;
        writeln!(f, "fileFilter: {}", s.file_filter)?;
        writeln!(f, "stackDeep: {}", s.stack_deep)?;
        writeln!(f, "stackOffset: {}", s.stack_offset)?;
        match s.save_days {
            Some(days) => writeln!(f, "saveDays: {days}")?,
            None => writeln!(f, "saveDays: -1")?,
        }
        writeln!(f, "bufferSize: {}", s.buffer_size)?;
        writeln!(f, "flushIntervalMs: {}", s.flush_interval.as_millis())?;
        writeln!(f, "formatters: {}", self.formatters.len())?;
        writeln!(f, "fileWriter: {}", self.file_writer.is_some())?;
        writeln!(f, "onConsoleOutputListener: {}", self.console_listener.is_some())?;
        writeln!(f, "onFileOutputListener: {}", self.file_listener.is_some())?;
        write!(f, "fileExtraHeader: {:?}", self.extra_head)
    }
}

impl fmt::Debug for LogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogConfig")
            .field("settings", &self.settings)
            .field("formatters", &self.formatters.len())
            .field("file_writer", &self.file_writer.is_some())
            .field("console_listener", &self.console_listener.is_some())
            .field("file_listener", &self.file_listener.is_some())
            .field("extra_head", &self.extra_head)
            .finish()
    }
}
