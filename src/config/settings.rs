use super::ConfigError;
use crate::domain::Severity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_FILE_PREFIX: &str = "util";
pub const DEFAULT_FILE_EXTENSION: &str = ".txt";
pub const DEFAULT_BUFFER_SIZE: usize = 10;
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(3000);
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;
pub const DEFAULT_BACKGROUND_FLUSH_DELAY: Duration = Duration::from_millis(1000);

const MAX_QUEUE_CAPACITY: usize = 1_000_000;

/// Plain-data logging settings, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub log_switch: bool,
    pub console_switch: bool,
    pub file_switch: bool,
    pub global_tag: String,
    pub head_switch: bool,
    pub border_switch: bool,
    pub single_tag_switch: bool,
    pub console_filter: Severity,
    pub file_filter: Severity,
    pub stack_deep: usize,
    pub stack_offset: usize,
    pub file_prefix: String,
    pub file_extension: String,
    pub dir: Option<PathBuf>,
    /// Retention window in days; `None` keeps files forever.
    #[serde(with = "super::serde_helpers::retention_days")]
    pub save_days: Option<u32>,
    /// Size trigger, in entries of roughly 200 characters each.
    pub buffer_size: usize,
    #[serde(with = "super::serde_helpers::millis", rename = "flush_interval_ms")]
    pub flush_interval: Duration,
    pub queue_capacity: usize,
    #[serde(with = "super::serde_helpers::millis", rename = "background_flush_delay_ms")]
    pub background_flush_delay: Duration,
    pub app_name: String,
    pub app_version: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            log_switch: true,
            console_switch: true,
            file_switch: false,
            global_tag: String::new(),
            head_switch: true,
            border_switch: true,
            single_tag_switch: true,
            console_filter: Severity::Verbose,
            file_filter: Severity::Verbose,
            stack_deep: 1,
            stack_offset: 0,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            dir: None,
            save_days: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            background_flush_delay: DEFAULT_BACKGROUND_FLUSH_DELAY,
            app_name: env!("CARGO_PKG_NAME").to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl LogSettings {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut settings: LogSettings = toml::from_str(content)?;
        settings.sanitize();
        Ok(settings)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Replaces blank or out-of-range values with their defaults.
    ///
    /// Never fails: bad input silently falls back.
    pub fn sanitize(&mut self) {
        self.global_tag = normalize_tag(&self.global_tag);
        self.file_prefix = normalize_prefix(&self.file_prefix);
        self.file_extension = normalize_extension(&self.file_extension);
        self.dir = self.dir.take().filter(|d| !d.as_os_str().is_empty());

        if self.save_days == Some(0) {
            self.save_days = None;
        }
        if self.stack_deep == 0 {
            self.stack_deep = 1;
        }
        if self.buffer_size == 0 {
            self.buffer_size = 1;
        }
        if self.flush_interval.is_zero() {
            self.flush_interval = DEFAULT_FLUSH_INTERVAL;
        }
        if self.queue_capacity == 0 || self.queue_capacity > MAX_QUEUE_CAPACITY {
            self.queue_capacity = DEFAULT_QUEUE_CAPACITY;
        }
        if self.app_name.trim().is_empty() {
            self.app_name = env!("CARGO_PKG_NAME").to_string();
        }
    }

    /// Strict check for callers that prefer an error over silent fallback.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file_prefix.contains(['/', '\\']) {
            return Err(ConfigError::InvalidConfig(format!(
                "File prefix '{}' must not contain path separators",
                self.file_prefix
            )));
        }

        if self.queue_capacity == 0 || self.queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(ConfigError::InvalidConfig(format!(
                "Queue capacity {} must be between 1 and {MAX_QUEUE_CAPACITY}",
                self.queue_capacity
            )));
        }

        if self.stack_deep == 0 {
            return Err(ConfigError::InvalidConfig(
                "Stack depth must be at least 1".to_string(),
            ));
        }

        if self.flush_interval.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "Flush interval must be greater than 0".to_string(),
            ));
        }

        if let Some(dir) = &self.dir
            && dir.exists()
            && !dir.is_dir()
        {
            return Err(ConfigError::InvalidConfig(format!(
                "Log directory is not a directory: {}",
                dir.display()
            )));
        }

        Ok(())
    }

    pub fn has_global_tag(&self) -> bool {
        !self.global_tag.is_empty()
    }

    /// Configured directory, or the platform default.
    pub fn effective_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| default_log_dir(&self.app_name))
    }
}

/// Data-local directory when available, temp directory otherwise.
pub fn default_log_dir(app_name: &str) -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(app_name)
        .join("log")
}

pub(crate) fn normalize_tag(tag: &str) -> String {
    if tag.trim().is_empty() {
        String::new()
    } else {
        tag.to_string()
    }
}

pub(crate) fn normalize_prefix(prefix: &str) -> String {
    if prefix.trim().is_empty() {
        DEFAULT_FILE_PREFIX.to_string()
    } else {
        prefix.to_string()
    }
}

pub(crate) fn normalize_extension(extension: &str) -> String {
    if extension.trim().is_empty() {
        DEFAULT_FILE_EXTENSION.to_string()
    } else if extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{extension}")
    }
}
