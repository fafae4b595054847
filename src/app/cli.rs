use crate::config::{ConfigError, LogConfig, LogSettings};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConsoleKind {
    /// `L/tag: line` on standard error
    Stderr,
    /// `tracing` events under the `rask_logkit::console` target
    Tracing,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Writes sample records through rask-logkit", long_about = None)]
pub struct Cli {
    /// Directory for log files (defaults to the platform data directory)
    #[arg(long, env = "RASK_LOG_DIR")]
    pub dir: Option<PathBuf>,

    /// Log file name prefix
    #[arg(long, env = "RASK_LOG_PREFIX")]
    pub file_prefix: Option<String>,

    /// Delete log files older than this many days
    #[arg(long, env = "RASK_LOG_SAVE_DAYS")]
    pub save_days: Option<u32>,

    /// Buffer size in entries before a size-triggered flush
    #[arg(long, env = "RASK_LOG_BUFFER_SIZE")]
    pub buffer_size: Option<usize>,

    /// Flush interval in milliseconds
    #[arg(long, env = "RASK_LOG_FLUSH_INTERVAL_MS")]
    pub flush_interval_ms: Option<u64>,

    /// Disable console output
    #[arg(long, env = "RASK_LOG_NO_CONSOLE")]
    pub no_console: bool,

    /// Disable file output
    #[arg(long, env = "RASK_LOG_NO_FILE")]
    pub no_file: bool,

    /// Where console blocks are written
    #[arg(long, value_enum, default_value_t = ConsoleKind::Stderr)]
    pub console_sink: ConsoleKind,

    /// Filter for the crate's own diagnostics (overridden by RUST_LOG)
    #[arg(long, env = "RASK_LOG_DIAGNOSTICS", default_value = "info")]
    pub diagnostics: String,

    /// TOML settings file; command line options take precedence
    #[arg(long, env = "CONFIG_FILE")]
    pub config_file: Option<PathBuf>,
}

impl Cli {
    /// File settings (or defaults with file output on), then command line
    /// overrides, then strict validation.
    pub fn to_settings(&self) -> Result<LogSettings, ConfigError> {
        let mut settings = match &self.config_file {
            Some(path) => LogSettings::from_file(path)?,
            None => LogSettings {
                file_switch: true,
                ..LogSettings::default()
            },
        };

        if let Some(dir) = &self.dir {
            settings.dir = Some(dir.clone());
        }
        if let Some(prefix) = &self.file_prefix {
            settings.file_prefix = prefix.clone();
        }
        if let Some(days) = self.save_days {
            settings.save_days = Some(days);
        }
        if let Some(size) = self.buffer_size {
            settings.buffer_size = size;
        }
        if let Some(millis) = self.flush_interval_ms {
            settings.flush_interval = Duration::from_millis(millis);
        }
        if self.no_console {
            settings.console_switch = false;
        }
        if self.no_file {
            settings.file_switch = false;
        }

        settings.sanitize();
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_config(&self) -> Result<LogConfig, ConfigError> {
        let settings = self.to_settings()?;
        Ok(LogConfig::from_settings(settings)
            .with_app_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
            .add_file_extra_head("Launched By", "rask-logkit demo"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_file_output() {
        let cli = Cli::try_parse_from(["rask-logkit"]).unwrap();
        let settings = cli.to_settings().unwrap();

        assert!(settings.file_switch);
        assert!(settings.console_switch);
        assert_eq!(cli.console_sink, ConsoleKind::Stderr);
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::try_parse_from([
            "rask-logkit",
            "--save-days",
            "7",
            "--flush-interval-ms",
            "250",
            "--file-prefix",
            "demo",
            "--no-console",
            "--console-sink",
            "tracing",
        ])
        .unwrap();
        let settings = cli.to_settings().unwrap();

        assert_eq!(settings.save_days, Some(7));
        assert_eq!(settings.flush_interval, Duration::from_millis(250));
        assert_eq!(settings.file_prefix, "demo");
        assert!(!settings.console_switch);
        assert_eq!(cli.console_sink, ConsoleKind::Tracing);
    }

    #[test]
    fn test_config_file_is_base() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logkit.toml");
        std::fs::write(&path, "file_switch = false\nglobal_tag = \"Demo\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "rask-logkit",
            "--config-file",
            path.to_str().unwrap(),
            "--buffer-size",
            "3",
        ])
        .unwrap();
        let settings = cli.to_settings().unwrap();

        assert!(!settings.file_switch);
        assert_eq!(settings.global_tag, "Demo");
        assert_eq!(settings.buffer_size, 3);
    }

    #[test]
    fn test_invalid_prefix_rejected() {
        let cli = Cli::try_parse_from(["rask-logkit", "--file-prefix", "a/b"]).unwrap();
        assert!(matches!(cli.to_settings(), Err(ConfigError::InvalidConfig(_))));
    }
}
