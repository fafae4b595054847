use super::{AppendFileWriter, HeaderInfo, LogFileMatcher, SinkError};
use crate::config::{FileOutputListener, FileWriter, LogConfig};
use chrono::{DateTime, Local, NaiveDate};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result of one batch write.
#[derive(Debug, Clone, PartialEq)]
pub struct FlushOutcome {
    pub path: PathBuf,
    /// Expired files found while creating `path`; empty unless the file was
    /// new and retention is enabled.
    pub stale: Vec<PathBuf>,
}

/// Writes batches to the file of the current day.
///
/// All methods are blocking; async callers go through `spawn_blocking`.
pub struct FileSink {
    dir: PathBuf,
    prefix: String,
    extension: String,
    save_days: Option<u32>,
    matcher: LogFileMatcher,
    header: HeaderInfo,
    writer: Arc<dyn FileWriter>,
    listener: Option<Arc<dyn FileOutputListener>>,
}

impl FileSink {
    pub fn from_config(config: &LogConfig) -> Result<Self, SinkError> {
        let settings = config.settings();
        Ok(Self {
            dir: config.effective_dir(),
            prefix: settings.file_prefix.clone(),
            extension: settings.file_extension.clone(),
            save_days: settings.save_days,
            matcher: LogFileMatcher::new(&settings.file_prefix)?,
            header: HeaderInfo::from_config(config),
            writer: config
                .file_writer()
                .cloned()
                .unwrap_or_else(|| Arc::new(AppendFileWriter) as Arc<dyn FileWriter>),
            listener: config.file_listener().cloned(),
        })
    }

    /// `<dir>/<prefix>_<YYYY_MM_DD><extension>`
    pub fn path_in(dir: &Path, prefix: &str, extension: &str, date: NaiveDate) -> PathBuf {
        dir.join(format!("{}_{}{}", prefix, date.format("%Y_%m_%d"), extension))
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        Self::path_in(&self.dir, &self.prefix, &self.extension, date)
    }

    /// Appends `content` to the file for `now`'s date, creating the file
    /// (with its header) first when needed.
    pub fn write_batch(&self, content: &str, now: DateTime<Local>) -> Result<FlushOutcome, SinkError> {
        let date = now.date_naive();
        let path = self.path_for(date);

        let stale = if path.exists() {
            if !path.is_file() {
                return Err(SinkError::NotAFile(path));
            }
            Vec::new()
        } else {
            self.create(&path, date)?
        };

        self.append(&path, content)?;
        Ok(FlushOutcome { path, stale })
    }

    fn create(&self, path: &Path, date: NaiveDate) -> Result<Vec<PathBuf>, SinkError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| SinkError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let stale = match self.save_days {
            Some(days) => self.matcher.expired(&self.dir, date, days),
            None => Vec::new(),
        };

        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| SinkError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!("Created log file {}", path.display());
        self.append(path, &self.header.render(date))?;
        Ok(stale)
    }

    fn append(&self, path: &Path, content: &str) -> Result<(), SinkError> {
        self.writer
            .write(path, content)
            .map_err(|source| SinkError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        if let Some(listener) = &self.listener {
            listener.on_file_output(path, content);
        }
        Ok(())
    }
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSink")
            .field("dir", &self.dir)
            .field("prefix", &self.prefix)
            .field("extension", &self.extension)
            .field("save_days", &self.save_days)
            .finish_non_exhaustive()
    }
}
