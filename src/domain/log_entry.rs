use super::severity::Severity;
use chrono::{DateTime, Local};

/// How a record's values are rendered and where the record may go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogKind {
    /// Console and/or file, depending on the switches.
    #[default]
    Standard,
    /// File only, regardless of the file switch.
    FileOnly,
    /// Single value pretty-printed as JSON.
    Json,
    /// Single value pretty-printed as XML.
    Xml,
}

/// A record on its way to the file sink.
///
/// Built at the call site and consumed exactly once by the sink task.
/// `body` already carries the file head (`": "` or `" [head]: "`).
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    severity: Severity,
    tag: String,
    body: String,
    timestamp: DateTime<Local>,
}

impl LogEntry {
    pub fn new(severity: Severity, tag: impl Into<String>, body: impl Into<String>) -> Self {
        Self::at(severity, tag, body, Local::now())
    }

    pub fn at(
        severity: Severity,
        tag: impl Into<String>,
        body: impl Into<String>,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            severity,
            tag: tag.into(),
            body: body.into(),
            timestamp,
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// On-disk representation: `HH:MM:SS.mmm L/tag<body>\n`.
    pub fn render_line(&self) -> String {
        let mut line = String::with_capacity(self.body.len() + self.tag.len() + 24);
        line.push_str(&self.timestamp.format("%H:%M:%S%.3f ").to_string());
        line.push(self.severity.letter());
        line.push('/');
        line.push_str(&self.tag);
        line.push_str(&self.body);
        line.push('\n');
        line
    }

    pub fn estimated_size(&self) -> usize {
        self.body.len() + self.tag.len() + 16
    }
}
