//! Structured JSON logger
//!
//! - One log line = one event, written synchronously
//! - Deterministic key ordering: `event`, `severity`, `ts`, then fields
//!   sorted by key
//! - The logger is a value handed to whoever needs it; there is no
//!   process-wide instance and no hard-coded destination

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};

use super::{ObservabilityError, ObservabilityResult};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Debug-level detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues (retries)
    Warn = 2,
    /// Operation failures
    Error = 3,
    /// Failures the caller cannot recover from
    Fatal = 4,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ObservabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Severity::Trace),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            "fatal" => Ok(Severity::Fatal),
            other => Err(ObservabilityError::new(format!(
                "Unknown log level '{}'. Use trace, info, warn, error or fatal.",
                other
            ))),
        }
    }
}

/// In-memory log buffer, shared between a [`LogSink::Memory`] and its reader
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured lines, without trailing newlines
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// The `event` value of every captured line, in order
    pub fn events(&self) -> Vec<String> {
        self.lines()
            .iter()
            .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
            .filter_map(|v| v["event"].as_str().map(str::to_string))
            .collect()
    }

    fn push(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.trim_end().to_string());
        }
    }
}

/// Where log lines go
#[derive(Debug, Clone)]
pub enum LogSink {
    Stdout,
    Stderr,
    File(Arc<Mutex<File>>),
    Memory(MemoryLog),
    Null,
}

impl LogSink {
    /// Open (truncate) a log file at `path`
    pub fn file(path: &Path) -> ObservabilityResult<Self> {
        let file = File::create(path).map_err(|e| {
            ObservabilityError::with_source(
                format!("Failed to open log file {}", path.display()),
                e,
            )
        })?;
        Ok(LogSink::File(Arc::new(Mutex::new(file))))
    }

    fn write_line(&self, line: &str) {
        // Logging failures are swallowed: a broken sink must never fail a request
        match self {
            LogSink::Stdout => {
                let mut out = io::stdout();
                let _ = out.write_all(line.as_bytes());
                let _ = out.flush();
            }
            LogSink::Stderr => {
                let mut err = io::stderr();
                let _ = err.write_all(line.as_bytes());
                let _ = err.flush();
            }
            LogSink::File(file) => {
                if let Ok(mut file) = file.lock() {
                    let _ = file.write_all(line.as_bytes());
                    let _ = file.flush();
                }
            }
            LogSink::Memory(buffer) => buffer.push(line),
            LogSink::Null => {}
        }
    }
}

/// A structured logger that outputs JSON lines to a [`LogSink`]
#[derive(Debug, Clone)]
pub struct Logger {
    sink: LogSink,
    min_severity: Severity,
    context: Vec<(String, String)>,
}

impl Logger {
    /// Create a logger writing everything at INFO and above to `sink`
    pub fn new(sink: LogSink) -> Self {
        Self {
            sink,
            min_severity: Severity::Info,
            context: Vec::new(),
        }
    }

    /// A logger that drops every line
    pub fn null() -> Self {
        Self::new(LogSink::Null)
    }

    /// A logger capturing lines in memory, plus the handle to read them back
    pub fn memory() -> (Self, MemoryLog) {
        let log = MemoryLog::new();
        (Self::new(LogSink::Memory(log.clone())).with_min_severity(Severity::Trace), log)
    }

    /// Create `sqlcrud-<timestamp>.log` inside `dir` and log to it
    pub fn to_directory(dir: &Path) -> ObservabilityResult<Self> {
        fs::create_dir_all(dir).map_err(|e| {
            ObservabilityError::with_source(
                format!("Failed to create log directory {}", dir.display()),
                e,
            )
        })?;
        let path = Self::log_file_path(dir);
        Ok(Self::new(LogSink::file(&path)?))
    }

    /// Path of the log file a directory-backed logger would create now
    pub fn log_file_path(dir: &Path) -> PathBuf {
        let timestamp = Utc::now().format("%Y-%m-%d_%H-%M-%S");
        dir.join(format!("sqlcrud-{}.log", timestamp))
    }

    /// Drop lines below `severity`
    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    /// Derive a logger that adds `key=value` to every line
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut child = self.clone();
        child.context.push((key.into(), value.into()));
        child
    }

    pub fn min_severity(&self) -> Severity {
        self.min_severity
    }

    /// Log an event with the given severity and fields
    pub fn log(&self, severity: Severity, event: impl AsRef<str>, fields: &[(&str, &str)]) {
        if severity < self.min_severity {
            return;
        }
        let line = self.render(severity, event.as_ref(), fields);
        self.sink.write_line(&line);
    }

    fn render(&self, severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut output = String::with_capacity(256);

        output.push_str("{\"event\":\"");
        escape_json_string(&mut output, event);
        output.push_str("\",\"severity\":\"");
        output.push_str(severity.as_str());
        output.push_str("\",\"ts\":\"");
        output.push_str(&Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        output.push('"');

        let mut sorted: Vec<(&str, &str)> = self
            .context
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(fields.iter().copied())
            .collect();
        sorted.sort_by_key(|(k, _)| *k);

        for (key, value) in sorted {
            output.push_str(",\"");
            escape_json_string(&mut output, key);
            output.push_str("\":\"");
            escape_json_string(&mut output, value);
            output.push('"');
        }

        output.push_str("}\n");
        output
    }

    pub fn trace(&self, event: impl AsRef<str>, fields: &[(&str, &str)]) {
        self.log(Severity::Trace, event, fields);
    }

    pub fn info(&self, event: impl AsRef<str>, fields: &[(&str, &str)]) {
        self.log(Severity::Info, event, fields);
    }

    pub fn warn(&self, event: impl AsRef<str>, fields: &[(&str, &str)]) {
        self.log(Severity::Warn, event, fields);
    }

    pub fn error(&self, event: impl AsRef<str>, fields: &[(&str, &str)]) {
        self.log(Severity::Error, event, fields);
    }

    pub fn fatal(&self, event: impl AsRef<str>, fields: &[(&str, &str)]) {
        self.log(Severity::Fatal, event, fields);
    }
}

/// Escape special characters for JSON strings
fn escape_json_string(output: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c if c.is_control() => {
                output.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => output.push(c),
        }
    }
}
