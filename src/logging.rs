// src/logging.rs

//! Structured error logging.
//!
//! Every failure the loader layer cares about is turned into a
//! [`LogRecord`] and handed to a [`LogSink`]. Which sink is used is an
//! injection decision: [`ConsoleSink`] pretty-prints through the `log`
//! facade for local development, [`JsonSink`] writes one JSON line per
//! record for log aggregation, [`MemorySink`] keeps records in memory.

use std::error::Error as StdError;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value, json};

use crate::config::LoggingConfig;
use crate::error::AppError;

/// Log level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// Parse a level name; unknown names map to `Info`.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

/// Output format of the error logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines through the `log` facade
    #[default]
    Pretty,
    /// One JSON object per line on stdout
    Json,
}

impl LogFormat {
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

fn iso_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// A single structured log entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub level: LogLevel,
    #[serde(serialize_with = "iso_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub context: String,
    pub message: String,
    pub params: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Destination for log records.
pub trait LogSink: Send + Sync {
    fn log(&self, record: &LogRecord);
}

/// Pretty output through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn log(&self, record: &LogRecord) {
        let level: log::Level = record.level.into();
        if record.params.is_empty() {
            log::log!(level, "[{}] {}", record.context, record.message);
        } else {
            log::log!(
                level,
                "[{}] {} {}",
                record.context,
                record.message,
                Value::Object(record.params.clone())
            );
        }
        if let Some(stack) = &record.stack {
            for line in stack.lines() {
                log::log!(level, "    caused by: {}", line);
            }
        }
    }
}

/// Newline-delimited JSON output.
pub struct JsonSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl JsonSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> LogSink for JsonSink<W> {
    fn log(&self, record: &LogRecord) {
        let Ok(line) = serde_json::to_string(record) else {
            return;
        };
        let mut writer = self.writer.lock();
        let _ = writeln!(writer, "{line}");
        let _ = writer.flush();
    }
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl LogSink for MemorySink {
    fn log(&self, record: &LogRecord) {
        self.records.lock().push(record.clone());
    }
}

/// Forwards records as `tracing` events.
#[cfg(feature = "tracing")]
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

#[cfg(feature = "tracing")]
impl LogSink for TracingSink {
    fn log(&self, record: &LogRecord) {
        let params = Value::Object(record.params.clone());
        let stack = record.stack.as_deref().unwrap_or("");
        match record.level {
            LogLevel::Debug => {
                tracing::debug!(context = %record.context, %params, stack, "{}", record.message)
            }
            LogLevel::Info => {
                tracing::info!(context = %record.context, %params, stack, "{}", record.message)
            }
            LogLevel::Warn => {
                tracing::warn!(context = %record.context, %params, stack, "{}", record.message)
            }
            LogLevel::Error => {
                tracing::error!(context = %record.context, %params, stack, "{}", record.message)
            }
        }
    }
}

/// Render the `source()` chain of an error, one cause per line.
fn source_chain(error: &dyn StdError) -> Option<String> {
    let mut causes = Vec::new();
    let mut current = error.source();
    while let Some(cause) = current {
        causes.push(cause.to_string());
        current = cause.source();
    }
    (!causes.is_empty()).then(|| causes.join("\n"))
}

fn into_params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("value".into(), other);
            map
        }
    }
}

/// Structured, leveled logger for data-loading failures.
///
/// Logging never fails and never panics; a sink that cannot write drops
/// the record.
#[derive(Clone)]
pub struct ErrorLogger {
    sink: Arc<dyn LogSink>,
    min_level: LogLevel,
    user_id: Option<String>,
    request_id: Option<String>,
}

impl fmt::Debug for ErrorLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorLogger")
            .field("min_level", &self.min_level)
            .field("user_id", &self.user_id)
            .field("request_id", &self.request_id)
            .finish_non_exhaustive()
    }
}

impl Default for ErrorLogger {
    fn default() -> Self {
        Self::new(Arc::new(ConsoleSink))
    }
}

impl ErrorLogger {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            min_level: LogLevel::Debug,
            user_id: None,
            request_id: None,
        }
    }

    /// Pick the sink matching the configured format.
    pub fn from_config(config: &LoggingConfig) -> Self {
        let sink: Arc<dyn LogSink> = match config.format {
            LogFormat::Pretty => Arc::new(ConsoleSink),
            LogFormat::Json => Arc::new(JsonSink::stdout()),
        };
        Self::new(sink).with_min_level(LogLevel::from_str_lossy(&config.level))
    }

    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    fn emit(
        &self,
        level: LogLevel,
        context: String,
        message: String,
        params: Map<String, Value>,
        stack: Option<String>,
    ) {
        if level < self.min_level {
            return;
        }
        let record = LogRecord {
            level,
            timestamp: Utc::now(),
            context,
            message,
            params,
            user_id: self.user_id.clone(),
            request_id: self.request_id.clone(),
            stack,
        };
        self.sink.log(&record);
    }

    /// Log a plain message with parameters.
    pub fn log_message(&self, level: LogLevel, context: &str, message: &str, params: Value) {
        self.emit(
            level,
            context.to_string(),
            message.to_string(),
            into_params(params),
            None,
        );
    }

    /// Log an error under the given context.
    pub fn log_error(&self, error: &dyn StdError, context: &str, level: LogLevel) {
        self.log_error_with(error, context, level, Value::Null);
    }

    /// Log an error with extra parameters.
    pub fn log_error_with(&self, error: &dyn StdError, context: &str, level: LogLevel, params: Value) {
        self.emit(
            level,
            context.to_string(),
            error.to_string(),
            into_params(params),
            source_chain(error),
        );
    }

    /// Log a failed call to an API endpoint.
    pub fn log_api_error(&self, endpoint: &str, error: &dyn StdError, params: Value) {
        let mut map = into_params(params);
        map.insert("endpoint".into(), json!(endpoint));
        self.emit(
            LogLevel::Error,
            format!("API_{endpoint}"),
            error.to_string(),
            map,
            source_chain(error),
        );
    }

    /// Log a failed fetch of a data type, optionally for one identifier.
    pub fn log_data_fetch_error(&self, data_type: &str, error: &dyn StdError, id: Option<&str>) {
        let mut map = Map::new();
        map.insert("dataType".into(), json!(data_type));
        if let Some(id) = id {
            map.insert("id".into(), json!(id));
        }
        self.emit(
            LogLevel::Error,
            format!("DATA_FETCH_{}", data_type.to_uppercase()),
            error.to_string(),
            map,
            source_chain(error),
        );
    }

    /// Log a missing resource. Always at WARN: a 404 is expected traffic.
    pub fn log_404_error(&self, resource_type: &str, identifier: &str) {
        let mut map = Map::new();
        map.insert("resourceType".into(), json!(resource_type));
        map.insert("identifier".into(), json!(identifier));
        self.emit(
            LogLevel::Warn,
            format!("404_{}", resource_type.to_uppercase()),
            format!("{resource_type} not found: {identifier}"),
            map,
            None,
        );
    }

    /// Log a transport failure.
    pub fn log_network_error(&self, url: &str, error: &dyn StdError) {
        let mut map = Map::new();
        map.insert("url".into(), json!(url));
        self.emit(
            LogLevel::Error,
            "NETWORK_ERROR".to_string(),
            error.to_string(),
            map,
            source_chain(error),
        );
    }

    /// Classify a fetch failure and log it under the matching category.
    pub fn log_fetch_failure(&self, resource_type: &str, target: &str, error: &AppError) {
        if error.is_network() {
            self.log_network_error(target, error);
        } else if error.is_not_found() {
            self.log_404_error(resource_type, target);
        } else {
            self.log_api_error(target, error, json!({ "resourceType": resource_type }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_logger() -> (Arc<MemorySink>, ErrorLogger) {
        let sink = Arc::new(MemorySink::new());
        let logger = ErrorLogger::new(sink.clone());
        (sink, logger)
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_log_level_from_str() {
        assert_eq!(LogLevel::from_str_lossy("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str_lossy("INFO"), LogLevel::Info);
        assert_eq!(LogLevel::from_str_lossy("unknown"), LogLevel::Info);
    }

    #[test]
    fn convenience_wrappers_standardize_context() {
        let (sink, logger) = memory_logger();
        let err = AppError::other("boom");

        logger.log_api_error("/api/courses", &err, json!({ "page": 2 }));
        logger.log_data_fetch_error("courses", &err, Some("17"));
        logger.log_404_error("course", "17");
        logger.log_network_error("http://api/x", &AppError::Network("reset".into()));

        let records = sink.records();
        let contexts: Vec<_> = records.iter().map(|r| r.context.as_str()).collect();
        assert_eq!(
            contexts,
            ["API_/api/courses", "DATA_FETCH_COURSES", "404_COURSE", "NETWORK_ERROR"]
        );
        assert_eq!(records[0].params["page"], json!(2));
        assert_eq!(records[0].params["endpoint"], json!("/api/courses"));
        assert_eq!(records[1].params["id"], json!("17"));
        assert_eq!(records[2].level, LogLevel::Warn);
        assert_eq!(records[2].message, "course not found: 17");
        assert_eq!(records[3].level, LogLevel::Error);
    }

    #[test]
    fn fetch_failure_is_classified() {
        let (sink, logger) = memory_logger();
        logger.log_fetch_failure("course", "/api/courses/3", &AppError::not_found("/api/courses/3"));
        logger.log_fetch_failure("course", "/api/courses", &AppError::Network("refused".into()));
        logger.log_fetch_failure(
            "course",
            "/api/courses",
            &AppError::Status {
                status: 500,
                url: "/api/courses".into(),
            },
        );

        let contexts: Vec<_> = sink.records().into_iter().map(|r| r.context).collect();
        assert_eq!(contexts, ["404_COURSE", "NETWORK_ERROR", "API_/api/courses"]);
    }

    #[test]
    fn stack_and_identity_are_recorded() {
        let (sink, logger) = memory_logger();
        let logger = logger.with_user_id("u-1").with_request_id("req-9");
        let err = AppError::data_load("Failed after 2 attempts: boom", "retry", Some(AppError::other("boom")));

        logger.log_error(&err, "COURSES", LogLevel::Error);

        let record = &sink.records()[0];
        assert_eq!(record.stack.as_deref(), Some("boom"));
        assert_eq!(record.user_id.as_deref(), Some("u-1"));
        assert_eq!(record.request_id.as_deref(), Some("req-9"));
    }

    #[test]
    fn min_level_filters_records() {
        let (sink, logger) = memory_logger();
        let logger = logger.with_min_level(LogLevel::Error);
        logger.log_404_error("post", "a");
        logger.log_message(LogLevel::Info, "CTX", "hello", Value::Null);
        assert!(sink.is_empty());
    }

    #[test]
    fn json_sink_writes_one_line_per_record() {
        let sink = Arc::new(JsonSink::new(Vec::new()));
        let logger = ErrorLogger::new(sink.clone());
        logger.log_404_error("post", "missing-slug");
        logger.log_message(LogLevel::Info, "STARTUP", "ready", json!({ "port": 3000 }));
        drop(logger);

        let sink = Arc::try_unwrap(sink).ok().unwrap();
        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["level"], "WARN");
        assert_eq!(first["context"], "404_POST");
        assert!(first["timestamp"].as_str().unwrap().ends_with('Z'));
        assert!(first.get("userId").is_none());

        let second: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["params"]["port"], 3000);
    }

    #[test]
    fn json_record_uses_camel_case_identity() {
        let sink = Arc::new(JsonSink::new(Vec::new()));
        let logger = ErrorLogger::new(sink.clone())
            .with_user_id("u-7")
            .with_request_id("req-3");
        logger.log_network_error("/api/blog", &AppError::Network("reset".into()));
        drop(logger);

        let sink = Arc::try_unwrap(sink).ok().unwrap();
        let output = String::from_utf8(sink.into_inner()).unwrap();
        let record: Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(record["userId"], "u-7");
        assert_eq!(record["requestId"], "req-3");
        assert!(record.get("user_id").is_none());
        assert!(record.get("request_id").is_none());
    }
}
