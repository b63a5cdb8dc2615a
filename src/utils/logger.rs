use std::fmt::Debug;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{ConfigError, LoggingConfig};

/// Output styles selectable through `logging.format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    /// One OpenTelemetry-shaped JSON object per line.
    Json,
    /// Multi-line human-readable output. Also used for unknown values.
    Console,
}

impl LogFormat {
    fn from_config(format: &str) -> Self {
        if format.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Console
        }
    }
}

/// Collects event fields as OTel attributes.
#[derive(Default)]
struct AttributeVisitor(Map<String, Value>);

impl AttributeVisitor {
    fn put(&mut self, field: &Field, value: impl Into<Value>) {
        self.0.insert(attribute_key(field.name()), value.into());
    }
}

impl Visit for AttributeVisitor {
    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value);
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        self.put(field, format!("{:?}", value));
    }
}

/// Tracing field names cannot contain dots; these map onto the OTel event keys.
fn attribute_key(name: &str) -> String {
    match name {
        "event_name" => "event.name".to_string(),
        "event_domain" => "event.domain".to_string(),
        other => other.to_string(),
    }
}

fn severity_number(level: &Level) -> u8 {
    match *level {
        Level::TRACE => 1,
        Level::DEBUG => 5,
        Level::INFO => 9,
        Level::WARN => 13,
        Level::ERROR => 17,
    }
}

#[derive(Serialize, Clone)]
struct Resource {
    #[serde(rename = "service.name")]
    service_name: String,
    #[serde(rename = "service.version")]
    service_version: String,
}

#[derive(Serialize)]
struct LogRecord<'a> {
    timestamp: String,
    severity_text: &'a str,
    severity_number: u8,
    body: String,
    resource: &'a Resource,
    attributes: Map<String, Value>,
}

impl<'a> LogRecord<'a> {
    fn new(
        metadata: &'a Metadata<'a>,
        resource: &'a Resource,
        mut attributes: Map<String, Value>,
    ) -> Self {
        let body = match attributes.remove("message") {
            Some(Value::String(message)) => message,
            _ => metadata.name().to_string(),
        };
        if let Some(file) = metadata.file() {
            attributes.insert("code.filepath".to_string(), file.into());
        }
        if let Some(line) = metadata.line() {
            attributes.insert("code.lineno".to_string(), line.into());
        }
        attributes.insert("code.target".to_string(), metadata.target().into());

        LogRecord {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            severity_text: metadata.level().as_str(),
            severity_number: severity_number(metadata.level()),
            body,
            resource,
            attributes,
        }
    }
}

struct OtelJsonFormatter {
    resource: Resource,
}

impl<S, N> FormatEvent<S, N> for OtelJsonFormatter
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut visitor = AttributeVisitor::default();
        event.record(&mut visitor);

        let record = LogRecord::new(event.metadata(), &self.resource, visitor.0);
        let line = serde_json::to_string(&record).map_err(|_| std::fmt::Error)?;
        writeln!(writer, "{}", line)
    }
}

/// Parse the configured level string into a filter.
pub fn parse_level(level: &str) -> Result<LevelFilter, ConfigError> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        _ => Err(ConfigError::InvalidLogLevel(level.to_string())),
    }
}

/// Install the global tracing subscriber. `RUST_LOG` directives are honoured
/// on top of the configured level.
pub fn init_logging(logging_config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = EnvFilter::builder()
        .with_default_directive(parse_level(&logging_config.level)?.into())
        .from_env_lossy();
    let registry = tracing_subscriber::registry().with(filter);

    match LogFormat::from_config(&logging_config.format) {
        LogFormat::Json => registry
            .with(fmt::layer().event_format(OtelJsonFormatter {
                resource: Resource {
                    service_name: logging_config.service_name.clone(),
                    service_version: logging_config.service_version.clone(),
                },
            }))
            .init(),
        LogFormat::Console => registry.with(fmt::layer().pretty()).init(),
    }
    Ok(())
}
