//! Global subscriber setup.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use crate::capture::{SpanCapture, SpanCaptureLayer};

/// Filter applied when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Errors from installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed.
    #[error("telemetry already initialized: {0}")]
    AlreadyInitialized(String),

    /// The requested log format is not known.
    #[error("unknown log format '{0}', expected 'pretty' or 'json'")]
    UnknownFormat(String),
}

/// How log lines are written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(TelemetryError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => f.write_str("pretty"),
            Self::Json => f.write_str("json"),
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a human-readable subscriber filtered by `RUST_LOG`.
pub fn init_telemetry(service_name: &str) -> Result<(), TelemetryError> {
    init(service_name, LogFormat::Pretty)
}

/// Install a JSON-lines subscriber filtered by `RUST_LOG`.
pub fn init_json_telemetry(service_name: &str) -> Result<(), TelemetryError> {
    init(service_name, LogFormat::Json)
}

/// Install the global subscriber in the given format.
///
/// # Errors
///
/// Returns [`TelemetryError::AlreadyInitialized`] when called twice.
pub fn init(service_name: &str, format: LogFormat) -> Result<(), TelemetryError> {
    install(service_name, format, None)
}

/// Install a subscriber that logs like [`init`] and also records closed
/// spans into `capture`.
pub fn init_with_capture(
    service_name: &str,
    format: LogFormat,
    capture: &SpanCapture,
) -> Result<(), TelemetryError> {
    install(service_name, format, Some(capture.layer()))
}

fn install(
    service_name: &str,
    format: LogFormat,
    capture: Option<SpanCaptureLayer>,
) -> Result<(), TelemetryError> {
    let registry = tracing_subscriber::registry().with(env_filter()).with(capture);
    let result = match format {
        LogFormat::Pretty => registry
            .with(tfmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(tfmt::layer().json().with_current_span(true).with_writer(std::io::stderr))
            .try_init(),
    };
    result.map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    tracing::info!(service.name = service_name, format = %format, "telemetry initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parses() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!(matches!("xml".parse::<LogFormat>(), Err(TelemetryError::UnknownFormat(_))));
    }

    #[test]
    fn second_init_reports_already_initialized() {
        let capture = SpanCapture::new();
        let _ = init_with_capture("test", LogFormat::Pretty, &capture);
        let second = init_telemetry("test");
        assert!(matches!(second, Err(TelemetryError::AlreadyInitialized(_))));
    }
}
