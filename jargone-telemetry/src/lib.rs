//! # jargone-telemetry
//!
//! Logging setup for Jargone binaries.
//!
//! - [`init_telemetry`] installs a human-readable `tracing` subscriber
//! - [`init_json_telemetry`] writes JSON lines instead
//! - [`SpanCapture`] records closed spans in memory, for tests and diagnostics
//!
//! Both initialisers honour `RUST_LOG` and fall back to `info`.
//!
//! ```rust,ignore
//! jargone_telemetry::init_telemetry("jargone")?;
//! tracing::info!("ready");
//! ```

pub mod capture;
pub mod init;

pub use capture::{CapturedSpan, SpanCapture, SpanCaptureLayer};
pub use init::{
    DEFAULT_FILTER, LogFormat, TelemetryError, init, init_json_telemetry, init_telemetry,
    init_with_capture,
};
