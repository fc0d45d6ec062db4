//! Tracing subscriber setup for applications embedding the session pipeline

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{SessionError, SessionResult};

/// Output options for [`setup_logging`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Baseline level; `RUST_LOG` directives still apply on top
    pub level: Level,
    /// JSON lines instead of human-readable output
    pub json: bool,
    /// Report span open/close, which brackets each `create_session` attempt
    pub log_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

impl LoggingConfig {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            json: false,
            log_spans: false,
        }
    }

    pub fn json(self, json: bool) -> Self {
        Self { json, ..self }
    }

    pub fn log_spans(self, log_spans: bool) -> Self {
        Self { log_spans, ..self }
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn setup_logging(config: LoggingConfig) -> SessionResult<()> {
    let filter = EnvFilter::from_default_env().add_directive(config.level.into());

    let span_events = if config.log_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_span_events(span_events);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| SessionError::configuration("logging", e.to_string()))?;

    tracing::debug!(level = %config.level, json = config.json, "logging initialized");
    Ok(())
}

/// Parse a log level from a string
pub fn parse_log_level(level: &str) -> SessionResult<Level> {
    Level::from_str(level)
        .map_err(|_| SessionError::configuration("log_level", format!("invalid log level: {}", level)))
}
