//! Structured logging setup.
//!
//! `LOG_FORMAT` selects `json` (default) or `text`; `RUST_LOG` overrides the
//! default `info` filter.
//!
//! ```no_run
//! use cityroute_service_shared::logging::{init_logging, LoggingConfig};
//!
//! init_logging(&LoggingConfig::from_env().with_service("cityroute-service-route"));
//! ```

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line human-readable events.
    Text,
}

impl LogFormat {
    /// `text` and `pretty` select [`LogFormat::Text`]; anything else is JSON.
    pub fn parse(value: &str) -> Self {
        if ["text", "pretty"].contains(&value.trim().to_ascii_lowercase().as_str()) {
            LogFormat::Text
        } else {
            LogFormat::Json
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Filter directive used when `RUST_LOG` is absent or unparsable.
    pub filter: String,
    pub service: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: DEFAULT_FILTER.to_string(),
            service: None,
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            format: lookup("LOG_FORMAT")
                .map(|value| LogFormat::parse(&value))
                .unwrap_or_default(),
            filter: lookup("RUST_LOG")
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FILTER.to_string()),
            service: lookup("SERVICE_NAME"),
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }
}

/// Install the global subscriber. Later calls keep the first subscriber.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_new(&config.filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().flatten_event(true).with_span_list(false))
            .try_init(),
        LogFormat::Text => registry.with(fmt::layer().pretty()).try_init(),
    };

    match result {
        Ok(()) => tracing::info!(
            service = config.service.as_deref().unwrap_or("cityroute"),
            format = ?config.format,
            "logging initialised"
        ),
        Err(_) => tracing::debug!("global subscriber already installed"),
    }
}
