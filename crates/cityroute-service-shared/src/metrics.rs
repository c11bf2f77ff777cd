//! Prometheus metrics.
//!
//! HTTP-level series are recorded by [`MetricsLayer`](crate::MetricsLayer);
//! the helpers here record routing outcomes:
//!
//! - `cityroute_routes_calculated_total{objective,algorithm,scope}`
//! - `cityroute_routes_failed_total{reason}`
//! - `cityroute_route_hops{objective}`
//! - `cityroute_city_listings_total{scope}` and `cityroute_cities_returned{scope}`
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use cityroute_service_shared::metrics::{init_metrics, metrics_handler, MetricsConfig};
//!
//! let config = MetricsConfig::from_env();
//! init_metrics(&config).expect("recorder installs once");
//! let app: Router = Router::new().route(&config.path, get(metrics_handler));
//! ```

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use cityroute_lib::Error as LibError;

const DEFAULT_METRICS_PATH: &str = "/metrics";

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Route serving the exposition text.
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: DEFAULT_METRICS_PATH.to_string(),
        }
    }
}

impl MetricsConfig {
    /// Reads `METRICS_ENABLED` (anything but `false` enables) and `METRICS_PATH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = lookup("METRICS_ENABLED")
            .map(|value| !value.trim().eq_ignore_ascii_case("false"))
            .unwrap_or(true);
        let path = lookup("METRICS_PATH")
            .map(|value| value.trim().to_string())
            .filter(|value| value.starts_with('/'))
            .unwrap_or_else(|| DEFAULT_METRICS_PATH.to_string());
        Self { enabled, path }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    Disabled,
    AlreadyInitialized,
    InstallFailed(String),
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::Disabled => f.write_str("metrics are disabled"),
            MetricsError::AlreadyInitialized => f.write_str("metrics recorder already installed"),
            MetricsError::InstallFailed(reason) => {
                write!(f, "failed to install metrics recorder: {}", reason)
            }
        }
    }
}

impl std::error::Error for MetricsError {}

/// Install the process-wide Prometheus recorder.
///
/// # Errors
///
/// [`MetricsError::Disabled`] when turned off by configuration,
/// [`MetricsError::AlreadyInitialized`] on a second call.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }
    if PROMETHEUS_HANDLE.get().is_some() {
        return Err(MetricsError::AlreadyInitialized);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;
    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)
}

pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// Exposition text, or a comment line when no recorder is installed.
pub async fn metrics_handler() -> String {
    match prometheus_handle() {
        Some(handle) => handle.render(),
        None => "# metrics recorder not installed\n".to_string(),
    }
}

pub fn record_route_calculated(objective: &str, algorithm: &str, scope: &str) {
    metrics::counter!(
        "cityroute_routes_calculated_total",
        "objective" => objective.to_string(),
        "algorithm" => algorithm.to_string(),
        "scope" => scope.to_string()
    )
    .increment(1);
}

/// `reason` comes from [`failure_reason`], or is `invalid_request` for
/// requests rejected before planning.
pub fn record_route_failed(reason: &str) {
    metrics::counter!("cityroute_routes_failed_total", "reason" => reason.to_string())
        .increment(1);
}

pub fn record_route_hops(hops: usize, objective: &str) {
    metrics::histogram!("cityroute_route_hops", "objective" => objective.to_string())
        .record(hops as f64);
}

pub fn record_cities_listed(count: usize, scope: &str) {
    metrics::counter!("cityroute_city_listings_total", "scope" => scope.to_string())
        .increment(1);
    metrics::histogram!("cityroute_cities_returned", "scope" => scope.to_string())
        .record(count as f64);
}

/// Label for `cityroute_routes_failed_total`.
pub fn failure_reason(error: &LibError) -> &'static str {
    match error {
        LibError::UnknownCity { .. } => "unknown_city",
        LibError::RouteNotFound { .. } => "no_path",
        LibError::UnknownScope { .. } => "invalid_request",
        LibError::ScopeNotLoaded { .. } => "scope_not_loaded",
        _ => "internal_error",
    }
}
