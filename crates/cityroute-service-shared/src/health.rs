//! Liveness and readiness probes.

use std::collections::BTreeMap;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use cityroute_lib::{GraphCatalog, GraphScope};

use crate::AppState;

const SERVICE: &str = "cityroute";

/// Body returned by both probes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `ok`, or `not_ready: <reason>` when the readiness probe fails.
    pub status: String,
    pub service: String,
    pub version: String,
    /// Vertex count per loaded scope; readiness only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cities_loaded: Option<BTreeMap<GraphScope, usize>>,
}

impl HealthStatus {
    fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            service: SERVICE.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            cities_loaded: None,
        }
    }

    pub fn alive() -> Self {
        Self::with_status("ok")
    }

    /// Readiness of `catalog`: ready once any loaded graph holds a city.
    pub fn readiness(catalog: &GraphCatalog) -> (StatusCode, Self) {
        if catalog.total_cities() == 0 {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Self::with_status("not_ready: no cities loaded"),
            );
        }

        let counts = catalog
            .scopes()
            .filter_map(|scope| catalog.get(scope).ok().map(|g| (scope, g.vertex_count())))
            .collect();
        let mut status = Self::with_status("ok");
        status.cities_loaded = Some(counts);
        (StatusCode::OK, status)
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// `GET /health/live`
pub async fn health_live() -> impl IntoResponse {
    Json(HealthStatus::alive())
}

/// `GET /health/ready`
pub async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    let (code, status) = HealthStatus::readiness(state.catalog());
    (code, Json(status))
}
