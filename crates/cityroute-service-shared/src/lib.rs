//! Building blocks for the cityroute HTTP service.
//!
//! The route binary wires these together: [`AppState`] holds one immutable
//! graph per [`GraphScope`](cityroute_lib::GraphScope), request types parse
//! and validate input, and failures leave as [`ProblemDetails`]. Logging,
//! Prometheus metrics, and request ID propagation live in [`logging`],
//! [`metrics`], and [`middleware`].
//!
//! [`test_utils`] (feature `test-utils`) loads the fixture tables for handler
//! tests in dependent crates.

mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    failure_reason, init_metrics, metrics_handler, record_cities_listed, record_route_calculated,
    record_route_failed, record_route_hops, MetricsConfig, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId, REQUEST_ID_HEADER};
pub use problem::{
    from_lib_error, ProblemDetails, ProblemKind, PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_REQUEST,
    PROBLEM_ROUTE_NOT_FOUND, PROBLEM_SERVICE_UNAVAILABLE, PROBLEM_UNKNOWN_CITY,
};
pub use request::{CitiesQuery, ShortestPathRequest, Validate};
pub use response::ServiceResponse;
pub use state::{AppState, AppStateError, GraphSourceConfig, StateConfig, DEFAULT_GLOBAL_ROUTES};
