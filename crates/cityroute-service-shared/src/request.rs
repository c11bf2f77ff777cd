//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use cityroute_lib::{GraphScope, Result as LibResult, RouteAlgorithm, RouteObjective};

use crate::{from_lib_error, ProblemDetails};

/// Validation trait for request types.
///
/// Implementations should validate all fields and return a `ProblemDetails`
/// error for invalid input.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ProblemDetails`. Returns a boxed `ProblemDetails` to avoid
    /// large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Request for the best path between two cities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortestPathRequest {
    /// Starting city name.
    pub source: String,

    /// Destination city name.
    pub destination: String,

    /// Objective: `shortest`, `fastest`, or `cheapest`. Anything else,
    /// including `null` or a non-string, means `shortest`.
    #[serde(default, deserialize_with = "lenient_objective")]
    pub mode: RouteObjective,

    /// Graph to search: `global` (default) or `domestic`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Planner used for the search.
    #[serde(default)]
    pub algorithm: RouteAlgorithm,
}

fn lenient_objective<'de, D>(deserializer: D) -> Result<RouteObjective, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(mode) => RouteObjective::parse_lenient(&mode),
        other => {
            tracing::debug!(mode = %other, "non-string objective; using shortest");
            RouteObjective::Shortest
        }
    })
}

impl ShortestPathRequest {
    /// Scope named by the request, defaulting to global.
    pub fn graph_scope(&self) -> LibResult<GraphScope> {
        parse_scope(self.scope.as_deref())
    }
}

impl Validate for ShortestPathRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.source.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'source' field is required and cannot be empty",
                request_id,
            )));
        }

        if self.destination.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'destination' field is required and cannot be empty",
                request_id,
            )));
        }

        self.graph_scope()
            .map(|_| ())
            .map_err(|err| Box::new(from_lib_error(&err, request_id)))
    }
}

/// Query string for the city listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CitiesQuery {
    /// Graph to list: `global` (default) or `domestic`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl CitiesQuery {
    pub fn graph_scope(&self) -> LibResult<GraphScope> {
        parse_scope(self.scope.as_deref())
    }
}

impl Validate for CitiesQuery {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        self.graph_scope()
            .map(|_| ())
            .map_err(|err| Box::new(from_lib_error(&err, request_id)))
    }
}

fn parse_scope(scope: Option<&str>) -> LibResult<GraphScope> {
    match scope.map(str::trim) {
        None | Some("") => Ok(GraphScope::default()),
        Some(value) => value.parse(),
    }
}
