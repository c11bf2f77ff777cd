//! RFC 9457 problem documents returned by the route service.
//!
//! Every failure a handler can produce maps to one [`ProblemKind`], which
//! fixes the `type`, `title`, and HTTP status of the document.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use cityroute_lib::Error as LibError;

pub const PROBLEM_UNKNOWN_CITY: &str = "/problems/unknown-city";
pub const PROBLEM_ROUTE_NOT_FOUND: &str = "/problems/route-not-found";
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";
pub const PROBLEM_SERVICE_UNAVAILABLE: &str = "/problems/service-unavailable";

const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// Category of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemKind {
    /// A city name is not a vertex of the selected graph.
    UnknownCity,
    /// Both cities exist but lie in different components.
    RouteNotFound,
    /// Malformed body, blank field, or unrecognised scope.
    InvalidRequest,
    /// The requested scope has no graph loaded.
    ServiceUnavailable,
    Internal,
}

impl ProblemKind {
    pub fn type_uri(self) -> &'static str {
        match self {
            ProblemKind::UnknownCity => PROBLEM_UNKNOWN_CITY,
            ProblemKind::RouteNotFound => PROBLEM_ROUTE_NOT_FOUND,
            ProblemKind::InvalidRequest => PROBLEM_INVALID_REQUEST,
            ProblemKind::ServiceUnavailable => PROBLEM_SERVICE_UNAVAILABLE,
            ProblemKind::Internal => PROBLEM_INTERNAL_ERROR,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ProblemKind::UnknownCity => "Unknown City",
            ProblemKind::RouteNotFound => "Route Not Found",
            ProblemKind::InvalidRequest => "Invalid Request",
            ProblemKind::ServiceUnavailable => "Service Unavailable",
            ProblemKind::Internal => "Internal Error",
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            ProblemKind::UnknownCity | ProblemKind::RouteNotFound => StatusCode::NOT_FOUND,
            ProblemKind::InvalidRequest => StatusCode::BAD_REQUEST,
            ProblemKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ProblemKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Problem document serialised as `application/problem+json`.
///
/// ```
/// use cityroute_service_shared::{ProblemDetails, ProblemKind};
///
/// let problem = ProblemDetails::of(ProblemKind::RouteNotFound, "req-1")
///     .with_detail("No route exists from 'London' to 'Nuuk'");
/// assert_eq!(problem.status, 404);
/// assert_eq!(problem.instance.as_deref(), Some("req-1"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_uri: String,
    pub title: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Request ID of the failed call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    pub content_type: String,
}

impl ProblemDetails {
    /// Empty document for `kind`, tagged with the request it belongs to.
    pub fn of(kind: ProblemKind, request_id: impl Into<String>) -> Self {
        Self {
            type_uri: kind.type_uri().to_string(),
            title: kind.title().to_string(),
            status: kind.status().as_u16(),
            detail: None,
            instance: Some(request_id.into()),
            content_type: PROBLEM_CONTENT_TYPE.to_string(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::of(ProblemKind::InvalidRequest, request_id).with_detail(detail)
    }

    pub fn unknown_city(name: &str, suggestions: &[String], request_id: impl Into<String>) -> Self {
        let mut detail = format!("City '{}' not found", name);
        if !suggestions.is_empty() {
            detail.push_str(&format!(". Did you mean: {}?", suggestions.join(", ")));
        }
        Self::of(ProblemKind::UnknownCity, request_id).with_detail(detail)
    }

    pub fn route_not_found(start: &str, goal: &str, request_id: impl Into<String>) -> Self {
        Self::of(ProblemKind::RouteNotFound, request_id)
            .with_detail(format!("No route exists from '{}' to '{}'", start, goal))
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.title, detail),
            None => f.write_str(&self.title),
        }
    }
}

impl std::error::Error for ProblemDetails {}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (status, Json(self)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(PROBLEM_CONTENT_TYPE),
        );
        response
    }
}

/// Map a library failure onto the matching problem document.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::UnknownCity { name, suggestions } => {
            ProblemDetails::unknown_city(name, suggestions, request_id)
        }
        LibError::RouteNotFound { start, goal } => {
            ProblemDetails::route_not_found(start, goal, request_id)
        }
        LibError::UnknownScope { scope } => ProblemDetails::bad_request(
            format!("Unknown scope '{}'; expected 'global' or 'domestic'", scope),
            request_id,
        ),
        LibError::ScopeNotLoaded { scope } => {
            ProblemDetails::of(ProblemKind::ServiceUnavailable, request_id)
                .with_detail(format!("No route table loaded for scope '{}'", scope))
        }
        other => ProblemDetails::of(ProblemKind::Internal, request_id).with_detail(other.to_string()),
    }
}
