use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Successful body with a `content_type` field next to the payload's own fields.
///
/// Mirrors the `content_type` carried by [`ProblemDetails`](crate::ProblemDetails)
/// so clients can branch on a single field.
///
/// ```
/// use cityroute_service_shared::ServiceResponse;
///
/// let body = serde_json::to_value(ServiceResponse::new(serde_json::json!({ "hops": 2 }))).unwrap();
/// assert_eq!(body["hops"], 2);
/// assert_eq!(body["content_type"], "application/json");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    #[serde(flatten)]
    pub data: T,
    pub content_type: String,
}

impl<T> ServiceResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            content_type: JSON_CONTENT_TYPE.to_string(),
        }
    }

    pub fn into_inner(self) -> T {
        self.data
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
