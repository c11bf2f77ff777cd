//! Route planning microservice.
//!
//! Endpoints:
//!
//! - `POST /shortest-path` with `{"source", "destination", "mode"?, "scope"?, "algorithm"?}`
//! - `GET /cities?scope=global|domestic`
//! - `GET /metrics`
//! - `GET /health/live` and `GET /health/ready`
//!
//! Environment:
//!
//! - `CITYROUTE_GLOBAL_ROUTES` / `CITYROUTE_DOMESTIC_ROUTES`: route tables per scope
//! - `SERVICE_PORT` (falling back to `PORT`, default 5000)
//! - `LOG_FORMAT`, `RUST_LOG`, `METRICS_ENABLED`, `METRICS_PATH`

use std::net::SocketAddr;

use axum::{
    Extension, Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response as AxumResponse},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};

use cityroute_lib::{
    Error as LibError, GraphScope, PathResult, RouteAlgorithm, RouteObjective, RouteRequest,
    plan_route,
};
use cityroute_service_shared::{
    AppState, CitiesQuery, LoggingConfig, MetricsConfig, MetricsLayer, ProblemDetails, RequestId,
    ServiceResponse, ShortestPathRequest, StateConfig, Validate, failure_reason, from_lib_error,
    health_live, health_ready, init_logging, init_metrics, metrics_handler, record_cities_listed,
    record_route_calculated, record_route_failed, record_route_hops,
};

const DEFAULT_PORT: u16 = 5000;

/// Position of a city along a returned path.
#[derive(Debug, Serialize)]
struct PathCoordinate {
    city: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Body returned by `POST /shortest-path`.
#[derive(Debug, Serialize)]
struct ShortestPathResponse {
    path: Vec<String>,
    coords: Vec<PathCoordinate>,
    distance: f64,
    time: f64,
    cost: f64,
    objective: RouteObjective,
    scope: GraphScope,
    algorithm: RouteAlgorithm,
    hops: usize,
}

#[derive(Debug, Serialize)]
struct CityEntry {
    name: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Body returned by `GET /cities`.
#[derive(Debug, Serialize)]
struct CitiesResponse {
    scope: GraphScope,
    cities: Vec<CityEntry>,
}

/// Response type for handlers that can fail with a problem document.
enum Response<T> {
    Success(ServiceResponse<T>),
    Error(ProblemDetails),
}

impl<T: Serialize> IntoResponse for Response<T> {
    fn into_response(self) -> AxumResponse {
        match self {
            Response::Success(data) => (StatusCode::OK, data).into_response(),
            Response::Error(problem) => problem.into_response(),
        }
    }
}

impl<T> From<Box<ProblemDetails>> for Response<T> {
    fn from(problem: Box<ProblemDetails>) -> Self {
        Response::Error(*problem)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service("cityroute-service-route");
    init_logging(&logging_config);

    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        warn!(error = %e, "metrics disabled");
    }

    let config = StateConfig::from_env();
    let state = AppState::load(&config).map_err(|e| {
        error!(error = %e, "failed to load route tables");
        e
    })?;
    info!(
        scopes = ?state.catalog().scopes().collect::<Vec<_>>(),
        cities = state.catalog().total_cities(),
        "application state loaded"
    );

    let port = service_port(
        std::env::var("SERVICE_PORT").ok().as_deref(),
        std::env::var("PORT").ok().as_deref(),
    );
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "route service listening");

    axum::serve(listener, app(state, &metrics_config.path)).await?;
    Ok(())
}

/// Resolve the listen port from `SERVICE_PORT`, then `PORT`.
fn service_port(service_port: Option<&str>, port: Option<&str>) -> u16 {
    [service_port, port]
        .into_iter()
        .flatten()
        .find_map(|value| value.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

fn app(state: AppState, metrics_path: &str) -> Router {
    Router::new()
        .route("/shortest-path", post(shortest_path_handler))
        .route("/cities", get(cities_handler))
        .route(metrics_path, get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(MetricsLayer)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn shortest_path_handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<ShortestPathRequest>, JsonRejection>,
) -> Response<ShortestPathResponse> {
    let request_id = request_id.as_str();

    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            record_route_failed("invalid_request");
            return Response::Error(ProblemDetails::bad_request(
                rejection.body_text(),
                request_id,
            ));
        }
    };

    if let Err(problem) = request.validate(request_id) {
        record_route_failed("invalid_request");
        return problem.into();
    }

    match compute_route(&state, &request) {
        Ok(response) => {
            record_route_calculated(
                response.objective.as_str(),
                &response.algorithm.to_string(),
                response.scope.as_str(),
            );
            record_route_hops(response.hops, response.objective.as_str());
            Response::Success(ServiceResponse::new(response))
        }
        Err(err) => {
            record_route_failed(failure_reason(&err));
            debug!(error = %err, request_id, "route request failed");
            Response::Error(from_lib_error(&err, request_id))
        }
    }
}

fn compute_route(
    state: &AppState,
    request: &ShortestPathRequest,
) -> Result<ShortestPathResponse, LibError> {
    let scope = request.graph_scope()?;
    let graph = state.graph(scope)?;

    let route_request = RouteRequest::new(
        request.source.as_str(),
        request.destination.as_str(),
        request.mode,
    )
    .with_algorithm(request.algorithm);
    let plan = plan_route(&graph, &route_request)?;

    let coords = plan
        .steps
        .iter()
        .map(|&index| {
            let coordinate = graph.coordinate_at(index);
            PathCoordinate {
                city: graph.name_of(index).unwrap_or_default().to_string(),
                lat: coordinate.map(|c| c.lat),
                lon: coordinate.map(|c| c.lon),
            }
        })
        .collect();
    let result = PathResult::from_plan(&graph, &plan);

    Ok(ShortestPathResponse {
        path: result.path,
        coords,
        distance: result.distance,
        time: result.time,
        cost: result.cost,
        objective: plan.objective,
        scope,
        algorithm: plan.algorithm,
        hops: plan.hop_count(),
    })
}

async fn cities_handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<CitiesQuery>,
) -> Response<CitiesResponse> {
    let request_id = request_id.as_str();

    if let Err(problem) = query.validate(request_id) {
        return problem.into();
    }

    let (scope, graph) = match query
        .graph_scope()
        .and_then(|scope| state.graph(scope).map(|graph| (scope, graph)))
    {
        Ok(found) => found,
        Err(err) => return Response::Error(from_lib_error(&err, request_id)),
    };

    let cities: Vec<CityEntry> = graph
        .cities()
        .map(|city| CityEntry {
            name: city.name.to_string(),
            lat: city.coordinate.map(|c| c.lat),
            lon: city.coordinate.map(|c| c.lon),
        })
        .collect();
    record_cities_listed(cities.len(), scope.as_str());

    Response::Success(ServiceResponse::new(CitiesResponse { scope, cities }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use cityroute_service_shared::test_utils::{
        empty_state, fixture_cities::*, global_only_state, test_state,
    };

    fn server(state: AppState) -> TestServer {
        TestServer::new(app(state, "/metrics")).unwrap()
    }

    fn path_of(body: &Value) -> Vec<String> {
        body["path"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    fn assert_close(actual: &Value, expected: f64) {
        let actual = actual.as_f64().unwrap();
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[tokio::test]
    async fn shortest_path_defaults_to_shortest_on_global() {
        let response = server(test_state())
            .post("/shortest-path")
            .json(&json!({ "source": LONDON, "destination": BERLIN }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(path_of(&body), vec!["London", "Amsterdam", "Berlin"]);
        assert_close(&body["distance"], 935.0);
        assert_eq!(body["objective"], "shortest");
        assert_eq!(body["scope"], "global");
        assert_eq!(body["algorithm"], "dense");
        assert_eq!(body["hops"], 2);
        assert_eq!(body["content_type"], "application/json");
        assert_eq!(body["coords"][0]["city"], "London");
        assert!(body["coords"][0]["lat"].is_number());
    }

    #[tokio::test]
    async fn each_objective_minimises_its_own_dimension() {
        let server = server(test_state());

        let fastest: Value = server
            .post("/shortest-path")
            .json(&json!({ "source": LONDON, "destination": ROME, "mode": "fastest" }))
            .await
            .json();
        assert_eq!(path_of(&fastest), vec!["London", "Berlin", "Rome"]);
        assert_close(&fastest["time"], 4.0);

        let cheapest: Value = server
            .post("/shortest-path")
            .json(&json!({
                "source": LONDON,
                "destination": BERLIN,
                "mode": "cheapest",
                "algorithm": "heap"
            }))
            .await
            .json();
        assert_eq!(path_of(&cheapest), vec!["London", "Paris", "Berlin"]);
        assert_close(&cheapest["cost"], 200.0);
        assert_eq!(cheapest["algorithm"], "heap");
    }

    #[tokio::test]
    async fn unknown_mode_falls_back_to_shortest() {
        let body: Value = server(test_state())
            .post("/shortest-path")
            .json(&json!({ "source": LONDON, "destination": BERLIN, "mode": "scenic" }))
            .await
            .json();
        assert_eq!(body["objective"], "shortest");
        assert_eq!(path_of(&body), vec!["London", "Amsterdam", "Berlin"]);
    }

    #[tokio::test]
    async fn null_or_numeric_mode_falls_back_to_shortest() {
        let server = server(test_state());

        for mode in [Value::Null, json!(7)] {
            let response = server
                .post("/shortest-path")
                .json(&json!({ "source": LONDON, "destination": BERLIN, "mode": mode }))
                .await;

            assert_eq!(response.status_code(), StatusCode::OK);
            let body: Value = response.json();
            assert_eq!(body["objective"], "shortest");
            assert_eq!(path_of(&body), vec!["London", "Amsterdam", "Berlin"]);
        }
    }

    #[tokio::test]
    async fn domestic_scope_uses_its_own_graph() {
        let body: Value = server(test_state())
            .post("/shortest-path")
            .json(&json!({
                "source": DELHI,
                "destination": CHENNAI,
                "mode": "cheapest",
                "scope": "domestic"
            }))
            .await
            .json();
        assert_eq!(path_of(&body), vec!["Delhi", "Kolkata", "Chennai"]);
        assert_close(&body["cost"], 11300.0);
        assert_eq!(body["scope"], "domestic");
    }

    #[tokio::test]
    async fn unknown_city_is_not_found_with_suggestions() {
        let response = server(test_state())
            .post("/shortest-path")
            .json(&json!({ "source": "Londn", "destination": BERLIN }))
            .await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["type"], "/problems/unknown-city");
        assert!(body["detail"].as_str().unwrap().contains("London"));
    }

    #[tokio::test]
    async fn disconnected_cities_have_no_route() {
        let response = server(test_state())
            .post("/shortest-path")
            .json(&json!({ "source": LONDON, "destination": NUUK }))
            .await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["type"], "/problems/route-not-found");
    }

    #[tokio::test]
    async fn invalid_requests_are_rejected() {
        let server = server(test_state());

        let blank = server
            .post("/shortest-path")
            .json(&json!({ "source": " ", "destination": BERLIN }))
            .await;
        assert_eq!(blank.status_code(), StatusCode::BAD_REQUEST);

        let missing = server
            .post("/shortest-path")
            .json(&json!({ "source": LONDON }))
            .await;
        assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = missing.json();
        assert_eq!(body["type"], "/problems/invalid-request");

        let scope = server
            .post("/shortest-path")
            .json(&json!({ "source": LONDON, "destination": BERLIN, "scope": "regional" }))
            .await;
        assert_eq!(scope.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unloaded_scope_is_unavailable() {
        let response = server(global_only_state())
            .post("/shortest-path")
            .json(&json!({ "source": DELHI, "destination": CHENNAI, "scope": "domestic" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn cities_are_listed_in_load_order() {
        let server = server(test_state());

        let global: Value = server.get("/cities").await.json();
        assert_eq!(global["scope"], "global");
        let names: Vec<&str> = global["cities"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names.first(), Some(&"London"));
        assert_eq!(names.len(), 9);

        let domestic: Value = server
            .get("/cities")
            .add_query_param("scope", "domestic")
            .await
            .json();
        assert_eq!(domestic["cities"][0]["name"], "Delhi");

        let unknown = server
            .get("/cities")
            .add_query_param("scope", "regional")
            .await;
        assert_eq!(unknown.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn readiness_depends_on_loaded_cities() {
        let ready = server(test_state()).get("/health/ready").await;
        assert_eq!(ready.status_code(), StatusCode::OK);

        let empty = server(empty_state()).get("/health/ready").await;
        assert_eq!(empty.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let live = server(empty_state()).get("/health/live").await;
        assert_eq!(live.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn request_id_is_echoed_into_problems() {
        let response = server(test_state())
            .post("/shortest-path")
            .add_header(
                HeaderName::from_static("x-request-id"),
                HeaderValue::from_static("req-42"),
            )
            .json(&json!({ "source": LONDON, "destination": NUUK }))
            .await;

        assert_eq!(response.header("x-request-id"), "req-42");
        let body: Value = response.json();
        assert_eq!(body["instance"], "req-42");
    }

    #[test]
    fn port_prefers_service_port_then_port() {
        assert_eq!(service_port(Some("8080"), Some("9000")), 8080);
        assert_eq!(service_port(None, Some("9000")), 9000);
        assert_eq!(service_port(Some("abc"), None), DEFAULT_PORT);
        assert_eq!(service_port(None, None), DEFAULT_PORT);
    }
}
