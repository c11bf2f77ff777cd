//! Request correlation and HTTP metrics.
//!
//! [`MetricsLayer`] wraps every route. For each request it resolves a
//! [`RequestId`] (the `X-Request-ID` header, or a fresh UUID v7), stores it as
//! a request extension for handlers, runs the handler inside a `request` span,
//! and on completion records:
//!
//! - `http_requests_total{method,path,status}` (status is `2xx`..`5xx`)
//! - `http_request_duration_seconds{method,path}`
//! - `http_request_size_bytes` / `http_response_size_bytes{method,path}`
//!
//! `path` is the matched route template (`/cities`, not `/cities?scope=x`);
//! requests that match no route share the `unmatched` label. The same ID is
//! written back on the response.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::extract::MatchedPath;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, Response};
use pin_project_lite::pin_project;
use tower::{Layer, Service};
use tracing::{info_span, Span};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Metric path label for requests no route matched.
const UNMATCHED_PATH: &str = "unmatched";

/// Correlation ID shared by logs, problem documents, and the response header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Client-supplied ID when present and non-blank, otherwise a new one.
pub fn extract_or_generate_request_id(headers: &HeaderMap) -> RequestId {
    let supplied = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    match supplied {
        Some(id) => RequestId::new(id),
        None => RequestId::generate(),
    }
}

/// Path without its query string.
pub fn normalize_path(path: &str) -> &str {
    match path.split_once('?') {
        Some((base, _)) => base,
        None => path,
    }
}

fn status_bucket(status: u16) -> &'static str {
    match status / 100 {
        2 => "2xx",
        3 => "3xx",
        4 => "4xx",
        5 => "5xx",
        _ => "other",
    }
}

fn content_length(headers: &HeaderMap) -> Option<f64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// Metric labels captured when a request arrives.
#[derive(Debug, Clone)]
struct RequestLabels {
    method: String,
    /// Route template, so the label set stays bounded.
    path: String,
}

impl RequestLabels {
    fn of<B>(req: &Request<B>) -> Self {
        let path = req
            .extensions()
            .get::<MatchedPath>()
            .map(|matched| matched.as_str().to_string())
            .unwrap_or_else(|| UNMATCHED_PATH.to_string());
        Self {
            method: req.method().as_str().to_string(),
            path,
        }
    }

    fn record_request_size(&self, size: f64) {
        metrics::histogram!(
            "http_request_size_bytes",
            "method" => self.method.clone(),
            "path" => self.path.clone()
        )
        .record(size);
    }

    fn record_completion(&self, bucket: &'static str, elapsed_secs: f64, response_size: Option<f64>) {
        metrics::counter!(
            "http_requests_total",
            "method" => self.method.clone(),
            "path" => self.path.clone(),
            "status" => bucket
        )
        .increment(1);
        metrics::histogram!(
            "http_request_duration_seconds",
            "method" => self.method.clone(),
            "path" => self.path.clone()
        )
        .record(elapsed_secs);
        if let Some(size) = response_size {
            metrics::histogram!(
                "http_response_size_bytes",
                "method" => self.method.clone(),
                "path" => self.path.clone()
            )
            .record(size);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsLayer;

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsMiddleware { inner }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsMiddleware<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for MetricsMiddleware<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = MetricsFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let labels = RequestLabels::of(&req);
        if let Some(size) = content_length(req.headers()) {
            labels.record_request_size(size);
        }

        let request_id = extract_or_generate_request_id(req.headers());
        req.extensions_mut().insert(request_id.clone());

        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %labels.method,
            path = %normalize_path(req.uri().path()),
        );
        let inner = {
            let _guard = span.enter();
            tracing::debug!("request received");
            self.inner.call(req)
        };

        MetricsFuture {
            inner,
            started: Instant::now(),
            labels,
            request_id,
            span,
        }
    }
}

pin_project! {
    /// Completes the inner future, then records metrics and tags the response.
    pub struct MetricsFuture<F> {
        #[pin]
        inner: F,
        started: Instant,
        labels: RequestLabels,
        request_id: RequestId,
        span: Span,
    }
}

impl<F, ResBody, E> Future for MetricsFuture<F>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let _guard = this.span.enter();

        let outcome = match this.inner.poll(cx) {
            Poll::Ready(outcome) => outcome,
            Poll::Pending => return Poll::Pending,
        };
        let elapsed = this.started.elapsed().as_secs_f64();
        let latency_ms = elapsed * 1000.0;

        Poll::Ready(match outcome {
            Ok(mut response) => {
                let status = response.status().as_u16();
                this.labels.record_completion(
                    status_bucket(status),
                    elapsed,
                    content_length(response.headers()),
                );
                if let Ok(value) = HeaderValue::from_str(this.request_id.as_str()) {
                    response.headers_mut().insert(REQUEST_ID_HEADER, value);
                }
                tracing::info!(status, latency_ms, "request completed");
                Ok(response)
            }
            Err(err) => {
                this.labels.record_completion("5xx", elapsed, None);
                tracing::error!(latency_ms, "request failed");
                Err(err)
            }
        })
    }
}
