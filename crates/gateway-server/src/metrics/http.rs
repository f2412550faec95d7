//! HTTP metrics middleware.

use std::time::Instant;

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};
use metrics::{counter, histogram};

use crate::routes;

pub const HTTP_REQUESTS_TOTAL: &str = "gateway_http_requests_total";
pub const HTTP_REQUEST_DURATION: &str = "gateway_http_request_duration_seconds";
pub const HTTP_FORBIDDEN_TOTAL: &str = "gateway_http_forbidden_total";

/// Records request count and latency, labelled by route and API group.
pub async fn http_metrics_middleware(
    matched_path: Option<MatchedPath>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    // paths sin ruta se agrupan para no disparar la cardinalidad
    let path = matched_path
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let group = routes::group_for(&path).unwrap_or("none");

    let response = next.run(request).await;
    let status = response.status();

    counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.clone(),
        "path" => path.clone(),
        "group" => group,
        "status" => status.as_u16().to_string()
    )
    .increment(1);

    if status == axum::http::StatusCode::FORBIDDEN {
        counter!(HTTP_FORBIDDEN_TOTAL, "group" => group).increment(1);
    }

    histogram!(HTTP_REQUEST_DURATION, "method" => method, "path" => path)
        .record(start.elapsed().as_secs_f64());

    response
}

/// Describes the HTTP metrics to the installed recorder.
pub fn register_http_metrics() {
    metrics::describe_counter!(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests");
    metrics::describe_counter!(
        HTTP_FORBIDDEN_TOTAL,
        "Requests rejected by the whitelist, per API group"
    );
    metrics::describe_histogram!(
        HTTP_REQUEST_DURATION,
        "HTTP request duration in seconds"
    );
}
