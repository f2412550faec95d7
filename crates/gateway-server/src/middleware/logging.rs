//! Middleware de logging estructurado.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, Response},
};
use tower::{Layer, Service};
use tracing::{Instrument, info, info_span, warn};

use super::access::client_ip;
use super::request_id::RequestId;
use crate::routes;

/// Layer that opens one span per request and logs its outcome.
#[derive(Clone, Default)]
pub struct LoggingLayer;

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingMiddleware { inner }
    }
}

#[derive(Clone)]
pub struct LoggingMiddleware<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for LoggingMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let start = Instant::now();

        // RequestIdLayer va por fuera, la extension ya existe
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default();
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let path = request.uri().path().to_string();

        let span = info_span!(
            "http_request",
            request_id = %request_id,
            method = %request.method(),
            path = %path,
            api_group = routes::group_for(&path).unwrap_or("-"),
            client_ip = %client_ip(request.headers(), peer),
        );

        let mut inner = self.inner.clone();

        Box::pin(
            async move {
                let response = inner.call(request).await?;

                let status = response.status();
                let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                if status.is_client_error() || status.is_server_error() {
                    warn!(status = status.as_u16(), elapsed_ms, "Request failed");
                } else {
                    info!(status = status.as_u16(), elapsed_ms, "Request completed");
                }

                Ok(response)
            }
            .instrument(span),
        )
    }
}
