//! Middleware que genera o propaga X-Request-Id.
//!
//! Incoming ids are reused when they look sane (short, visible ASCII);
//! anything else is replaced by a fresh UUID v7 so log lines stay sortable.

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request, Response},
};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use uuid::Uuid;

/// Header name for request ID.
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

const MAX_INCOMING_ID_LEN: usize = 128;

/// The id assigned to the current request, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns the caller's id if it can be echoed back safely.
fn incoming_id(request: &Request<Body>) -> Option<HeaderValue> {
    let value = request.headers().get(&REQUEST_ID_HEADER)?;
    let text = value.to_str().ok()?;
    let sane = !text.is_empty()
        && text.len() <= MAX_INCOMING_ID_LEN
        && text.bytes().all(|b| b.is_ascii_graphic());
    sane.then(|| value.clone())
}

fn generated_id() -> HeaderValue {
    // un UUID siempre es ASCII valido
    HeaderValue::from_str(&Uuid::now_v7().to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("invalid-request-id"))
}

/// Layer that tags every request and response with a request id.
#[derive(Clone, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdMiddleware { inner }
    }
}

#[derive(Clone)]
pub struct RequestIdMiddleware<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestIdMiddleware<S>
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

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let value = incoming_id(&request).unwrap_or_else(generated_id);

        let id = value.to_str().unwrap_or_default().to_string();
        request
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), value.clone());
        request.extensions_mut().insert(RequestId(id));

        let mut inner = self.inner.clone();

        Box::pin(async move {
            let mut response = inner.call(request).await?;
            response.headers_mut().insert(REQUEST_ID_HEADER.clone(), value);
            Ok(response)
        })
    }
}
