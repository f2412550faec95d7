//! Access control by API group and client IP.

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::info;

use crate::config::ServerMode;
use crate::error::AppError;
use crate::routes;
use crate::state::AppState;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Rejects grouped routes whose client IP is not on the group's whitelist.
///
/// Nothing is restricted in [`ServerMode::Dev`] or for paths outside the
/// route table.
pub async fn access_control(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if state.mode() == ServerMode::Dev {
        return next.run(request).await;
    }

    let Some(group) = routes::group_for(request.uri().path()) else {
        return next.run(request).await;
    };

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(request.headers(), peer);

    if state.whitelist().check(group, &ip).await {
        return next.run(request).await;
    }

    info!(group, client_ip = %ip, path = %request.uri().path(), "Request rejected by whitelist");
    AppError::Forbidden("IP not in whitelist".to_string()).into_response()
}

/// Resolves the client address: first `X-Forwarded-For` hop, then
/// `X-Real-IP`, then the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(first) = header(X_FORWARDED_FOR)
        .and_then(|forwarded| forwarded.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return first.to_string();
    }

    if let Some(real_ip) = header(X_REAL_IP) {
        return real_ip.to_string();
    }

    peer.map(|addr| addr.ip().to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let map = headers(&[
            (X_FORWARDED_FOR, " 203.0.113.7 , 10.0.0.1"),
            (X_REAL_IP, "198.51.100.1"),
        ]);

        assert_eq!(client_ip(&map, None), "203.0.113.7");
    }

    #[test]
    fn test_real_ip_then_peer() {
        let peer: SocketAddr = "192.0.2.9:5555".parse().unwrap();

        assert_eq!(
            client_ip(&headers(&[(X_REAL_IP, "198.51.100.1")]), Some(peer)),
            "198.51.100.1"
        );
        assert_eq!(client_ip(&HeaderMap::new(), Some(peer)), "192.0.2.9");
        assert_eq!(client_ip(&HeaderMap::new(), None), "");
    }
}
