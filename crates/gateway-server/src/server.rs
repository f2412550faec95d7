use std::net::SocketAddr;

use axum::{
    Router,
    http::{Method, header},
    middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{
    health::health_check,
    history::{get_player_server_list, set_user_history, set_user_state},
    metrics::metrics_handler,
    notices::{
        batch_delete_notices, create_notice, delete_notice, find_notice, get_login_notice,
        list_notices, update_notice,
    },
    servers::{change_server_state, get_server_list, report_server_list},
    whitelist::{
        add_whitelist_ip, get_all_whitelists, get_whitelist, remove_whitelist_ip, set_whitelist,
    },
};
use crate::middleware::{LoggingLayer, RequestIdLayer, access_control};
use crate::routes;
use crate::state::AppState;

/// Permissive CORS, answering preflight requests for every origin.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Builds the full application router.
pub fn create_router(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(RequestIdLayer)
        .layer(LoggingLayer);

    // Router for metrics endpoint (different state)
    let metrics_router = Router::new()
        .route(routes::METRICS, get(metrics_handler))
        .with_state(prometheus_handle);

    let api_router = Router::new()
        // out
        .route(routes::GET_SERVER_LIST, get(get_server_list))
        .route(routes::GET_PLAYER_SERVER_LIST, get(get_player_server_list))
        .route(routes::GET_LOGIN_NOTICE, get(get_login_notice))
        // sgame
        .route(routes::REPORT_SERVER_LIST, post(report_server_list))
        .route(routes::CHANGE_SERVER_STATE, post(change_server_state))
        .route(routes::SET_USER_HISTORY, post(set_user_history))
        .route(routes::SET_USER_STATE, post(set_user_state))
        // adminServer
        .route(routes::CREATE_LOGIN_NOTICE, post(create_notice))
        .route(routes::UPDATE_LOGIN_NOTICE, post(update_notice))
        .route(routes::DELETE_LOGIN_NOTICE, post(delete_notice))
        .route(routes::BATCH_DELETE_LOGIN_NOTICE, post(batch_delete_notices))
        .route(routes::FIND_LOGIN_NOTICE, get(find_notice))
        .route(routes::LIST_LOGIN_NOTICE, get(list_notices))
        .route(routes::GET_WHITELIST, get(get_whitelist))
        .route(routes::GET_ALL_WHITELISTS, get(get_all_whitelists))
        .route(routes::SET_WHITELIST, post(set_whitelist))
        .route(routes::ADD_WHITELIST_IP, post(add_whitelist_ip))
        .route(routes::REMOVE_WHITELIST_IP, post(remove_whitelist_ip))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            access_control,
        ));

    let app_router = Router::new()
        .route(routes::HEALTH, get(health_check))
        .merge(api_router)
        .with_state(state);

    Router::new()
        .merge(app_router)
        .merge(metrics_router)
        .layer(middleware::from_fn(
            crate::metrics::http::http_metrics_middleware,
        ))
        .layer(middleware_stack)
        .layer(cors_layer())
}

/// Binds `addr` and serves until Ctrl-C or SIGTERM.
pub async fn run_server(
    addr: SocketAddr,
    state: AppState,
    prometheus_handle: PrometheusHandle,
) -> Result<(), std::io::Error> {
    let app = create_router(state, prometheus_handle);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
