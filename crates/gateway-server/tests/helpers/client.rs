//! Test client helpers.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, StatusCode, header},
};
use gateway_server::metrics::setup::detached_handle;
use gateway_server::{AppState, ServerMode, create_router};
use gateway_store::{GatewayStore, MemoryStore};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// Helper para tests de integracion HTTP.
pub struct TestClient {
    app: Router,
}

impl TestClient {
    /// Crea un nuevo test client con el router proporcionado.
    pub fn new(app: Router) -> Self {
        Self { app }
    }

    /// Hace un GET request.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.get_with_headers(uri, vec![]).await
    }

    /// Hace un GET request con headers personalizados.
    pub async fn get_with_headers(&self, uri: &str, headers: Vec<(&str, &str)>) -> TestResponse {
        let mut builder = Request::builder().uri(uri).method(Method::GET);

        for (name, value) in headers {
            builder = builder.header(name, value);
        }

        self.request(builder.body(Body::empty()).unwrap()).await
    }

    /// POST con body JSON.
    pub async fn post_json(&self, uri: &str, body: &Value) -> TestResponse {
        self.post_raw(uri, "application/json", body.to_string()).await
    }

    /// POST con body `application/x-www-form-urlencoded`.
    pub async fn post_form(&self, uri: &str, body: &str) -> TestResponse {
        self.post_raw(uri, "application/x-www-form-urlencoded", body.to_string())
            .await
    }

    /// POST con content type y body arbitrarios.
    pub async fn post_raw(&self, uri: &str, content_type: &str, body: String) -> TestResponse {
        self.request(
            Request::builder()
                .uri(uri)
                .method(Method::POST)
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    /// Ejecuta un request arbitrario.
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        TestResponse::from_response(response).await
    }
}

/// Wrapper sobre Response con helpers para assertions.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    async fn from_response(response: Response<Body>) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes()
            .to_vec();

        Self {
            status,
            headers,
            body,
        }
    }

    /// Retorna el body como string.
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Body is not valid UTF-8")
    }

    /// Parsea el body como JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON")
    }

    /// Envelope status (`0`, `1001`, `1002`).
    pub fn api_status(&self) -> i64 {
        let json: Value = self.json();
        json["status"]
            .as_i64()
            .unwrap_or_else(|| panic!("Envelope without status: {}", self.text()))
    }

    /// The envelope's `data` field.
    pub fn data(&self) -> Value {
        let json: Value = self.json();
        json["data"].clone()
    }

    /// Retorna un header especifico.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Verifica que el status sea el esperado.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
        self
    }

    /// Verifica HTTP 200 y el status del envelope.
    pub fn assert_api_status(&self, expected: i64) -> &Self {
        self.assert_status(StatusCode::OK);
        assert_eq!(
            self.api_status(),
            expected,
            "Unexpected envelope status. Body: {}",
            self.text()
        );
        self
    }

    /// Verifica que un header exista.
    pub fn assert_header_exists(&self, name: &str) -> &Self {
        assert!(
            self.headers.contains_key(name),
            "Expected header '{}' to exist",
            name
        );
        self
    }

    /// Verifica que un header tenga un valor especifico.
    pub fn assert_header(&self, name: &str, expected: &str) -> &Self {
        let value = self
            .header(name)
            .unwrap_or_else(|| panic!("Header '{}' not found", name));

        assert_eq!(
            value, expected,
            "Expected header '{}' to be '{}' but got '{}'",
            name, expected, value
        );
        self
    }
}

/// A router over a fresh in-memory store, with handles to poke at both.
pub struct TestApp {
    pub client: TestClient,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

/// App in release mode over an empty store.
pub fn app() -> TestApp {
    app_with(MemoryStore::new(), ServerMode::Release)
}

pub fn app_with(store: MemoryStore, mode: ServerMode) -> TestApp {
    let store = Arc::new(store);
    let dyn_store: Arc<dyn GatewayStore> = store.clone();
    let state = AppState::new(dyn_store, mode);
    let router = create_router(state.clone(), detached_handle());

    TestApp {
        client: TestClient::new(router),
        store,
        state,
    }
}
