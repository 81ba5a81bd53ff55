#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use chatdesk_backend::{build_router, AppState, Config};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

pub struct TestContext {
    pub app: Router,
    pub state: AppState,
    pub _dir: TempDir,
}

impl TestContext {
    pub fn new() -> TestContext {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = Config {
            secret_key: TEST_SECRET.to_string(),
            bcrypt_cost: 4,
            database_path: dir.path().join("chatdesk.db").to_string_lossy().into_owned(),
            upload_dir: dir.path().join("uploads"),
            ..Config::default()
        };
        let state = AppState::new(&config).expect("Failed to build app state");
        let app = build_router(state.clone());

        TestContext {
            app,
            state,
            _dir: dir,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(req).await.expect("Request failed");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> TestResponse {
        let form = encode_form(&[
            ("username", username),
            ("email", email),
            ("password", password),
        ]);
        self.send(form_request("/api/auth/register", form)).await
    }

    pub async fn login(&self, identifier: &str, password: &str) -> TestResponse {
        let form = encode_form(&[("username", identifier), ("password", password)]);
        self.send(form_request("/api/auth/login", form)).await
    }

    /// Register and return the bearer token
    pub async fn token_for(&self, username: &str, email: &str, password: &str) -> String {
        let response = self.register(username, email, password).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["access_token"]
            .as_str()
            .expect("access_token missing")
            .to_string()
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub fn form_request(uri: &str, form: String) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap()
}

pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn json_with_token(uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub const BOUNDARY: &str = "chatdesk-test-boundary";

pub fn upload_request(token: &str, filename: &str, contents: &[u8]) -> Request<Body> {
    multipart_request(token, "file", Some(filename), contents)
}

/// One-part multipart upload; `filename: None` sends a plain form field.
pub fn multipart_request(
    token: &str,
    field: &str,
    filename: Option<&str>,
    contents: &[u8],
) -> Request<Body> {
    let disposition = match filename {
        Some(name) => format!("form-data; name=\"{field}\"; filename=\"{name}\""),
        None => format!("form-data; name=\"{field}\""),
    };

    let mut body = Vec::with_capacity(contents.len() + 256);
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: {disposition}\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::post("/api/documents/upload")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn encode_form(fields: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(fields).expect("Failed to encode form")
}
