// Common test utilities for integration tests
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use http_body_util::BodyExt;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use tower::ServiceExt;

// Re-export users-api types for tests
pub use users_api::*;
pub use users_api::models::User;

pub const TEST_API_KEY: &str = "kyoubou";

pub const USERS_SCHEMA: &str = "CREATE TABLE users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    vec TEXT
)";

/// Create a test configuration backed by an in-memory SQLite datastore
pub fn test_config() -> Config {
    use users_api::config::{DatabaseConfig, SecurityConfig, ServerConfig};

    Config {
        database: DatabaseConfig {
            db_type: "sqlite".to_string(),
            host: String::new(),
            port: 0,
            username: String::new(),
            password: String::new(),
            name: ":memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        server: ServerConfig {
            port: 8787,
            host: "127.0.0.1".to_string(),
        },
        security: SecurityConfig {
            api_key: TEST_API_KEY.to_string(),
        },
    }
}

/// Single-connection in-memory pool with the users table in place
pub async fn test_pool() -> Pool<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory sqlite");

    sqlx::query(USERS_SCHEMA)
        .execute(&pool)
        .await
        .expect("failed to create users table");

    pool
}

/// Full application router plus a handle on its datastore
pub async fn test_app() -> (Router, Pool<Sqlite>) {
    let pool = test_pool().await;
    let state = AppState {
        db_pool: DatabasePool::Sqlite(pool.clone()),
        config: test_config(),
    };

    (create_app(state), pool)
}

/// Insert a row directly, bypassing the API
pub async fn insert_raw_user(pool: &Pool<Sqlite>, name: &str, email: &str, vec: Option<&str>) -> i64 {
    sqlx::query("INSERT INTO users (name, email, vec) VALUES (?, ?, ?)")
        .bind(name)
        .bind(email)
        .bind(vec)
        .execute(pool)
        .await
        .expect("failed to insert user")
        .last_insert_rowid()
}

pub async fn count_users(pool: &Pool<Sqlite>) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .expect("failed to count users")
}

/// Helper to create HTTP requests
pub struct TestRequest {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl TestRequest {
    pub fn new(method: Method, uri: &str) -> Self {
        Self {
            method,
            uri: uri.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn post(uri: &str) -> Self {
        Self::new(Method::POST, uri)
    }

    pub fn put(uri: &str) -> Self {
        Self::new(Method::PUT, uri)
    }

    pub fn delete(uri: &str) -> Self {
        Self::new(Method::DELETE, uri)
    }

    pub fn options(uri: &str) -> Self {
        Self::new(Method::OPTIONS, uri)
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Append `api_key` to the query string
    pub fn api_key(mut self, key: &str) -> Self {
        let separator = if self.uri.contains('?') { '&' } else { '?' };
        self.uri = format!("{}{}api_key={}", self.uri, separator, key);
        self
    }

    /// Authenticate with the test key
    pub fn authed(self) -> Self {
        self.api_key(TEST_API_KEY)
    }

    pub fn json_body(mut self, body: impl serde::Serialize) -> Self {
        self.body = Some(serde_json::to_string(&body).unwrap());
        self.header("Content-Type", "application/json")
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn build(self) -> Request<Body> {
        let mut request = Request::builder().method(self.method).uri(self.uri);

        for (key, value) in self.headers {
            request = request.header(key, value);
        }

        let body = self.body.unwrap_or_default();
        request.body(Body::from(body)).unwrap()
    }

    pub async fn send(self, app: &Router) -> TestResponse {
        let request = self.build();
        let response = app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body_text = String::from_utf8(body_bytes.to_vec()).unwrap_or_default();

        TestResponse {
            status,
            headers,
            body: body_text,
        }
    }
}

/// Helper for response assertions
pub struct TestResponse {
    pub status: axum::http::StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|e| panic!("Failed to parse JSON response: {}. Body: {}", e, self.body))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// The `error` field of a failure body
    pub fn error_message(&self) -> String {
        let json: serde_json::Value = self.json();
        json["error"]
            .as_str()
            .unwrap_or_else(|| panic!("No error field in body: {}", self.body))
            .to_string()
    }

    pub fn assert_status(&self, expected: axum::http::StatusCode) {
        assert_eq!(
            self.status, expected,
            "Expected status {}, got {}. Body: {}",
            expected, self.status, self.body
        );
    }

    pub fn assert_ok(&self) {
        self.assert_status(axum::http::StatusCode::OK);
    }

    pub fn assert_created(&self) {
        self.assert_status(axum::http::StatusCode::CREATED);
    }

    pub fn assert_unauthorized(&self) {
        self.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    pub fn assert_not_found(&self) {
        self.assert_status(axum::http::StatusCode::NOT_FOUND);
    }

    pub fn assert_bad_request(&self) {
        self.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }

    /// The fixed CORS header set every response carries
    pub fn assert_cors_headers(&self) {
        assert_eq!(self.header("access-control-allow-origin"), Some("*"));
        assert_eq!(
            self.header("access-control-allow-methods"),
            Some("GET, POST, PUT, DELETE, OPTIONS")
        );
        assert_eq!(
            self.header("access-control-allow-headers"),
            Some("Content-Type, X-API-Key")
        );
        assert_eq!(self.header("access-control-max-age"), Some("86400"));
    }
}

/// Every routed (method, path) pair
pub fn user_endpoints() -> Vec<(Method, &'static str)> {
    vec![
        (Method::GET, "/users"),
        (Method::POST, "/users"),
        (Method::GET, "/users/1"),
        (Method::PUT, "/users/1"),
        (Method::DELETE, "/users/1"),
    ]
}
