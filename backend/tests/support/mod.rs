#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use ercole_api::auth::BasicAuthProvider;
use ercole_api::config::Configuration;
use ercole_api::export::XLSX_CONTENT_TYPE;
use ercole_api::http::{create_router, AppState};
use ercole_api::model::User;
use ercole_api::service::{ApiService, Clock, LocalService};

/// Instant every test request sees as "now".
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2019, 11, 5, 14, 2, 3).unwrap()
}

/// Non-admin account seeded in every [`TestApp`].
pub const PLAIN_USER: &str = "mario";
pub const PLAIN_PASSWORD: &str = "rossi";

/// Router over a fresh [`LocalService`], plus tokens to call it with.
pub struct TestApp {
    pub service: LocalService,
    pub router: Router,
    pub admin_token: String,
    pub user_token: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Configuration::default())
    }

    pub fn read_only() -> Self {
        let mut config = Configuration::default();
        config.api_service.read_only = true;
        Self::with_config(config)
    }

    pub fn with_config(mut config: Configuration) -> Self {
        config.api_service.authentication_provider.secret_key = "test-secret".to_string();

        let clock: Clock = Arc::new(test_now);
        let service = LocalService::new().recording().with_clock(clock.clone());
        service.seed_user(User {
            username: PLAIN_USER.to_string(),
            password: PLAIN_PASSWORD.to_string(),
            ..Default::default()
        });

        let shared: Arc<dyn ApiService> = Arc::new(service.clone());
        let authenticator = BasicAuthProvider::new(
            config.api_service.authentication_provider.clone(),
            shared.clone(),
            clock.clone(),
        );
        let admin_token = authenticator
            .issue_token(&config.api_service.authentication_provider.username)
            .unwrap();
        let user_token = authenticator.issue_token(PLAIN_USER).unwrap();

        let state = AppState::new(config, shared, Arc::new(authenticator)).with_clock(clock);
        Self {
            service,
            router: create_router(state),
            admin_token,
            user_token,
        }
    }

    /// Send a request as the configured administrator.
    pub async fn send(&self, method: Method, uri: &str, body: Body) -> TestResponse {
        self.send_with(method, uri, body, &[]).await
    }

    pub async fn send_with(
        &self,
        method: Method,
        uri: &str,
        body: Body,
        headers: &[(header::HeaderName, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.admin_token));
        for (name, value) in headers {
            builder = builder.header(name, *value);
        }
        self.call(builder.body(body).unwrap()).await
    }

    pub async fn send_as(&self, token: &str, method: Method, uri: &str, body: Body) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(body)
            .unwrap();
        self.call(request).await
    }

    /// Send an already built request, untouched.
    pub async fn call(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse { status, headers, body }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, Body::empty()).await
    }

    pub async fn get_xlsx(&self, uri: &str) -> TestResponse {
        self.send_with(Method::GET, uri, Body::empty(), &[(header::ACCEPT, XLSX_CONTENT_TYPE)])
            .await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, Body::empty()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Body::from(body.to_string())).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Body::from(body.to_string())).await
    }

    pub async fn post_text(&self, uri: &str, text: &str) -> TestResponse {
        self.send(Method::POST, uri, Body::from(text.to_string())).await
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    /// `error` field of an error body.
    pub fn error(&self) -> String {
        self.json()["error"].as_str().unwrap_or_default().to_string()
    }

    pub fn message(&self) -> String {
        self.json()["message"].as_str().unwrap_or_default().to_string()
    }

    pub fn content_type(&self) -> &str {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

/// Read the first sheet of a workbook back as rows of strings.
pub fn read_xlsx(bytes: &[u8]) -> Vec<Vec<String>> {
    use calamine::{Reader, Xlsx};

    let mut workbook: Xlsx<_> = Xlsx::new(std::io::Cursor::new(bytes.to_vec())).unwrap();
    let range = workbook.worksheet_range_at(0).unwrap().unwrap();
    range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}
