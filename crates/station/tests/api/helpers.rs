use axum::{
    body::{to_bytes, Body},
    http::Request,
    response::Response,
    Router,
};
use hyper::{header, Method};
use mockall::mock;
use piwx::{app, auth, build_app_state, resolver, AppState, LocationResolver, ResolvedLocation};
use serde_json::Value;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tower::ServiceExt;

mock! {
    pub TestResolver {}

    #[async_trait::async_trait]
    impl LocationResolver for TestResolver {
        async fn resolve(
            &self,
            latitude: &str,
            longitude: &str,
        ) -> Result<ResolvedLocation, resolver::Error>;
    }
}

/// Shared secret the test apps are configured with.
pub const TEST_SECRET: &str = "test-secret";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

pub async fn spawn_app(resolver: Arc<dyn LocationResolver>) -> TestApp {
    let db_dir = std::env::temp_dir().join(format!(
        "piwx-test-{}-{}",
        std::process::id(),
        DB_COUNTER.fetch_add(1, Ordering::SeqCst)
    ));

    let app_state = build_app_state(
        db_dir.to_string_lossy().into_owned(),
        auth::credential_hash(TEST_SECRET),
        4,
        chrono_tz::America::New_York,
        resolver,
    )
    .await
    .expect("failed to build app state");

    TestApp {
        app: app(app_state.clone()),
        state: app_state,
    }
}

/// Urlencode-free form body builder; test values stay URL-safe.
pub fn form_body(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// A full observation post with the given date, overridable per field.
pub fn observation_form(date: &str, overrides: &[(&str, &str)]) -> String {
    let mut pairs = vec![
        ("credential", TEST_SECRET),
        ("date", date),
        ("ta", "21.5"),
        ("rh", "60.0"),
        ("pres", "1013.2"),
        ("wspd", "3.4"),
        ("wdir", "180.0"),
        ("solar", "450.0"),
        ("precip", "0.0"),
        ("strikes", "0.0"),
    ];

    for &(name, value) in overrides {
        match pairs.iter_mut().find(|(k, _)| *k == name) {
            Some(pair) => pair.1 = value,
            None => pairs.push((name, value)),
        }
    }

    form_body(&pairs)
}

pub async fn post_form(app: &Router, path: &str, body: String) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();

    app.clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.")
}

pub async fn get(app: &Router, path: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(path)
        .header(header::ACCEPT, "application/json")
        .body(Body::empty())
        .unwrap();

    app.clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.")
}

pub async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).expect("response body was not JSON")
}
