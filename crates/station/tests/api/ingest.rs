use crate::helpers::{
    form_body, get, json_body, observation_form, post_form, spawn_app, MockTestResolver,
    TEST_SECRET,
};
use chrono::{TimeZone, Utc};
use piwx::{resolver, ResolvedLocation, Scene};
use std::sync::Arc;

#[tokio::test]
async fn ingest_assigns_incrementing_ids() {
    let test_app = spawn_app(Arc::new(MockTestResolver::new())).await;

    let response = post_form(
        &test_app.app,
        "/update",
        observation_form("20240115120000", &[]),
    )
    .await;
    assert!(response.status().is_success());
    let ack = json_body(response).await;
    assert_eq!(ack["status"], "ok");
    assert_eq!(ack["id"], 1);

    let response = post_form(
        &test_app.app,
        "/update",
        observation_form("20240115120500", &[]),
    )
    .await;
    let ack = json_body(response).await;
    assert_eq!(ack["id"], 2);
}

#[tokio::test]
async fn wrong_credential_rejected_without_a_write() {
    let test_app = spawn_app(Arc::new(MockTestResolver::new())).await;

    let response = post_form(
        &test_app.app,
        "/update",
        observation_form("20240115120000", &[]),
    )
    .await;
    assert_eq!(json_body(response).await["id"], 1);

    let response = post_form(
        &test_app.app,
        "/update",
        observation_form("20240115120500", &[("credential", "not-the-secret")]),
    )
    .await;
    assert_eq!(response.status(), 401);
    let body = json_body(response).await;
    assert_eq!(body["error"], "auth");

    // The store's latest id is unchanged; /current surfaces it as the
    // conditions fallback.
    let response = get(&test_app.app, "/current").await;
    let report = json_body(response).await;
    assert_eq!(report["conditions"]["id"], 1);
}

#[tokio::test]
async fn missing_field_is_named() {
    let test_app = spawn_app(Arc::new(MockTestResolver::new())).await;

    // No "pres" at all
    let body = form_body(&[
        ("credential", TEST_SECRET),
        ("date", "20240115120000"),
        ("ta", "21.5"),
        ("rh", "60.0"),
        ("wspd", "3.4"),
        ("wdir", "180.0"),
        ("solar", "450.0"),
        ("precip", "0.0"),
        ("strikes", "0.0"),
    ]);
    let response = post_form(&test_app.app, "/update", body).await;
    assert_eq!(response.status(), 400);
    let body = json_body(response).await;
    assert_eq!(body["error"], "missing_field");
    assert_eq!(body["field"], "pres");

    // Nothing was written
    let response = get(&test_app.app, "/current").await;
    let report = json_body(response).await;
    assert!(report.get("conditions").is_none());
}

#[tokio::test]
async fn non_numeric_field_is_rejected() {
    let test_app = spawn_app(Arc::new(MockTestResolver::new())).await;

    let response = post_form(
        &test_app.app,
        "/update",
        observation_form("20240115120000", &[("ta", "warm")]),
    )
    .await;
    assert_eq!(response.status(), 400);
    let body = json_body(response).await;
    assert_eq!(body["error"], "invalid_value");
    assert_eq!(body["field"], "ta");
}

#[tokio::test]
async fn nearby_strike_outranks_rain() {
    let test_app = spawn_app(Arc::new(MockTestResolver::new())).await;

    // Strike five minutes before the observation, 10 km out
    let response = post_form(
        &test_app.app,
        "/strike",
        form_body(&[
            ("credential", TEST_SECRET),
            ("date", "20240615120000"),
            ("distance", "10.4"),
        ]),
    )
    .await;
    assert!(response.status().is_success());
    let ack = json_body(response).await;
    assert_eq!(ack["distance_km"], 10.0);

    // Heavy rain in the observation itself; the storm still wins
    let response = post_form(
        &test_app.app,
        "/update",
        observation_form("20240615120500", &[("precip", "5.0")]),
    )
    .await;
    let ack = json_body(response).await;
    assert_eq!(ack["scene"], "storm");
}

#[tokio::test]
async fn rain_scene_without_nearby_strike() {
    let test_app = spawn_app(Arc::new(MockTestResolver::new())).await;

    let response = post_form(
        &test_app.app,
        "/update",
        observation_form("20240615120500", &[("precip", "5.0")]),
    )
    .await;
    let ack = json_body(response).await;
    assert_eq!(ack["scene"], "rain");

    // The swapped-in scene sticks in station state
    assert_eq!(test_app.state.state.current_scene().await, Scene::Rain);
}

#[tokio::test]
async fn position_update_replaces_location() {
    let mut resolver = MockTestResolver::new();
    resolver
        .expect_resolve()
        .withf(|lat, lon| lat == "40.015" && lon == "-105.271")
        .times(1)
        .returning(|_, _| {
            Ok(ResolvedLocation {
                place_name: Some(String::from("Boulder, Colorado")),
                timezone: chrono_tz::America::Denver,
                sunrise_utc: Utc.with_ymd_and_hms(2024, 6, 15, 11, 35, 0).unwrap(),
                sunset_utc: Utc.with_ymd_and_hms(2024, 6, 16, 2, 31, 0).unwrap(),
            })
        });

    let test_app = spawn_app(Arc::new(resolver)).await;

    let response = post_form(
        &test_app.app,
        "/position",
        form_body(&[
            ("credential", TEST_SECRET),
            ("latitude", "40.015"),
            ("longitude", "-105.271"),
        ]),
    )
    .await;
    assert!(response.status().is_success());
    let ack = json_body(response).await;
    assert_eq!(ack["place_name"], "Boulder, Colorado");
    assert_eq!(ack["timezone"], "America/Denver");

    let response = get(&test_app.app, "/current").await;
    let report = json_body(response).await;
    assert_eq!(report["place_name"], "Boulder, Colorado");
}

#[tokio::test]
async fn resolver_failure_leaves_location_unchanged() {
    let mut resolver = MockTestResolver::new();
    resolver
        .expect_resolve()
        .times(1)
        .returning(|_, _| Err(resolver::Error::Timeout));

    let test_app = spawn_app(Arc::new(resolver)).await;

    let response = post_form(
        &test_app.app,
        "/position",
        form_body(&[
            ("credential", TEST_SECRET),
            ("latitude", "40.015"),
            ("longitude", "-105.271"),
        ]),
    )
    .await;
    assert_eq!(response.status(), 504);
    let body = json_body(response).await;
    assert_eq!(body["error"], "resolver_timeout");

    let response = get(&test_app.app, "/current").await;
    let report = json_body(response).await;
    assert_eq!(report["place_name"], "New York, NY");
}

#[tokio::test]
async fn unparseable_date_falls_back_to_now() {
    let test_app = spawn_app(Arc::new(MockTestResolver::new())).await;

    // Eight characters, but no date in them
    let response = post_form(
        &test_app.app,
        "/update",
        observation_form("notadate", &[]),
    )
    .await;
    assert!(response.status().is_success());

    // Stamped with now, so it lands inside the current window
    let response = get(&test_app.app, "/current").await;
    let report = json_body(response).await;
    assert_eq!(report["observations"].as_array().unwrap().len(), 1);
    assert!(report.get("message").is_none());
}
