use crate::helpers::{get, json_body, observation_form, post_form, spawn_app, MockTestResolver};
use chrono::Utc;
use piwx::NO_DATA_MESSAGE;
use std::sync::Arc;

#[tokio::test]
async fn historical_window_filters_and_orders_by_timestamp() {
    let test_app = spawn_app(Arc::new(MockTestResolver::new())).await;

    for date in ["20240110120000", "20240112120000", "20240118120000"] {
        let response = post_form(&test_app.app, "/update", observation_form(date, &[])).await;
        assert!(response.status().is_success());
    }

    let response = get(&test_app.app, "/historical?start=20240109&end=20240113").await;
    assert!(response.status().is_success());
    let report = json_body(response).await;

    let observations = report["observations"].as_array().unwrap();
    assert_eq!(observations.len(), 2);
    assert_eq!(observations[0]["id"], 1);
    assert_eq!(observations[1]["id"], 2);
    assert!(report.get("message").is_none());
    assert_eq!(report["full_axes"], true);

    // Date-picker bounds span the whole series
    assert_eq!(report["date_bounds"]["start"], "2024-01-10");
    assert_eq!(report["date_bounds"]["end"], "2024-01-18");
}

#[tokio::test]
async fn degenerate_window_widens_to_catch_neighbors() {
    let test_app = spawn_app(Arc::new(MockTestResolver::new())).await;

    let response = post_form(
        &test_app.app,
        "/update",
        observation_form("20231231120000", &[]),
    )
    .await;
    assert!(response.status().is_success());

    // start == end widens a day each side, so the New Year's Eve reading
    // shows up
    let response = get(
        &test_app.app,
        "/historical?start=2024-01-01&end=2024-01-01",
    )
    .await;
    let report = json_body(response).await;
    assert_eq!(report["observations"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_window_is_a_message_not_an_error() {
    let test_app = spawn_app(Arc::new(MockTestResolver::new())).await;

    let response = get(&test_app.app, "/historical?start=2000&end=2001").await;
    assert!(response.status().is_success());
    let report = json_body(response).await;

    assert!(report["observations"].as_array().unwrap().is_empty());
    assert_eq!(report["message"], NO_DATA_MESSAGE);
}

#[tokio::test]
async fn current_window_falls_back_to_latest_conditions() {
    let test_app = spawn_app(Arc::new(MockTestResolver::new())).await;

    let response = post_form(
        &test_app.app,
        "/update",
        observation_form("20200620025300", &[("ta", "0.0")]),
    )
    .await;
    assert!(response.status().is_success());

    let response = get(&test_app.app, "/current").await;
    let report = json_body(response).await;

    // The plot has nothing in the lookback window...
    assert!(report["observations"].as_array().unwrap().is_empty());
    assert_eq!(report["message"], NO_DATA_MESSAGE);

    // ...but the conditions panel still shows the latest reading, converted
    assert_eq!(report["conditions"]["id"], 1);
    assert_eq!(report["conditions"]["temperature_f"], 32.0);
}

#[tokio::test]
async fn recent_observation_fills_the_current_window() {
    let test_app = spawn_app(Arc::new(MockTestResolver::new())).await;

    let date = Utc::now().format("%Y%m%d%H%M%S").to_string();
    let response = post_form(&test_app.app, "/update", observation_form(&date, &[])).await;
    assert!(response.status().is_success());

    let response = get(&test_app.app, "/current").await;
    let report = json_body(response).await;

    assert_eq!(report["observations"].as_array().unwrap().len(), 1);
    assert!(report.get("message").is_none());
    assert_eq!(report["conditions"]["id"], 1);
    // Display timestamps carry the configured zone
    let shown = report["conditions"]["recorded_at"].as_str().unwrap();
    assert!(shown.ends_with("EST") || shown.ends_with("EDT"));
}

#[tokio::test]
async fn compact_client_drops_auxiliary_axes() {
    let test_app = spawn_app(Arc::new(MockTestResolver::new())).await;

    let response = get(&test_app.app, "/current?client=compact").await;
    let report = json_body(response).await;
    assert_eq!(report["full_axes"], false);

    let response = get(&test_app.app, "/historical?client=compact").await;
    let report = json_body(response).await;
    assert_eq!(report["full_axes"], false);
}

#[tokio::test]
async fn historical_accepts_form_posts() {
    let test_app = spawn_app(Arc::new(MockTestResolver::new())).await;

    let response = post_form(
        &test_app.app,
        "/update",
        observation_form("20240110120000", &[]),
    )
    .await;
    assert!(response.status().is_success());

    let response = post_form(
        &test_app.app,
        "/historical",
        String::from("start=20240109&end=20240111"),
    )
    .await;
    assert!(response.status().is_success());
    let report = json_body(response).await;
    assert_eq!(report["observations"].as_array().unwrap().len(), 1);
}
