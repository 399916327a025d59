// End-to-end scan flows that exercise the remote reputation path: score
// fusion, degraded fallbacks, rate limiting and cache interaction

mod common;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use common::{test_config_with_reputation, TestApp};
use httpmock::{Method, MockServer};
use serde_json::{json, Value};
use std::time::Duration;

// Local indicator score for this URL: plain HTTP (25) plus one credential
// keyword (8)
const PHISH_URL: &str = "http://phish.example/login";

#[tokio::test]
async fn test_combined_verdict_fuses_local_and_remote() {
    let server = MockServer::start();
    let url_id = URL_SAFE_NO_PAD.encode(PHISH_URL);

    let lookup = server.mock(|when, then| {
        when.method(Method::GET).path(format!("/urls/{}", url_id));
        then.status(200).json_body(json!({
            "data": {
                "id": url_id,
                "attributes": {
                    "last_analysis_stats": { "malicious": 9, "harmless": 1 }
                }
            }
        }));
    });

    let app = TestApp::with_config(test_config_with_reputation(&server.base_url()));

    let response = app
        .post("/api/v1/scan")
        .json(&json!({ "url": PHISH_URL }))
        .send()
        .await;

    let verdict: Value = response.json().await;
    // round(0.3 * 33 + 0.7 * 90)
    assert_eq!(verdict["status"], "malicious");
    assert_eq!(verdict["score"], 73);
    assert_eq!(verdict["reason"], "combined_analysis");
    assert_eq!(verdict["indicator_score"], 33);
    assert_eq!(verdict["remote_score"], 90);
    assert_eq!(verdict["remote_detections"], 9);
    lookup.assert();

    // A repeat scan is served from the cache without another remote call
    let response = app
        .post("/api/v1/scan")
        .json(&json!({ "url": PHISH_URL }))
        .send()
        .await;

    let verdict: Value = response.json().await;
    assert_eq!(verdict["reason"], "combined_analysis");
    assert_eq!(verdict["score"], 73);
    assert_eq!(lookup.hits(), 1);
}

#[tokio::test]
async fn test_pending_remote_fuses_neutral_score() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(Method::GET).path_contains("/urls/");
        then.status(404);
    });
    server.mock(|when, then| {
        when.method(Method::POST).path("/urls");
        then.status(200)
            .json_body(json!({ "data": { "id": "analysis-7" } }));
    });
    server.mock(|when, then| {
        when.method(Method::GET).path("/analyses/analysis-7");
        then.status(200).json_body(json!({
            "data": {
                "id": "analysis-7",
                "attributes": { "status": "queued", "stats": {} }
            }
        }));
    });

    let app = TestApp::with_config(test_config_with_reputation(&server.base_url()));

    let response = app
        .post("/api/v1/scan")
        .json(&json!({ "url": PHISH_URL }))
        .send()
        .await;

    let verdict: Value = response.json().await;
    // round(0.3 * 33 + 0.7 * 50)
    assert_eq!(verdict["status"], "suspicious");
    assert_eq!(verdict["score"], 45);
    assert_eq!(verdict["reason"], "combined_analysis");
    assert_eq!(verdict["remote_score"], 50);
    assert_eq!(verdict["remote_detections"], 0);
}

#[tokio::test]
async fn test_remote_failure_degrades_to_local_and_is_not_cached() {
    let server = MockServer::start();

    let lookup = server.mock(|when, then| {
        when.method(Method::GET).path_contains("/urls/");
        then.status(500);
    });
    server.mock(|when, then| {
        when.method(Method::POST).path("/urls");
        then.status(500);
    });

    let app = TestApp::with_config(test_config_with_reputation(&server.base_url()));

    let response = app
        .post("/api/v1/scan")
        .json(&json!({ "url": PHISH_URL }))
        .send()
        .await;

    let verdict: Value = response.json().await;
    assert_eq!(verdict["status"], "safe");
    assert_eq!(verdict["score"], 33);
    assert_eq!(verdict["reason"], "remote_unavailable");

    // Degraded verdicts must not stick: the next scan retries the remote
    let response = app
        .post("/api/v1/scan")
        .json(&json!({ "url": PHISH_URL }))
        .send()
        .await;

    let verdict: Value = response.json().await;
    assert_eq!(verdict["reason"], "remote_unavailable");
    assert_eq!(lookup.hits(), 2);
}

#[tokio::test]
async fn test_rate_limited_scans_fall_back_to_local() {
    let server = MockServer::start();

    let lookup = server.mock(|when, then| {
        when.method(Method::GET).path_contains("/urls/");
        then.status(200).json_body(json!({
            "data": {
                "id": "any",
                "attributes": {
                    "last_analysis_stats": { "harmless": 70 }
                }
            }
        }));
    });

    let mut config = test_config_with_reputation(&server.base_url());
    config.reputation.rate_limit_max_requests = 1;
    config.reputation.rate_limit_window_seconds = 1;
    let app = TestApp::with_config(config);

    // First scan takes the only slot in the window
    let response = app
        .post("/api/v1/scan")
        .json(&json!({ "url": PHISH_URL }))
        .send()
        .await;

    let verdict: Value = response.json().await;
    assert_eq!(verdict["reason"], "combined_analysis");
    // round(0.3 * 33 + 0.7 * 0)
    assert_eq!(verdict["score"], 10);
    assert_eq!(lookup.hits(), 1);

    // Second scan of a different URL is admitted locally only
    let response = app
        .post("/api/v1/scan")
        .json(&json!({ "url": "http://other-phish.example/login" }))
        .send()
        .await;

    let verdict: Value = response.json().await;
    assert_eq!(verdict["status"], "safe");
    assert_eq!(verdict["score"], 33);
    assert_eq!(verdict["reason"], "rate_limited");
    assert_eq!(lookup.hits(), 1);

    // Once the window slides past, the same URL reaches the remote,
    // proving the rate-limited verdict was not cached
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let response = app
        .post("/api/v1/scan")
        .json(&json!({ "url": "http://other-phish.example/login" }))
        .send()
        .await;

    let verdict: Value = response.json().await;
    assert_eq!(verdict["reason"], "combined_analysis");
    assert_eq!(lookup.hits(), 2);
}

#[tokio::test]
async fn test_every_terminal_scan_is_recorded() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(Method::GET).path_contains("/urls/");
        then.status(200).json_body(json!({
            "data": {
                "id": "any",
                "attributes": {
                    "last_analysis_stats": { "malicious": 9, "harmless": 1 }
                }
            }
        }));
    });

    let app = TestApp::with_config(test_config_with_reputation(&server.base_url()));

    app.post("/api/v1/scan")
        .json(&json!({ "url": PHISH_URL }))
        .send()
        .await;
    app.post("/api/v1/scan")
        .json(&json!({ "url": "https://www.google.com/" }))
        .send()
        .await;
    // Cache hit for the first URL still counts as a scan
    app.post("/api/v1/scan")
        .json(&json!({ "url": PHISH_URL }))
        .send()
        .await;

    let stats = app.state.recorder.stats().await.unwrap();
    assert_eq!(stats.total_scans, 3);
    assert_eq!(stats.malicious, 2);
    assert_eq!(stats.safe, 1);

    let history = app.state.recorder.history(10).await.unwrap();
    assert_eq!(history.len(), 3);
    // Newest first
    assert_eq!(history[0].url, PHISH_URL);
    assert_eq!(history[1].url, "https://www.google.com/");
}
