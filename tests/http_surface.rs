//! End-to-end tests of the HTTP surface against a scripted provider.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use capcompare_web::{router, AppState};
use capcompare_tests::{
    eod_json, gateway, income_json, profile_json, ratios_json, screener_json, ScriptedHttp,
};
use serde_json::Value;
use tower::util::ServiceExt;

fn app(http: Arc<ScriptedHttp>) -> Router {
    router(AppState::new(gateway(http), 20))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("valid request"),
        )
        .await
        .expect("infallible service");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

fn script_company(http: &ScriptedHttp, symbol: &str) {
    http.respond(
        &format!("/profile?symbol={symbol}&"),
        200,
        profile_json(symbol, &format!("{symbol} Inc."), 1_000.0, 10.0, 1.0),
    );
    http.respond(
        &format!("/ratios-ttm?symbol={symbol}&"),
        200,
        ratios_json(5.0, 1.0, 0.8, 20.0),
    );
}

fn script_series(http: &ScriptedHttp, symbol: &str) {
    http.respond(
        &format!("/profile?symbol={symbol}&"),
        200,
        profile_json(symbol, &format!("{symbol} Inc."), 1_000.0, 10.0, 1.0),
    );
    http.respond(
        &format!("/historical-price-eod/full?symbol={symbol}&"),
        200,
        eod_json(&[("2024-06-03", 10.0), ("2024-06-04", 11.0)]),
    );
    http.respond(
        &format!("/income-statement?symbol={symbol}&"),
        200,
        income_json(&[("2024-03-31", 500.0, 50.0)]),
    );
}

#[tokio::test]
async fn an_upstream_rate_limit_surfaces_as_429_while_other_failures_are_500() {
    let http = ScriptedHttp::new();
    http.respond("/profile?symbol=AAA&", 429, serde_json::json!({}));
    http.respond("/ratios-ttm?symbol=AAA&", 429, serde_json::json!({}));
    http.respond("/profile?symbol=BBB&", 500, serde_json::json!({}));
    http.respond("/ratios-ttm?symbol=BBB&", 500, serde_json::json!({}));
    let app = app(http);

    let (status, body) = get(&app, "/company/AAA").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "rate_limit");

    let (status, body) = get(&app, "/company/BBB").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Request failed");
}

#[tokio::test]
async fn search_answers_null_for_anything_that_is_not_a_ticker() {
    let http = ScriptedHttp::new();
    script_company(&http, "AAPL");
    let app = app(http.clone());

    let (status, body) = get(&app, "/search").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let (_, body) = get(&app, "/search?q=").await;
    assert_eq!(body, Value::Null);

    let (_, body) = get(&app, "/search?q=123").await;
    assert_eq!(body, Value::Null);
    assert_eq!(http.call_count(), 0);

    let (status, body) = get(&app, "/search?q=aapl").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "AAPL");
    assert_eq!(body["revenueTTM"], 500.0);
}

#[tokio::test]
async fn an_unknown_company_is_a_404_with_a_stable_error_body() {
    let http = ScriptedHttp::new();
    http.respond("/profile?symbol=ZZZZ&", 200, serde_json::json!([]));
    http.respond("/ratios-ttm?symbol=ZZZZ&", 200, serde_json::json!([]));
    let app = app(http);

    let (status, body) = get(&app, "/company/ZZZZ").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Company not found");
}

#[tokio::test]
async fn historical_series_return_points_or_404_when_empty() {
    let http = ScriptedHttp::new();
    script_series(&http, "AAPL");
    http.respond("/profile?symbol=NONE&", 200, serde_json::json!([]));
    http.respond("/historical-price-eod/full?symbol=NONE&", 200, serde_json::json!([]));
    http.respond("/income-statement?symbol=NONE&", 200, serde_json::json!([]));
    let app = app(http);

    let (status, body) = get(&app, "/historical/AAPL").await;
    assert_eq!(status, StatusCode::OK);
    let points = body.as_array().expect("array body");
    assert_eq!(points.len(), 2);
    assert_eq!(points[0]["date"], "2024-06-03");
    // close 10 at 100 derived shares
    assert_eq!(points[0]["marketCap"], 1_000.0);

    let (status, body) = get(&app, "/historical/NONE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Historical data not found");
}

#[tokio::test]
async fn exact_mode_bypasses_the_estimate_and_queries_the_provider_series() {
    let http = ScriptedHttp::new();
    http.respond(
        "/historical-market-capitalization?symbol=AAPL&",
        200,
        capcompare_tests::market_cap_json("AAPL", &[("2024-02-01", 1.9e12)]),
    );
    let app = app(http.clone());

    let (status, body) = get(&app, "/historical/AAPL?mode=exact").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("array body").len(), 1);
    assert!(http.calls_containing("/historical-price-eod/").is_empty());

    let (status, _) = get(&app, "/historical/AAPL?mode=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn historical_financials_return_quarters_or_404_when_empty() {
    let http = ScriptedHttp::new();
    script_series(&http, "AAPL");
    http.respond("/profile?symbol=NONE&", 200, serde_json::json!([]));
    http.respond("/historical-price-eod/full?symbol=NONE&", 200, serde_json::json!([]));
    http.respond("/income-statement?symbol=NONE&", 200, serde_json::json!([]));
    let app = app(http);

    let (status, body) = get(&app, "/historical-financials/AAPL").await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().expect("array body");
    assert_eq!(rows[0]["revenue"], 500.0);
    assert_eq!(rows[0]["netIncome"], 50.0);

    let (status, _) = get(&app, "/historical-financials/NONE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn top_companies_is_a_bare_record_array_in_both_phases() {
    let http = ScriptedHttp::new();
    http.respond("/company-screener?", 200, screener_json(&["AAA", "BBB"]));
    script_company(&http, "AAA");
    script_company(&http, "BBB");
    let app = app(http);

    // No envelope around the records; the phase shows only via isLimited.
    let (status, body) = get(&app, "/top-companies?limit=2&quick=true").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_array(), "expected a bare array, got: {body}");
    let records = body.as_array().expect("array body");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["symbol"], "AAA");
    assert_eq!(records[0]["isLimited"], true);

    let (status, body) = get(&app, "/top-companies?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_array(), "expected a bare array, got: {body}");
    assert_eq!(body[0]["isLimited"], false);
    assert_eq!(body[0]["revenueTTM"], 500.0);
}

#[tokio::test]
async fn switching_the_compare_metric_reuses_cached_series_without_refetching() {
    let http = ScriptedHttp::new();
    script_series(&http, "AAPL");
    script_series(&http, "MSFT");
    let app = app(http.clone());

    let (status, body) = get(&app, "/compare/AAPL/MSFT?metric=market-cap").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metric"], "market-cap");
    assert_eq!(body["symbols"], serde_json::json!(["AAPL", "MSFT"]));
    assert_eq!(body["points"][0]["label"], "2024-06-03");
    let calls_after_first = http.call_count();
    assert!(calls_after_first > 0);

    let (status, body) = get(&app, "/compare/AAPL/MSFT?metric=revenue").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["points"][0]["label"], "2024-Q1");
    assert_eq!(body["points"][0]["left"], 500.0);
    assert_eq!(http.call_count(), calls_after_first);

    let (status, _) = get(&app, "/compare/AAPL/MSFT?metric=ebitda").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
