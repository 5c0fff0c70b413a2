//! HTTP routes for the dashboard backend.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use capcompare_core::{
    merge_series, CompanyRecord, MergedPoint, Metric, SectorRequest, Symbol,
};

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_SECTOR_LIMIT: usize = 50;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search", get(search))
        .route("/company/:symbol", get(company))
        .route("/historical/:symbol", get(historical))
        .route("/historical-financials/:symbol", get(historical_financials))
        .route("/top-companies", get(top_companies))
        .route("/compare/:left/:right", get(compare))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Ticker lookup. Anything that cannot be a ticker (missing, empty or
/// malformed query) answers `null` rather than an error so the search box
/// stays quiet while the user types.
async fn search(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Option<CompanyRecord>>, ApiError> {
    let Some(query) = params.get("q").map(|q| q.trim()).filter(|q| !q.is_empty()) else {
        return Ok(Json(None));
    };
    let Ok(symbol) = Symbol::parse(query) else {
        return Ok(Json(None));
    };
    Ok(Json(state.gateway.full_company(&symbol).await?))
}

async fn company(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<CompanyRecord>, ApiError> {
    let symbol =
        Symbol::parse(&symbol).map_err(|_| ApiError::NotFound("Company not found"))?;
    match state.gateway.full_company(&symbol).await? {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::NotFound("Company not found")),
    }
}

async fn historical(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let symbol =
        Symbol::parse(&symbol).map_err(|_| ApiError::NotFound("Historical data not found"))?;
    let points = match params.get("mode").map(String::as_str) {
        Some("exact") => state.gateway.exact_market_cap_history(&symbol).await?,
        Some("estimated") | None => {
            state
                .history
                .series_for(&symbol)
                .await?
                .market_caps
                .clone()
        }
        Some(other) => {
            return Err(ApiError::BadRequest(format!("unknown mode: {other}")));
        }
    };
    if points.is_empty() {
        return Err(ApiError::NotFound("Historical data not found"));
    }
    Ok(Json(points).into_response())
}

async fn historical_financials(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Response, ApiError> {
    let symbol =
        Symbol::parse(&symbol).map_err(|_| ApiError::NotFound("Historical data not found"))?;
    let entry = state.history.series_for(&symbol).await?;
    if entry.financials.is_empty() {
        return Err(ApiError::NotFound("Historical data not found"));
    }
    Ok(Json(entry.financials.clone()).into_response())
}

/// Sector listing as a bare record array, ordered by market cap.
/// `quick=true` answers from screener data alone; the default full mode
/// enriches every row and retains the view for the session. The phase is
/// visible through `isLimited` on the records, not through an envelope.
async fn top_companies(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<CompanyRecord>>, ApiError> {
    let limit = match params.get("limit") {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| ApiError::BadRequest(format!("invalid limit: {raw}")))?,
        None => DEFAULT_SECTOR_LIMIT,
    };
    let industries = params
        .get("industries")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect::<Vec<String>>()
        })
        .filter(|list| !list.is_empty());
    let request = SectorRequest::new(limit, industries);

    if params.get("quick").map(String::as_str) == Some("true") {
        return Ok(Json(state.sectors.load_quick(&request).await?));
    }

    let view = state.sectors.load_full(&request).await?;
    Ok(Json(view.records.clone()))
}

#[derive(Serialize)]
struct CompareBody {
    symbols: [Symbol; 2],
    metric: &'static str,
    points: Vec<MergedPoint>,
}

/// Two-symbol comparison chart. Series come through the cache, so
/// switching the metric for an already-compared pair is a pure re-merge.
async fn compare(
    State(state): State<AppState>,
    Path((left, right)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CompareBody>, ApiError> {
    let left = Symbol::parse(&left).map_err(|err| ApiError::BadRequest(err.to_string()))?;
    let right = Symbol::parse(&right).map_err(|err| ApiError::BadRequest(err.to_string()))?;
    let metric = match params.get("metric") {
        Some(raw) => Metric::parse(raw).map_err(|err| ApiError::BadRequest(err.to_string()))?,
        None => Metric::MarketCap,
    };

    let (left_entry, right_entry) = tokio::join!(
        state.history.series_for(&left),
        state.history.series_for(&right),
    );
    let (left_entry, right_entry) = (left_entry?, right_entry?);

    Ok(Json(CompareBody {
        symbols: [left, right],
        metric: metric.as_str(),
        points: merge_series(&left_entry, &right_entry, metric),
    }))
}
