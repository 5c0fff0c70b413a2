//! Two-phase sector loading with session retention.
//!
//! Phase 1 ("quick") returns screener rows immediately as limited records
//! so callers can render at once. Phase 2 ("full") enriches every row via
//! per-company fetches in fixed-size batches, strictly sequential between
//! batches to bound concurrent upstream requests. A completed full view is
//! retained for the whole session and never re-fetched.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::warn;

use crate::domain::{CompanyRecord, ScreenerRow, Symbol};
use crate::error::ProviderError;
use crate::fmp::FmpGateway;

/// Screener rows dropped before the limit is applied: duplicate listings
/// and non-company rows the upstream screener keeps returning.
pub const EXCLUDED_SYMBOLS: [&str; 2] = ["HONIV", "GOOGL"];

/// Per-company fetches running concurrently inside one full-load batch.
const FULL_LOAD_BATCH_SIZE: usize = 10;

/// One sector query: result-count limit plus an optional industry
/// allowlist. The view key is the allowlist and the limit together, so a
/// full view retained for one page size is never served for another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorRequest {
    pub sector_key: String,
    pub limit: usize,
    pub industries: Option<Vec<String>>,
}

impl SectorRequest {
    pub fn new(limit: usize, industries: Option<Vec<String>>) -> Self {
        let limit = limit.max(1);
        let allowlist = industries
            .as_ref()
            .map(|list| list.join(","))
            .unwrap_or_else(|| String::from("all"));
        Self {
            sector_key: format!("{allowlist}:{limit}"),
            limit,
            industries,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Quick,
    Full,
}

/// Ordered companies for one sector (descending market cap, as screened).
#[derive(Debug, Clone, PartialEq)]
pub struct SectorView {
    pub records: Vec<CompanyRecord>,
    pub phase: LoadPhase,
}

#[derive(Default)]
struct SectorState {
    /// Monotone selection token; stale full-load results are discarded
    /// when their token no longer matches.
    generation: u64,
    full: Option<Arc<SectorView>>,
}

/// Session-scoped sector store and progressive loader.
pub struct SectorCatalog {
    gateway: FmpGateway,
    excluded: HashSet<Symbol>,
    views: Mutex<HashMap<String, SectorState>>,
}

impl SectorCatalog {
    pub fn new(gateway: FmpGateway) -> Self {
        let excluded = EXCLUDED_SYMBOLS
            .iter()
            .map(|s| Symbol::parse(s).expect("exclusion list symbols are valid"))
            .collect();
        Self::with_exclusions(gateway, excluded)
    }

    pub fn with_exclusions(gateway: FmpGateway, excluded: HashSet<Symbol>) -> Self {
        Self {
            gateway,
            excluded,
            views: Mutex::new(HashMap::new()),
        }
    }

    /// Screener rows with exclusions filtered out before the limit is
    /// applied. Extra candidates are requested so the post-filter result
    /// can still reach the limit.
    async fn screen(&self, request: &SectorRequest) -> Result<Vec<ScreenerRow>, ProviderError> {
        let rows = self
            .gateway
            .screener(request.limit + self.excluded.len(), request.industries.as_deref())
            .await?;
        let mut rows: Vec<ScreenerRow> = rows
            .into_iter()
            .filter(|row| !self.excluded.contains(&row.symbol))
            .collect();
        rows.truncate(request.limit);
        Ok(rows)
    }

    /// Phase 1: screener data delivered immediately as limited records,
    /// with no per-company fetches.
    pub async fn load_quick(
        &self,
        request: &SectorRequest,
    ) -> Result<Vec<CompanyRecord>, ProviderError> {
        Ok(self
            .screen(request)
            .await?
            .into_iter()
            .map(|row| CompanyRecord::Limited(row.to_limited()))
            .collect())
    }

    /// Starts a new selection of the sector and returns its generation
    /// token. Any full load still in flight for an earlier token will be
    /// discarded on completion.
    pub async fn begin_selection(&self, sector_key: &str) -> u64 {
        let mut views = self.views.lock().await;
        let state = views.entry(sector_key.to_owned()).or_default();
        state.generation += 1;
        state.generation
    }

    /// The retained full view for a sector, if phase 2 ever completed.
    pub async fn full_view(&self, sector_key: &str) -> Option<Arc<SectorView>> {
        self.views
            .lock()
            .await
            .get(sector_key)
            .and_then(|state| state.full.clone())
    }

    /// Commits a completed full load. Returns false (and stores nothing)
    /// when a newer selection superseded the load.
    pub async fn commit_full(
        &self,
        sector_key: &str,
        generation: u64,
        view: Arc<SectorView>,
    ) -> bool {
        let mut views = self.views.lock().await;
        let state = views.entry(sector_key.to_owned()).or_default();
        if state.generation != generation {
            return false;
        }
        state.full = Some(view);
        true
    }

    /// Phase 2: the fully enriched sector view. Returns the retained view
    /// without any network calls when the sector already completed a full
    /// load this session.
    pub async fn load_full(
        &self,
        request: &SectorRequest,
    ) -> Result<Arc<SectorView>, ProviderError> {
        if let Some(view) = self.full_view(&request.sector_key).await {
            return Ok(view);
        }

        let generation = self.begin_selection(&request.sector_key).await;
        let records = self.fetch_full_records(request).await?;
        let view = Arc::new(SectorView {
            records,
            phase: LoadPhase::Full,
        });
        self.commit_full(&request.sector_key, generation, view.clone())
            .await;
        Ok(view)
    }

    async fn fetch_full_records(
        &self,
        request: &SectorRequest,
    ) -> Result<Vec<CompanyRecord>, ProviderError> {
        let rows = self.screen(request).await?;
        let mut records = Vec::with_capacity(rows.len());

        // Batch N+1 does not start until every fetch in batch N resolved;
        // this is the only backpressure against the rate-limited upstream.
        for batch in rows.chunks(FULL_LOAD_BATCH_SIZE) {
            let results = join_all(
                batch
                    .iter()
                    .map(|row| self.gateway.full_company(&row.symbol)),
            )
            .await;

            for (row, result) in batch.iter().zip(results) {
                match result {
                    Ok(Some(record)) => records.push(record),
                    Ok(None) => {
                        warn!(symbol = %row.symbol, "company vanished during full sector load")
                    }
                    Err(err) => {
                        warn!(symbol = %row.symbol, error = %err, "skipping company in full sector load")
                    }
                }
            }
        }

        Ok(records)
    }
}
