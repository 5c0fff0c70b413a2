//! Cache-through loading of per-symbol chart series.

use std::sync::Arc;

use crate::cache::{SeriesCache, SeriesEntry};
use crate::domain::Symbol;
use crate::error::ProviderError;
use crate::fmp::{FmpGateway, DEFAULT_ESTIMATED_YEARS};

/// Fetches and caches the two historical series a comparison chart needs.
#[derive(Clone)]
pub struct HistoryService {
    gateway: FmpGateway,
    cache: SeriesCache,
}

impl HistoryService {
    pub fn new(gateway: FmpGateway, cache: SeriesCache) -> Self {
        Self { gateway, cache }
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    /// Resident entry for the symbol, or a fresh fetch of both series on a
    /// miss. Both fetches run concurrently; the entry is stored only when
    /// both succeed, so a failure leaves the cache exactly as it was and a
    /// retry is a genuine network attempt.
    ///
    /// Concurrent misses for the same symbol are not coalesced: each
    /// triggers its own fetch pair and the last insert wins. Results are
    /// idempotent per symbol, so this costs requests, not correctness.
    pub async fn series_for(&self, symbol: &Symbol) -> Result<Arc<SeriesEntry>, ProviderError> {
        if let Some(entry) = self.cache.get(symbol).await {
            return Ok(entry);
        }

        let (market_caps, financials) = tokio::join!(
            self.gateway
                .estimated_market_cap_history(symbol, DEFAULT_ESTIMATED_YEARS),
            self.gateway.quarterly_financials(symbol),
        );
        let entry = SeriesEntry {
            market_caps: market_caps?,
            financials: financials?,
        };
        Ok(self.cache.insert(symbol.clone(), entry).await)
    }
}
