use std::sync::Arc;

use capcompare_core::{FmpGateway, HistoryService, SectorCatalog, SeriesCache};

/// Shared handler state: one gateway, one series cache, one sector store,
/// all living for the whole process.
#[derive(Clone)]
pub struct AppState {
    pub gateway: FmpGateway,
    pub history: Arc<HistoryService>,
    pub sectors: Arc<SectorCatalog>,
}

impl AppState {
    pub fn new(gateway: FmpGateway, cache_capacity: usize) -> Self {
        Self {
            history: Arc::new(HistoryService::new(
                gateway.clone(),
                SeriesCache::new(cache_capacity),
            )),
            sectors: Arc::new(SectorCatalog::new(gateway.clone())),
            gateway,
        }
    }
}
