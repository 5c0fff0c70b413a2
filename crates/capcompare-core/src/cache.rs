//! Bounded in-memory cache for per-symbol historical series.
//!
//! Recency is a plain order list, least recent first: a hit moves the key
//! to the most-recent end, an insert at capacity evicts the front. The
//! map and the order list are kept in lockstep under one lock, so
//! insert-plus-evict is a single indivisible step.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{HistoricalPoint, QuarterlyFinancials, Symbol};

/// Maximum resident symbols when no capacity is supplied.
pub const DEFAULT_SERIES_CAPACITY: usize = 20;

/// Both historical series for one symbol. Immutable once stored: a symbol
/// is either absent from the cache or fully present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesEntry {
    pub market_caps: Vec<HistoricalPoint>,
    pub financials: Vec<QuarterlyFinancials>,
}

#[derive(Debug)]
struct CacheInner {
    capacity: usize,
    entries: HashMap<Symbol, Arc<SeriesEntry>>,
    /// Recency order, least recent first.
    order: Vec<Symbol>,
}

impl CacheInner {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn touch(&mut self, symbol: &Symbol) {
        if let Some(pos) = self.order.iter().position(|s| s == symbol) {
            let symbol = self.order.remove(pos);
            self.order.push(symbol);
        }
    }

    fn get(&mut self, symbol: &Symbol) -> Option<Arc<SeriesEntry>> {
        let entry = self.entries.get(symbol).cloned()?;
        self.touch(symbol);
        Some(entry)
    }

    fn insert(&mut self, symbol: Symbol, entry: Arc<SeriesEntry>) {
        if self.entries.insert(symbol.clone(), entry).is_some() {
            self.touch(&symbol);
            return;
        }
        if self.entries.len() > self.capacity {
            let evicted = self.order.remove(0);
            self.entries.remove(&evicted);
        }
        self.order.push(symbol);
    }
}

/// Capacity-bounded symbol-to-series cache with session lifetime.
///
/// Explicitly constructed and injectable so tests can assert eviction
/// deterministically on isolated instances.
#[derive(Debug, Clone)]
pub struct SeriesCache {
    inner: Arc<tokio::sync::Mutex<CacheInner>>,
}

impl SeriesCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(tokio::sync::Mutex::new(CacheInner::new(capacity))),
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_SERIES_CAPACITY)
    }

    /// Resident entry for the symbol, refreshing its recency position.
    pub async fn get(&self, symbol: &Symbol) -> Option<Arc<SeriesEntry>> {
        self.inner.lock().await.get(symbol)
    }

    /// Stores the entry, evicting the least recently used symbol when at
    /// capacity, and returns the stored handle.
    pub async fn insert(&self, symbol: Symbol, entry: SeriesEntry) -> Arc<SeriesEntry> {
        let entry = Arc::new(entry);
        self.inner.lock().await.insert(symbol, entry.clone());
        entry
    }

    /// Residency check without a recency refresh.
    pub async fn contains(&self, symbol: &Symbol) -> bool {
        self.inner.lock().await.entries.contains_key(symbol)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Resident symbols, least recently used first.
    pub async fn resident_symbols(&self) -> Vec<Symbol> {
        self.inner.lock().await.order.clone()
    }
}
