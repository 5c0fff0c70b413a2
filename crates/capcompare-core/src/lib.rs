//! # capcompare-core
//!
//! Core library for the capcompare dashboard backend: domain types, the
//! upstream provider gateway, the bounded per-symbol series cache, the
//! two-phase sector loader, and chart merge support.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Capacity-bounded per-symbol series cache |
//! | [`chart`] | Two-symbol series merging and quarter bucketing |
//! | [`domain`] | Domain models (Symbol, CompanyRecord, series types) |
//! | [`error`] | Validation and provider error types |
//! | [`fmp`] | Upstream provider gateway |
//! | [`history`] | Cache-through series loading |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`sector`] | Two-phase sector loading with session retention |
//!
//! ## Error handling
//!
//! Absent entities are values (`Ok(None)` or an empty series), never
//! errors. Upstream failures are classified by [`ProviderErrorKind`]:
//! a 402 degrades to partial data, a 429 surfaces distinctly so callers
//! can show a retry-later message without retrying automatically, and
//! everything else is a generic upstream failure.
//!
//! ## Security
//!
//! The provider API key is supplied by the embedding binary (read from
//! the environment there) and is never logged.

pub mod cache;
pub mod chart;
pub mod domain;
pub mod error;
pub mod fmp;
pub mod history;
pub mod http_client;
pub mod sector;

pub use cache::{SeriesCache, SeriesEntry, DEFAULT_SERIES_CAPACITY};
pub use chart::{merge_series, MergedPoint, Metric, MARKET_CAP_SAMPLE_STRIDE};
pub use domain::{
    format_date, parse_date, CalendarQuarter, CompanyProfile, CompanyRecord, FullCompany,
    HistoricalPoint, LimitedCompany, QuarterlyFinancials, ScreenerRow, Symbol,
};
pub use error::{ProviderError, ProviderErrorKind, ValidationError};
pub use fmp::{FmpGateway, RatiosTtm, DEFAULT_BASE_URL, DEFAULT_ESTIMATED_YEARS};
pub use history::HistoryService;
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use sector::{
    LoadPhase, SectorCatalog, SectorRequest, SectorView, EXCLUDED_SYMBOLS,
};
