//! Gateway to the upstream financial-data provider.
//!
//! Normalizes the provider's error statuses (402 means "dataset absent",
//! 429 is a distinct rate-limit signal) and computes the derived
//! absolute-value metrics the dashboard shows. Shares outstanding are
//! always re-derived from the current market cap and price, never cached.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use time::{Date, OffsetDateTime};
use tracing::warn;

use crate::domain::{
    date_string, format_date, CompanyProfile, CompanyRecord, FullCompany, HistoricalPoint,
    LimitedCompany, QuarterlyFinancials, ScreenerRow, Symbol,
};
use crate::error::{ProviderError, ProviderErrorKind};
use crate::http_client::{HttpClient, HttpRequest};

pub const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com/stable";

/// Trailing window for the estimated market-cap series.
pub const DEFAULT_ESTIMATED_YEARS: i32 = 10;

/// Trailing window for the provider's own market-cap series.
const EXACT_RANGE_YEARS: i32 = 5;
const EXACT_POINT_CAP: usize = 5_000;

/// Quarters requested from the income-statement endpoint.
const QUARTERS_REQUESTED: usize = 40;

/// Trailing-twelve-month per-share ratios, as the provider reports them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RatiosTtm {
    #[serde(rename = "operatingProfitMarginTTM", default)]
    pub operating_profit_margin_ttm: f64,
    #[serde(rename = "priceToEarningsRatioTTM", default)]
    pub price_to_earnings_ratio_ttm: f64,
    #[serde(rename = "freeCashFlowPerShareTTM", default)]
    pub free_cash_flow_per_share_ttm: f64,
    #[serde(rename = "revenuePerShareTTM", default)]
    pub revenue_per_share_ttm: f64,
    #[serde(rename = "netIncomePerShareTTM", default)]
    pub net_income_per_share_ttm: f64,
    #[serde(rename = "debtToEquityRatioTTM", default)]
    pub debt_to_equity_ratio_ttm: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct EodPrice {
    #[serde(with = "date_string")]
    date: Date,
    close: f64,
}

/// Screener row as the provider sends it. The symbol stays a raw string
/// here so one malformed ticker cannot fail the whole page decode.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScreenerRowWire {
    symbol: String,
    company_name: String,
    market_cap: f64,
    #[serde(default)]
    beta: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeRow {
    #[serde(with = "date_string")]
    date: Date,
    #[serde(default)]
    revenue: f64,
    #[serde(default)]
    net_income: f64,
}

/// Provider gateway. Clone is cheap; the transport is shared.
#[derive(Clone)]
pub struct FmpGateway {
    http: Arc<dyn HttpClient>,
    api_key: String,
    base_url: String,
}

impl FmpGateway {
    pub fn new(http: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: String::from(DEFAULT_BASE_URL),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ProviderError> {
        let response = self
            .http
            .execute(HttpRequest::get(url))
            .await
            .map_err(|e| ProviderError::transport(e.message()))?;

        if !response.is_success() {
            return Err(classify_status(response.status));
        }

        serde_json::from_str(&response.body)
            .map_err(|e| ProviderError::decode(format!("malformed provider response: {e}")))
    }

    /// Company profile, or `None` when the provider has no record.
    pub async fn profile(&self, symbol: &Symbol) -> Result<Option<CompanyProfile>, ProviderError> {
        let url = format!(
            "{}/profile?symbol={}&apikey={}",
            self.base_url, symbol, self.api_key
        );
        let rows: Vec<CompanyProfile> = self.get_json(url).await?;
        Ok(rows.into_iter().next())
    }

    /// TTM ratios, or `None` when the dataset is tier-restricted (402) or
    /// the provider has no row for the symbol.
    pub async fn ratios_ttm(&self, symbol: &Symbol) -> Result<Option<RatiosTtm>, ProviderError> {
        let url = format!(
            "{}/ratios-ttm?symbol={}&apikey={}",
            self.base_url, symbol, self.api_key
        );
        match self.get_json::<Vec<RatiosTtm>>(url).await {
            Ok(rows) => Ok(rows.into_iter().next()),
            Err(err) if err.kind() == ProviderErrorKind::DatasetUnavailable => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Profile and ratios fetched concurrently, combined into the record
    /// variant the available datasets allow.
    pub async fn full_company(
        &self,
        symbol: &Symbol,
    ) -> Result<Option<CompanyRecord>, ProviderError> {
        let (profile, ratios) = tokio::join!(self.profile(symbol), self.ratios_ttm(symbol));
        let profile = profile?;
        let ratios = ratios?;

        let Some(profile) = profile else {
            return Ok(None);
        };
        let Some(ratios) = ratios else {
            return Ok(Some(CompanyRecord::Limited(LimitedCompany::from_profile(
                &profile,
            ))));
        };

        let shares_outstanding = profile.market_cap / profile.price;
        let pe_ratio = (ratios.price_to_earnings_ratio_ttm != 0.0)
            .then_some(ratios.price_to_earnings_ratio_ttm);

        Ok(Some(CompanyRecord::Full(FullCompany {
            symbol: profile.symbol.clone(),
            company_name: profile.company_name.clone(),
            market_cap: profile.market_cap,
            revenue_ttm: ratios.revenue_per_share_ttm * shares_outstanding,
            earnings_ttm: ratios.net_income_per_share_ttm * shares_outstanding,
            beta: profile.beta,
            operating_margin: ratios.operating_profit_margin_ttm,
            pe_ratio,
            fcf_ttm: ratios.free_cash_flow_per_share_ttm * shares_outstanding,
            debt_to_equity: ratios.debt_to_equity_ratio_ttm,
            is_limited: false,
        })))
    }

    async fn eod_prices(&self, symbol: &Symbol) -> Result<Vec<EodPrice>, ProviderError> {
        let url = format!(
            "{}/historical-price-eod/full?symbol={}&apikey={}",
            self.base_url, symbol, self.api_key
        );
        match self.get_json::<Vec<EodPrice>>(url).await {
            Ok(rows) => Ok(rows),
            Err(err) if err.kind() == ProviderErrorKind::DatasetUnavailable => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    /// Market-cap history derived from daily closes and the current share
    /// count, filtered to the trailing `years` window. Missing data and
    /// tier-restricted responses yield an empty series, never an error.
    pub async fn estimated_market_cap_history(
        &self,
        symbol: &Symbol,
        years: i32,
    ) -> Result<Vec<HistoricalPoint>, ProviderError> {
        let (profile, prices) = tokio::join!(self.profile(symbol), self.eod_prices(symbol));
        let profile = match profile {
            Ok(Some(profile)) => profile,
            Ok(None) => return Ok(Vec::new()),
            Err(err) if err.kind() == ProviderErrorKind::DatasetUnavailable => {
                return Ok(Vec::new())
            }
            Err(err) => return Err(err),
        };
        let prices = prices?;
        if prices.is_empty() {
            return Ok(Vec::new());
        }

        let shares_outstanding = profile.market_cap / profile.price;
        let cutoff = years_before(OffsetDateTime::now_utc().date(), years);

        let mut points: Vec<HistoricalPoint> = prices
            .into_iter()
            .filter(|p| p.date >= cutoff)
            .map(|p| HistoricalPoint {
                symbol: symbol.clone(),
                date: p.date,
                market_cap: p.close * shares_outstanding,
            })
            .collect();
        points.sort_by_key(|p| p.date);
        Ok(points)
    }

    /// The provider's own market-cap series over the trailing five years.
    /// Missing data and tier-restricted responses yield an empty series.
    pub async fn exact_market_cap_history(
        &self,
        symbol: &Symbol,
    ) -> Result<Vec<HistoricalPoint>, ProviderError> {
        let to = OffsetDateTime::now_utc().date();
        let from = years_before(to, EXACT_RANGE_YEARS);
        let url = format!(
            "{}/historical-market-capitalization?symbol={}&from={}&to={}&limit={}&apikey={}",
            self.base_url,
            symbol,
            format_date(from),
            format_date(to),
            EXACT_POINT_CAP,
            self.api_key
        );
        match self.get_json::<Vec<HistoricalPoint>>(url).await {
            Ok(mut points) => {
                points.truncate(EXACT_POINT_CAP);
                points.sort_by_key(|p| p.date);
                Ok(points)
            }
            Err(err) if err.kind() == ProviderErrorKind::DatasetUnavailable => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    /// Quarterly revenue and net income, oldest first. Tier-restricted
    /// responses yield an empty series.
    pub async fn quarterly_financials(
        &self,
        symbol: &Symbol,
    ) -> Result<Vec<QuarterlyFinancials>, ProviderError> {
        let url = format!(
            "{}/income-statement?symbol={}&period=quarter&limit={}&apikey={}",
            self.base_url, symbol, QUARTERS_REQUESTED, self.api_key
        );
        let rows = match self.get_json::<Vec<IncomeRow>>(url).await {
            Ok(rows) => rows,
            Err(err) if err.kind() == ProviderErrorKind::DatasetUnavailable => Vec::new(),
            Err(err) => return Err(err),
        };
        let mut quarters: Vec<QuarterlyFinancials> = rows
            .into_iter()
            .map(|row| QuarterlyFinancials {
                symbol: symbol.clone(),
                date: row.date,
                revenue: row.revenue,
                net_income: row.net_income,
            })
            .collect();
        quarters.sort_by_key(|q| q.date);
        Ok(quarters)
    }

    /// Top companies by market cap, descending, equities only.
    pub async fn screener(
        &self,
        limit: usize,
        industries: Option<&[String]>,
    ) -> Result<Vec<ScreenerRow>, ProviderError> {
        let mut url = format!(
            "{}/company-screener?sort=marketCap&order=desc&limit={}&isEtf=false&isFund=false&isActivelyTrading=true",
            self.base_url, limit
        );
        if let Some(industries) = industries.filter(|list| !list.is_empty()) {
            url.push_str("&industry=");
            url.push_str(&urlencoding::encode(&industries.join(",")));
        }
        url.push_str("&apikey=");
        url.push_str(&self.api_key);

        let rows: Vec<ScreenerRowWire> = self.get_json(url).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match Symbol::parse(&row.symbol) {
                Ok(symbol) => Some(ScreenerRow {
                    symbol,
                    company_name: row.company_name,
                    market_cap: row.market_cap,
                    beta: row.beta,
                }),
                Err(err) => {
                    warn!(symbol = %row.symbol, error = %err, "skipping screener row with a malformed symbol");
                    None
                }
            })
            .collect())
    }
}

fn classify_status(status: u16) -> ProviderError {
    match status {
        402 => ProviderError::dataset_unavailable(),
        429 => ProviderError::rate_limited(),
        other => ProviderError::upstream(other),
    }
}

fn years_before(date: Date, years: i32) -> Date {
    let target_year = date.year() - years;
    Date::from_calendar_date(target_year, date.month(), date.day())
        .or_else(|_| Date::from_calendar_date(target_year, date.month(), 28))
        .expect("day 28 exists in every month")
}
