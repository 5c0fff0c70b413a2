//! Merge support for two-symbol comparison charts.
//!
//! Market-cap series join on exact calendar date and are downsampled
//! afterwards; quarterly series join on calendar quarter so companies
//! with different fiscal-year ends still align.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use serde::Serialize;
use time::Date;

use crate::cache::SeriesEntry;
use crate::domain::{format_date, CalendarQuarter, HistoricalPoint, QuarterlyFinancials};
use crate::ValidationError;

/// Daily market-cap joins keep every Nth point to bound chart density
/// over long windows.
pub const MARKET_CAP_SAMPLE_STRIDE: usize = 5;

/// Chart metric, orthogonal to symbol selection: switching the metric
/// re-merges already-cached series without any network fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    MarketCap,
    Revenue,
    Earnings,
}

impl Metric {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        match input {
            "market-cap" => Ok(Self::MarketCap),
            "revenue" => Ok(Self::Revenue),
            "earnings" => Ok(Self::Earnings),
            other => Err(ValidationError::InvalidMetric {
                value: other.to_owned(),
            }),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MarketCap => "market-cap",
            Self::Revenue => "revenue",
            Self::Earnings => "earnings",
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One merged chart row: a shared label (date or quarter) with both
/// companies' values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedPoint {
    pub label: String,
    pub left: f64,
    pub right: f64,
}

/// Inner join of two market-cap series on exact calendar date, ascending.
/// Dates present in only one series are dropped.
pub fn join_market_caps(
    left: &[HistoricalPoint],
    right: &[HistoricalPoint],
) -> Vec<(Date, f64, f64)> {
    let by_date: HashMap<Date, f64> = right.iter().map(|p| (p.date, p.market_cap)).collect();
    let mut joined: Vec<(Date, f64, f64)> = left
        .iter()
        .filter_map(|p| by_date.get(&p.date).map(|value| (p.date, p.market_cap, *value)))
        .collect();
    joined.sort_by_key(|(date, ..)| *date);
    joined
}

/// Every Nth element, starting with the first. Applied after the join,
/// never before, so sparse overlaps are not thinned twice.
pub fn downsample<T>(points: Vec<T>, stride: usize) -> Vec<T> {
    let stride = stride.max(1);
    points
        .into_iter()
        .enumerate()
        .filter_map(|(index, point)| (index % stride == 0).then_some(point))
        .collect()
}

fn merge_market_caps(left: &[HistoricalPoint], right: &[HistoricalPoint]) -> Vec<MergedPoint> {
    downsample(join_market_caps(left, right), MARKET_CAP_SAMPLE_STRIDE)
        .into_iter()
        .map(|(date, left, right)| MergedPoint {
            label: format_date(date),
            left,
            right,
        })
        .collect()
}

/// Inner join on calendar quarter, ascending. Quarterly granularity is
/// already sparse, so no downsampling.
fn merge_quarterlies(
    left: &[QuarterlyFinancials],
    right: &[QuarterlyFinancials],
    value: impl Fn(&QuarterlyFinancials) -> f64,
) -> Vec<MergedPoint> {
    let by_quarter: HashMap<CalendarQuarter, f64> =
        right.iter().map(|q| (q.quarter(), value(q))).collect();
    let mut joined: Vec<(CalendarQuarter, f64, f64)> = left
        .iter()
        .filter_map(|q| {
            by_quarter
                .get(&q.quarter())
                .map(|right_value| (q.quarter(), value(q), *right_value))
        })
        .collect();
    joined.sort_by_key(|(quarter, ..)| *quarter);
    joined
        .into_iter()
        .map(|(quarter, left, right)| MergedPoint {
            label: quarter.to_string(),
            left,
            right,
        })
        .collect()
}

/// Merged chart rows for two cached series under the selected metric.
pub fn merge_series(left: &SeriesEntry, right: &SeriesEntry, metric: Metric) -> Vec<MergedPoint> {
    match metric {
        Metric::MarketCap => merge_market_caps(&left.market_caps, &right.market_caps),
        Metric::Revenue => merge_quarterlies(&left.financials, &right.financials, |q| q.revenue),
        Metric::Earnings => {
            merge_quarterlies(&left.financials, &right.financials, |q| q.net_income)
        }
    }
}
