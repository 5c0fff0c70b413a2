use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize, Serializer};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::Date;

use crate::{Symbol, ValidationError};

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parse a provider calendar-date string (`YYYY-MM-DD`).
pub fn parse_date(input: &str) -> Result<Date, ValidationError> {
    Date::parse(input, DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        value: input.to_owned(),
    })
}

/// Format a calendar date the way the provider and the JSON surface spell it.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .expect("calendar dates are always formattable")
}

/// Serde adapter for `time::Date` fields carried as `YYYY-MM-DD` strings.
pub mod date_string {
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let value = String::deserialize(deserializer)?;
        super::parse_date(&value).map_err(D::Error::custom)
    }
}

/// One market-capitalization observation for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPoint {
    pub symbol: Symbol,
    #[serde(with = "date_string")]
    pub date: Date,
    pub market_cap: f64,
}

/// One quarterly income-statement observation for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterlyFinancials {
    pub symbol: Symbol,
    #[serde(with = "date_string")]
    pub date: Date,
    pub revenue: f64,
    pub net_income: f64,
}

impl QuarterlyFinancials {
    pub fn quarter(&self) -> CalendarQuarter {
        CalendarQuarter::from_date(self.date)
    }
}

/// Quarter bucket derived purely from the calendar month, independent of
/// any company's fiscal-year convention. Aligns quarterly reports of
/// companies with differing fiscal year ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarQuarter {
    pub year: i32,
    pub quarter: u8,
}

impl CalendarQuarter {
    /// Q1 = Jan-Mar, Q2 = Apr-Jun, Q3 = Jul-Sep, Q4 = Oct-Dec.
    pub fn from_date(date: Date) -> Self {
        Self {
            year: date.year(),
            quarter: (u8::from(date.month()) - 1) / 3 + 1,
        }
    }
}

impl Display for CalendarQuarter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-Q{}", self.year, self.quarter)
    }
}

impl Serialize for CalendarQuarter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_calendar_dates() {
        let date = parse_date("2024-11-15").expect("must parse");
        assert_eq!(format_date(date), "2024-11-15");
    }

    #[test]
    fn rejects_malformed_dates() {
        let err = parse_date("11/15/2024").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidDate { .. }));
    }

    #[test]
    fn buckets_november_into_q4() {
        let quarter = CalendarQuarter::from_date(parse_date("2024-11-15").expect("parses"));
        assert_eq!(quarter.to_string(), "2024-Q4");
    }

    #[test]
    fn buckets_january_first_into_q1() {
        let quarter = CalendarQuarter::from_date(parse_date("2024-01-01").expect("parses"));
        assert_eq!(quarter.to_string(), "2024-Q1");
    }

    #[test]
    fn quarter_boundaries_follow_calendar_months() {
        for (input, expected) in [
            ("2023-03-31", "2023-Q1"),
            ("2023-04-01", "2023-Q2"),
            ("2023-09-30", "2023-Q3"),
            ("2023-10-01", "2023-Q4"),
        ] {
            let quarter = CalendarQuarter::from_date(parse_date(input).expect("parses"));
            assert_eq!(quarter.to_string(), expected, "for {input}");
        }
    }

    #[test]
    fn historical_point_round_trips_camel_case_json() {
        let json = r#"{"symbol":"AAPL","date":"2024-06-03","marketCap":3000000000000.0}"#;
        let point: HistoricalPoint = serde_json::from_str(json).expect("deserializes");
        assert_eq!(point.symbol.as_str(), "AAPL");
        assert_eq!(serde_json::to_string(&point).expect("serializes"), json);
    }
}
