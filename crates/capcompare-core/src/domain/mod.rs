//! Domain models shared across the gateway, cache, and web surface.

mod company;
mod series;
mod symbol;

pub use company::{CompanyProfile, CompanyRecord, FullCompany, LimitedCompany, ScreenerRow};
pub use series::{
    date_string, format_date, parse_date, CalendarQuarter, HistoricalPoint, QuarterlyFinancials,
};
pub use symbol::Symbol;
