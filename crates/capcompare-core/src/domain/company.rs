use serde::{Deserialize, Serialize};

use crate::Symbol;

/// Company profile as returned by the provider's profile endpoint.
///
/// `price` is only used to re-derive shares outstanding; it is never
/// surfaced to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub symbol: Symbol,
    pub company_name: String,
    pub market_cap: f64,
    pub beta: f64,
    pub price: f64,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

/// Fully enriched company metrics, available when the ratio dataset was
/// accessible for the symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullCompany {
    pub symbol: Symbol,
    pub company_name: String,
    pub market_cap: f64,
    #[serde(rename = "revenueTTM")]
    pub revenue_ttm: f64,
    #[serde(rename = "earningsTTM")]
    pub earnings_ttm: f64,
    pub beta: f64,
    pub operating_margin: f64,
    /// `None` when upstream reported zero: a zero P/E is "not meaningful",
    /// not a literal value.
    pub pe_ratio: Option<f64>,
    #[serde(rename = "fcfTTM")]
    pub fcf_ttm: f64,
    pub debt_to_equity: f64,
    pub is_limited: bool,
}

/// Reduced record used when the ratio dataset is tier-restricted for the
/// symbol, and for quick-phase sector results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitedCompany {
    pub symbol: Symbol,
    pub company_name: String,
    pub market_cap: f64,
    pub beta: f64,
    pub is_limited: bool,
}

impl LimitedCompany {
    pub fn from_profile(profile: &CompanyProfile) -> Self {
        Self {
            symbol: profile.symbol.clone(),
            company_name: profile.company_name.clone(),
            market_cap: profile.market_cap,
            beta: profile.beta,
            is_limited: true,
        }
    }
}

/// A company as surfaced to clients. A `Limited` record never carries
/// derived financial fields; consumers must branch on the variant before
/// reading extended fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompanyRecord {
    Full(FullCompany),
    Limited(LimitedCompany),
}

impl CompanyRecord {
    pub fn symbol(&self) -> &Symbol {
        match self {
            Self::Full(company) => &company.symbol,
            Self::Limited(company) => &company.symbol,
        }
    }

    pub fn market_cap(&self) -> f64 {
        match self {
            Self::Full(company) => company.market_cap,
            Self::Limited(company) => company.market_cap,
        }
    }

    pub const fn is_limited(&self) -> bool {
        matches!(self, Self::Limited(_))
    }
}

/// One row of the provider's market-cap screener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenerRow {
    pub symbol: Symbol,
    pub company_name: String,
    pub market_cap: f64,
    #[serde(default)]
    pub beta: f64,
}

impl ScreenerRow {
    /// Quick-phase shaping: screener fields only, no per-company fetch.
    pub fn to_limited(&self) -> LimitedCompany {
        LimitedCompany {
            symbol: self.symbol.clone(),
            company_name: self.company_name.clone(),
            market_cap: self.market_cap,
            beta: self.beta,
            is_limited: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> CompanyRecord {
        CompanyRecord::Full(FullCompany {
            symbol: Symbol::parse("AAPL").expect("valid"),
            company_name: String::from("Apple Inc."),
            market_cap: 3.0e12,
            revenue_ttm: 3.9e11,
            earnings_ttm: 1.0e11,
            beta: 1.25,
            operating_margin: 0.3,
            pe_ratio: Some(29.4),
            fcf_ttm: 1.1e11,
            debt_to_equity: 1.5,
            is_limited: false,
        })
    }

    #[test]
    fn full_record_serializes_with_ttm_field_names() {
        let json = serde_json::to_value(full_record()).expect("serializes");
        assert_eq!(json["isLimited"], false);
        assert!(json.get("revenueTTM").is_some());
        assert!(json.get("earningsTTM").is_some());
        assert!(json.get("fcfTTM").is_some());
        assert!(json.get("peRatio").is_some());
        assert!(json.get("debtToEquity").is_some());
    }

    #[test]
    fn limited_record_carries_no_derived_fields() {
        let record = CompanyRecord::Limited(LimitedCompany {
            symbol: Symbol::parse("SNOW").expect("valid"),
            company_name: String::from("Snowflake"),
            market_cap: 7.0e10,
            beta: 1.1,
            is_limited: true,
        });
        let json = serde_json::to_value(&record).expect("serializes");
        assert_eq!(json["isLimited"], true);
        assert!(json.get("revenueTTM").is_none());
        assert!(record.is_limited());
    }

    #[test]
    fn untagged_deserialization_picks_the_right_variant() {
        let full = serde_json::to_string(&full_record()).expect("serializes");
        let parsed: CompanyRecord = serde_json::from_str(&full).expect("deserializes");
        assert!(!parsed.is_limited());

        let limited = r#"{"symbol":"SNOW","companyName":"Snowflake","marketCap":7e10,"beta":1.1,"isLimited":true}"#;
        let parsed: CompanyRecord = serde_json::from_str(limited).expect("deserializes");
        assert!(parsed.is_limited());
    }
}
