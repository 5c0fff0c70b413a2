//! Test support: a scripted HTTP double and provider response builders.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use capcompare_core::{FmpGateway, HttpClient, HttpError, HttpRequest, HttpResponse};
use serde_json::{json, Value};

pub const TEST_BASE_URL: &str = "https://fmp.test/stable";

enum ScriptAction {
    Respond { status: u16, body: String },
    Fail(String),
}

/// HTTP double scripted by URL substring. Later scripts take precedence,
/// so a test can lay down a broad default and then override one endpoint.
/// Every executed URL is recorded for call-count and ordering assertions.
#[derive(Default)]
pub struct ScriptedHttp {
    scripts: Mutex<Vec<(String, ScriptAction)>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedHttp {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, url_fragment: &str, status: u16, body: Value) {
        self.scripts.lock().unwrap().push((
            url_fragment.to_owned(),
            ScriptAction::Respond {
                status,
                body: body.to_string(),
            },
        ));
    }

    pub fn fail(&self, url_fragment: &str, message: &str) {
        self.scripts
            .lock()
            .unwrap()
            .push((url_fragment.to_owned(), ScriptAction::Fail(message.to_owned())));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_containing(&self, fragment: &str) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.contains(fragment))
            .cloned()
            .collect()
    }
}

impl HttpClient for ScriptedHttp {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let url = request.url.clone();
            self.calls.lock().unwrap().push(url.clone());
            let scripts = self.scripts.lock().unwrap();
            for (fragment, action) in scripts.iter().rev() {
                if url.contains(fragment.as_str()) {
                    return match action {
                        ScriptAction::Respond { status, body } => Ok(HttpResponse {
                            status: *status,
                            body: body.clone(),
                        }),
                        ScriptAction::Fail(message) => Err(HttpError::new(message.clone())),
                    };
                }
            }
            Err(HttpError::new(format!("no script matches {url}")))
        })
    }
}

pub fn gateway(http: Arc<ScriptedHttp>) -> FmpGateway {
    FmpGateway::new(http, "test-key").with_base_url(TEST_BASE_URL)
}

pub fn profile_json(symbol: &str, name: &str, market_cap: f64, price: f64, beta: f64) -> Value {
    json!([{
        "symbol": symbol,
        "companyName": name,
        "marketCap": market_cap,
        "price": price,
        "beta": beta,
        "sector": "Technology",
        "industry": "Software - Application",
    }])
}

pub fn ratios_json(revenue_ps: f64, earnings_ps: f64, fcf_ps: f64, pe: f64) -> Value {
    json!([{
        "operatingProfitMarginTTM": 0.25,
        "priceToEarningsRatioTTM": pe,
        "freeCashFlowPerShareTTM": fcf_ps,
        "revenuePerShareTTM": revenue_ps,
        "netIncomePerShareTTM": earnings_ps,
        "debtToEquityRatioTTM": 0.8,
    }])
}

/// Screener rows descending by a synthetic market cap so ordering is easy
/// to assert on.
pub fn screener_json(symbols: &[&str]) -> Value {
    let rows: Vec<Value> = symbols
        .iter()
        .enumerate()
        .map(|(index, symbol)| {
            json!({
                "symbol": symbol,
                "companyName": format!("{symbol} Inc."),
                "marketCap": 1.0e12 - index as f64 * 1.0e9,
                "beta": 1.0,
            })
        })
        .collect();
    Value::Array(rows)
}

pub fn eod_json(rows: &[(&str, f64)]) -> Value {
    let rows: Vec<Value> = rows
        .iter()
        .map(|(date, close)| json!({ "date": date, "close": close }))
        .collect();
    Value::Array(rows)
}

pub fn market_cap_json(symbol: &str, rows: &[(&str, f64)]) -> Value {
    let rows: Vec<Value> = rows
        .iter()
        .map(|(date, market_cap)| {
            json!({ "symbol": symbol, "date": date, "marketCap": market_cap })
        })
        .collect();
    Value::Array(rows)
}

pub fn income_json(rows: &[(&str, f64, f64)]) -> Value {
    let rows: Vec<Value> = rows
        .iter()
        .map(|(date, revenue, net_income)| {
            json!({ "date": date, "revenue": revenue, "netIncome": net_income })
        })
        .collect();
    Value::Array(rows)
}

/// The `symbol=` query value of a recorded URL.
pub fn symbol_param(url: &str) -> Option<&str> {
    let start = url.find("symbol=")? + "symbol=".len();
    let rest = &url[start..];
    Some(rest.split('&').next().unwrap_or(rest))
}
