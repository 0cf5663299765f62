#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/earnings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Alpha Vantage quarterly statement provider.
//!
//! # Usage
//!
//! ```rust,ignore
//! use earnings_alphavantage::{AlphaVantageConfig, AlphaVantageProvider};
//! use earnings_core::{StatementProvider, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = AlphaVantageProvider::new(AlphaVantageConfig::new("your_api_key"))?;
//!
//!     let history = provider
//!         .fetch_income_statement_history(&Symbol::new("MSFT"))
//!         .await?;
//!     println!("{} quarters", history.len());
//!
//!     Ok(())
//! }
//! ```

mod config;

pub use config::{
    ALPHAVANTAGE_BASE_URL, AlphaVantageConfig, BASE_URL_ENV_VAR, DEFAULT_TIMEOUT, TIMEOUT_ENV_VAR,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use earnings_core::{
    DataProvider, EarningsError, QuarterlyStatementRecord, Result, StatementKind,
    StatementProvider, Symbol,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

/// Provider name, reported as `data_source` on results.
const PROVIDER_NAME: &str = "Alpha Vantage";

/// Longest slice of a response body quoted back in an error message.
const MAX_BODY_EXCERPT: usize = 300;

/// Phrases Alpha Vantage uses in its throttle notices.
const THROTTLE_MARKERS: &[&str] = &[
    "rate limit",
    "call frequency",
    "calls per minute",
    "requests per day",
];

/// Alpha Vantage statement provider.
///
/// Reads quarterly income statements and cash flow statements. Every fetch is
/// exactly one HTTP call bounded by the configured timeout.
#[derive(Clone)]
pub struct AlphaVantageProvider {
    client: Client,
    config: AlphaVantageConfig,
}

impl fmt::Debug for AlphaVantageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlphaVantageProvider")
            .field("config", &self.config)
            .finish()
    }
}

impl AlphaVantageProvider {
    /// Create a provider, building an HTTP client with the configured timeout.
    pub fn new(config: AlphaVantageConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                EarningsError::UpstreamUnavailable(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Create a provider with a custom HTTP client.
    ///
    /// The configured timeout is still applied to every request.
    #[must_use]
    pub const fn with_client(client: Client, config: AlphaVantageConfig) -> Self {
        Self { client, config }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &AlphaVantageConfig {
        &self.config
    }

    /// Fetch and normalize one statement history.
    async fn fetch_statement(
        &self,
        symbol: &Symbol,
        statement: StatementKind,
    ) -> Result<Vec<QuarterlyStatementRecord>> {
        let api_key = self
            .config
            .credential()
            .ok_or_else(EarningsError::missing_api_key)?;
        let function = function_name(statement);

        debug!(function, symbol = %symbol, "Alpha Vantage request");

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("function", function),
                ("symbol", symbol.as_str()),
                ("apikey", api_key),
            ])
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(function, symbol, e))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let text = response.text().await.unwrap_or_default();
            return Err(EarningsError::UpstreamRateLimited {
                provider: PROVIDER_NAME.to_string(),
                message: format!("{function} {symbol}: HTTP {status}: {}", excerpt(&text)),
            });
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(EarningsError::UpstreamUnavailable(format!(
                "{function} {symbol}: HTTP {status}: {}",
                excerpt(&text)
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(function, symbol, e))?;

        let payload = parse_statement_payload(&text)?;
        let records = normalize_reports(symbol, statement, payload.quarterly_reports);

        debug!(
            function,
            symbol = %symbol,
            quarters = records.len(),
            "Alpha Vantage response parsed"
        );

        Ok(records)
    }

    /// The request URL carries the API key, so it is stripped from the error.
    fn transport_error(&self, function: &str, symbol: &Symbol, e: reqwest::Error) -> EarningsError {
        let e = e.without_url();
        if e.is_timeout() {
            EarningsError::UpstreamUnavailable(format!(
                "{function} {symbol}: no response within {}s",
                self.config.timeout.as_secs_f64()
            ))
        } else {
            EarningsError::UpstreamUnavailable(format!("{function} {symbol}: {e}"))
        }
    }
}

impl DataProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn description(&self) -> &str {
        "Alpha Vantage - quarterly income statement and cash flow reports"
    }
}

#[async_trait]
impl StatementProvider for AlphaVantageProvider {
    async fn fetch_income_statement_history(
        &self,
        symbol: &Symbol,
    ) -> Result<Vec<QuarterlyStatementRecord>> {
        self.fetch_statement(symbol, StatementKind::IncomeStatement)
            .await
    }

    async fn fetch_cash_flow_history(
        &self,
        symbol: &Symbol,
    ) -> Result<Vec<QuarterlyStatementRecord>> {
        self.fetch_statement(symbol, StatementKind::CashFlow).await
    }
}

/// Alpha Vantage `function` parameter for a statement.
const fn function_name(statement: StatementKind) -> &'static str {
    match statement {
        StatementKind::IncomeStatement => "INCOME_STATEMENT",
        StatementKind::CashFlow => "CASH_FLOW",
    }
}

/// Parse a response body, classifying Alpha Vantage's in-band error payloads.
///
/// Alpha Vantage answers throttled and rejected calls with HTTP 200 and a
/// `Note`, `Information` or `Error Message` object instead of reports.
fn parse_statement_payload(body: &str) -> Result<StatementResponse> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        EarningsError::UpstreamMalformedResponse(format!("{e}: {}", excerpt(body)))
    })?;

    for key in ["Note", "Information"] {
        if let Some(notice) = value.get(key).and_then(Value::as_str) {
            let lowered = notice.to_lowercase();
            if THROTTLE_MARKERS.iter().any(|m| lowered.contains(m)) {
                return Err(EarningsError::UpstreamRateLimited {
                    provider: PROVIDER_NAME.to_string(),
                    message: notice.to_string(),
                });
            }
            return Err(EarningsError::UpstreamMalformedResponse(format!(
                "provider notice instead of reports: {notice}"
            )));
        }
    }

    if let Some(message) = value.get("Error Message").and_then(Value::as_str) {
        return Err(EarningsError::UpstreamMalformedResponse(format!(
            "provider rejected the request: {message}"
        )));
    }

    serde_json::from_value(value).map_err(|e| {
        EarningsError::UpstreamMalformedResponse(format!(
            "expected quarterlyReports: {e}: {}",
            excerpt(body)
        ))
    })
}

/// Convert raw reports to records, dropping any that do not fully parse.
fn normalize_reports(
    symbol: &Symbol,
    statement: StatementKind,
    reports: Vec<AlphaVantageReport>,
) -> Vec<QuarterlyStatementRecord> {
    let total = reports.len();
    let records: Vec<_> = reports
        .into_iter()
        .enumerate()
        .filter_map(|(index, report)| match report.into_record(statement) {
            Ok(record) => Some(record),
            Err(reason) => {
                warn!(
                    symbol = %symbol,
                    statement = %statement,
                    index,
                    reason = %reason,
                    "Excluding unparseable quarterly report"
                );
                None
            }
        })
        .collect();

    if records.len() < total {
        warn!(
            symbol = %symbol,
            statement = %statement,
            kept = records.len(),
            total,
            "Some quarterly reports were excluded"
        );
    }

    records
}

/// Parse an Alpha Vantage amount.
///
/// Amounts arrive as strings; `"None"` and empty strings mean "not reported".
fn parse_amount(field: &str, value: Option<&Value>) -> std::result::Result<Option<f64>, String> {
    let parsed = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() || s.eq_ignore_ascii_case("none") {
                return Ok(None);
            }
            s.parse::<f64>()
                .map_err(|_| format!("{field} is not a number: {s:?}"))?
        }
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| format!("{field} is out of range: {n}"))?,
        Some(other) => return Err(format!("{field} has unexpected type: {other}")),
    };

    if parsed.is_finite() {
        Ok(Some(parsed))
    } else {
        Err(format!("{field} is not finite"))
    }
}

fn excerpt(text: &str) -> &str {
    match text.char_indices().nth(MAX_BODY_EXCERPT) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

// ============================================================================
// Alpha Vantage API Response Types
// ============================================================================

/// Statement response (`INCOME_STATEMENT` or `CASH_FLOW`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementResponse {
    quarterly_reports: Vec<AlphaVantageReport>,
}

/// One entry of `quarterlyReports`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlphaVantageReport {
    #[serde(default)]
    fiscal_date_ending: Option<String>,
    #[serde(default)]
    reported_currency: Option<String>,
    #[serde(default)]
    total_revenue: Option<Value>,
    #[serde(default)]
    operating_cashflow: Option<Value>,
    #[serde(default)]
    capital_expenditures: Option<Value>,
}

impl AlphaVantageReport {
    fn into_record(
        self,
        statement: StatementKind,
    ) -> std::result::Result<QuarterlyStatementRecord, String> {
        let raw_date = self
            .fiscal_date_ending
            .ok_or_else(|| "fiscalDateEnding is missing".to_string())?;
        let date = NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d")
            .map_err(|e| format!("fiscalDateEnding {raw_date:?}: {e}"))?;

        let mut record = QuarterlyStatementRecord::new(statement, date);
        record.reported_currency = self
            .reported_currency
            .filter(|c| !c.trim().is_empty() && !c.eq_ignore_ascii_case("none"));

        match statement {
            StatementKind::IncomeStatement => {
                record.total_revenue = parse_amount("totalRevenue", self.total_revenue.as_ref())?;
            }
            StatementKind::CashFlow => {
                record.operating_cash_flow =
                    parse_amount("operatingCashflow", self.operating_cashflow.as_ref())?;
                record.capital_expenditures =
                    parse_amount("capitalExpenditures", self.capital_expenditures.as_ref())?;
            }
        }

        Ok(record)
    }
}
