//! Result assembly.
//!
//! Output shapes for both tools and for failures are defined here and
//! nowhere else.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use earnings_core::{EarningsError, ErrorKind, FiscalPeriodRequest, Result};

use crate::matcher::MatchedRecord;
use crate::metrics::{FREE_CASH_FLOW_CALCULATION, FreeCashFlow};

/// Currency reported when the provider record does not carry one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Successful revenue lookup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevenueResult {
    /// Company symbol.
    pub company: String,
    /// Requested fiscal year.
    pub fiscal_year: i32,
    /// Requested fiscal quarter.
    pub fiscal_quarter: u8,
    /// Period end of the record the value came from.
    pub fiscal_date_ending: NaiveDate,
    /// Total revenue in millions.
    pub total_revenue_usd_millions: f64,
    /// Reporting currency.
    pub currency: String,
    /// Provider the record came from.
    pub data_source: String,
    /// Whether the record is the requested quarter itself.
    pub exact_match: bool,
    /// Set when an earlier quarter stood in for the requested one.
    pub fallback_warning: Option<String>,
}

/// Successful free cash flow lookup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FreeCashFlowResult {
    /// Company symbol.
    pub company: String,
    /// Requested fiscal year.
    pub fiscal_year: i32,
    /// Requested fiscal quarter.
    pub fiscal_quarter: u8,
    /// Period end of the record the values came from.
    pub fiscal_date_ending: NaiveDate,
    /// Free cash flow in millions.
    pub free_cash_flow_usd_millions: f64,
    /// Operating cash flow in millions.
    pub operating_cash_flow_usd_millions: f64,
    /// Capital expenditures in millions, as a positive outflow.
    pub capital_expenditures_usd_millions: f64,
    /// Reporting currency.
    pub currency: String,
    /// Provider the record came from.
    pub data_source: String,
    /// How free cash flow was derived.
    pub calculation: String,
    /// Whether the record is the requested quarter itself.
    pub exact_match: bool,
    /// Set when an earlier quarter stood in for the requested one.
    pub fallback_warning: Option<String>,
}

/// Failure returned to tool callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Always `"error"`.
    pub status: String,
    /// Human-readable description.
    pub message: String,
    /// Machine-readable category.
    pub error_kind: ErrorKind,
    /// How the caller can recover.
    pub remediation_hint: String,
    /// Accepted values, for input validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_values: Option<Vec<String>>,
}

impl From<&EarningsError> for ErrorEnvelope {
    fn from(err: &EarningsError) -> Self {
        Self {
            status: "error".to_string(),
            message: err.to_string(),
            error_kind: err.kind(),
            remediation_hint: err.remediation_hint(),
            valid_values: err.valid_values(),
        }
    }
}

impl From<EarningsError> for ErrorEnvelope {
    fn from(err: EarningsError) -> Self {
        Self::from(&err)
    }
}

/// Build a revenue result.
pub fn assemble_revenue(
    request: &FiscalPeriodRequest,
    matched: MatchedRecord<'_>,
    total_revenue_usd_millions: f64,
    data_source: &str,
) -> Result<RevenueResult> {
    Ok(RevenueResult {
        company: request.company().symbol().to_string(),
        fiscal_year: request.fiscal_year(),
        fiscal_quarter: request.fiscal_quarter(),
        fiscal_date_ending: matched.record.fiscal_date_ending,
        total_revenue_usd_millions,
        currency: currency_of(matched),
        data_source: data_source.to_string(),
        exact_match: matched.exact,
        fallback_warning: fallback_warning(request, matched)?,
    })
}

/// Build a free cash flow result.
pub fn assemble_free_cash_flow(
    request: &FiscalPeriodRequest,
    matched: MatchedRecord<'_>,
    values: FreeCashFlow,
    data_source: &str,
) -> Result<FreeCashFlowResult> {
    Ok(FreeCashFlowResult {
        company: request.company().symbol().to_string(),
        fiscal_year: request.fiscal_year(),
        fiscal_quarter: request.fiscal_quarter(),
        fiscal_date_ending: matched.record.fiscal_date_ending,
        free_cash_flow_usd_millions: values.free_cash_flow,
        operating_cash_flow_usd_millions: values.operating_cash_flow,
        capital_expenditures_usd_millions: values.capital_expenditures,
        currency: currency_of(matched),
        data_source: data_source.to_string(),
        calculation: FREE_CASH_FLOW_CALCULATION.to_string(),
        exact_match: matched.exact,
        fallback_warning: fallback_warning(request, matched)?,
    })
}

fn currency_of(matched: MatchedRecord<'_>) -> String {
    matched
        .record
        .reported_currency
        .clone()
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

fn fallback_warning(
    request: &FiscalPeriodRequest,
    matched: MatchedRecord<'_>,
) -> Result<Option<String>> {
    if matched.exact {
        return Ok(None);
    }

    let expected = request.expected_fiscal_date_ending()?;
    let used = matched.record.fiscal_date_ending;
    let used_period = match request.company().fiscal_period_of(used) {
        Some((year, quarter)) => format!(" (fiscal Q{quarter} FY{year})"),
        None => String::new(),
    };

    Ok(Some(format!(
        "Data for fiscal Q{} FY{} (period ending {expected}) is not available; \
         using the most recent earlier quarter ending {used}{used_period} instead",
        request.fiscal_quarter(),
        request.fiscal_year(),
    )))
}
