//! Metric calculation from matched statement records.

use earnings_core::{EarningsError, QuarterlyStatementRecord, Result};

/// Label describing how free cash flow is derived.
pub const FREE_CASH_FLOW_CALCULATION: &str = "Operating Cash Flow - Capital Expenditures";

/// Convert a raw amount to millions, rounded to two decimals.
#[must_use]
pub fn to_millions(value: f64) -> f64 {
    round2(value / 1_000_000.0)
}

fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    // Avoid emitting -0.0.
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Free cash flow and its components, in millions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FreeCashFlow {
    /// Operating cash flow minus capital expenditures.
    pub free_cash_flow: f64,
    /// Operating cash flow.
    pub operating_cash_flow: f64,
    /// Capital expenditures as a positive outflow.
    pub capital_expenditures: f64,
}

/// Total revenue of a record, in millions.
pub fn compute_revenue(record: &QuarterlyStatementRecord) -> Result<f64> {
    let revenue = required(record, record.total_revenue, "total_revenue")?;
    Ok(to_millions(revenue))
}

/// Free cash flow of a record, in millions.
///
/// Capital expenditures are taken as a magnitude, whatever sign the provider
/// reports them with. Both components are rounded before subtracting.
pub fn compute_free_cash_flow(record: &QuarterlyStatementRecord) -> Result<FreeCashFlow> {
    let ocf = required(record, record.operating_cash_flow, "operating_cash_flow")?;
    let capex = required(record, record.capital_expenditures, "capital_expenditures")?;

    let operating_cash_flow = to_millions(ocf);
    let capital_expenditures = to_millions(capex.abs());

    Ok(FreeCashFlow {
        free_cash_flow: round2(operating_cash_flow - capital_expenditures),
        operating_cash_flow,
        capital_expenditures,
    })
}

fn required(
    record: &QuarterlyStatementRecord,
    value: Option<f64>,
    field: &'static str,
) -> Result<f64> {
    value.ok_or(EarningsError::IncompleteRecord {
        fiscal_date_ending: record.fiscal_date_ending,
        field,
    })
}
