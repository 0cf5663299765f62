//! Core data types for quarterly earnings resolution.
//!
//! This module defines the request and record shapes:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`FiscalPeriodRequest`] - A validated (company, fiscal year, fiscal quarter) request
//! - [`StatementKind`] - Which provider statement a record came from
//! - [`QuarterlyStatementRecord`] - One normalized quarter of a statement history

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calendar::validate_quarter;
use crate::company::CompanySpec;
use crate::error::{EarningsError, MAX_FISCAL_YEAR, MIN_FISCAL_YEAR, Result};

/// A trading symbol/ticker.
///
/// Symbols are trimmed and uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A validated request for one fiscal quarter of one supported company.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FiscalPeriodRequest {
    company: &'static CompanySpec,
    fiscal_year: i32,
    fiscal_quarter: u8,
}

impl FiscalPeriodRequest {
    /// Validates and builds a request.
    ///
    /// Checks run in order: symbol, quarter, year. The first failure wins.
    pub fn new(symbol: impl Into<Symbol>, fiscal_year: i64, fiscal_quarter: i64) -> Result<Self> {
        let company = CompanySpec::lookup(&symbol.into())?;
        let fiscal_quarter = validate_quarter(fiscal_quarter)?;
        if !(MIN_FISCAL_YEAR..=MAX_FISCAL_YEAR).contains(&fiscal_year) {
            return Err(EarningsError::InvalidFiscalYear(fiscal_year));
        }

        Ok(Self {
            company,
            fiscal_year: fiscal_year as i32,
            fiscal_quarter,
        })
    }

    /// Returns the company being asked about.
    #[must_use]
    pub const fn company(&self) -> &'static CompanySpec {
        self.company
    }

    /// Returns the requested symbol.
    #[must_use]
    pub fn symbol(&self) -> Symbol {
        Symbol::new(self.company.symbol())
    }

    /// Returns the fiscal year label.
    #[must_use]
    pub const fn fiscal_year(&self) -> i32 {
        self.fiscal_year
    }

    /// Returns the fiscal quarter (1-4).
    #[must_use]
    pub const fn fiscal_quarter(&self) -> u8 {
        self.fiscal_quarter
    }

    /// Returns the period-end date the provider should report this quarter under.
    pub fn expected_fiscal_date_ending(&self) -> Result<NaiveDate> {
        self.company
            .quarter_end_date(self.fiscal_year, self.fiscal_quarter)
    }
}

impl fmt::Display for FiscalPeriodRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} FY{} Q{}",
            self.company.symbol(),
            self.fiscal_year,
            self.fiscal_quarter
        )
    }
}

/// The provider statement a record was read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    /// Income statement (revenue).
    IncomeStatement,
    /// Cash flow statement (operating cash flow, capital expenditures).
    CashFlow,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncomeStatement => f.write_str("income statement"),
            Self::CashFlow => f.write_str("cash flow"),
        }
    }
}

/// One quarter of a provider statement history.
///
/// Raw amounts are in the reporting currency's base unit. A field the provider
/// did not report is `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyStatementRecord {
    /// Last day of the reported quarter.
    pub fiscal_date_ending: NaiveDate,
    /// Statement the record came from.
    pub statement: StatementKind,
    /// Reporting currency code (e.g. "USD").
    pub reported_currency: Option<String>,
    /// Total revenue.
    pub total_revenue: Option<f64>,
    /// Operating cash flow.
    pub operating_cash_flow: Option<f64>,
    /// Capital expenditures.
    pub capital_expenditures: Option<f64>,
}

impl QuarterlyStatementRecord {
    /// Creates a record with no amounts.
    #[must_use]
    pub const fn new(statement: StatementKind, fiscal_date_ending: NaiveDate) -> Self {
        Self {
            fiscal_date_ending,
            statement,
            reported_currency: None,
            total_revenue: None,
            operating_cash_flow: None,
            capital_expenditures: None,
        }
    }

    /// Sets the reporting currency.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.reported_currency = Some(currency.into());
        self
    }

    /// Sets total revenue.
    #[must_use]
    pub const fn with_total_revenue(mut self, value: f64) -> Self {
        self.total_revenue = Some(value);
        self
    }

    /// Sets operating cash flow.
    #[must_use]
    pub const fn with_operating_cash_flow(mut self, value: f64) -> Self {
        self.operating_cash_flow = Some(value);
        self
    }

    /// Sets capital expenditures.
    #[must_use]
    pub const fn with_capital_expenditures(mut self, value: f64) -> Self {
        self.capital_expenditures = Some(value);
        self
    }
}
