//! Provider traits for fetching quarterly statements.
//!
//! This module defines the core provider traits:
//!
//! - [`DataProvider`] - Base trait for all data providers
//! - [`StatementProvider`] - Quarterly income statement and cash flow histories

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{QuarterlyStatementRecord, StatementKind, Symbol},
};

/// Base trait for all data providers.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "Alpha Vantage").
    ///
    /// This is the `data_source` label on every result built from its data.
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;
}

/// Provider for quarterly statement histories.
///
/// Each call costs one unit of the provider's rate budget and is attempted
/// exactly once. Returned histories are ordered newest first, as the
/// provider sent them, and contain only fully parsed records.
#[async_trait]
pub trait StatementProvider: DataProvider {
    /// Fetches the quarterly income statement history for a symbol.
    async fn fetch_income_statement_history(
        &self,
        symbol: &Symbol,
    ) -> Result<Vec<QuarterlyStatementRecord>>;

    /// Fetches the quarterly cash flow history for a symbol.
    async fn fetch_cash_flow_history(
        &self,
        symbol: &Symbol,
    ) -> Result<Vec<QuarterlyStatementRecord>>;

    /// Fetches the history for the given statement kind.
    async fn fetch_history(
        &self,
        symbol: &Symbol,
        statement: StatementKind,
    ) -> Result<Vec<QuarterlyStatementRecord>> {
        match statement {
            StatementKind::IncomeStatement => self.fetch_income_statement_history(symbol).await,
            StatementKind::CashFlow => self.fetch_cash_flow_history(symbol).await,
        }
    }
}
