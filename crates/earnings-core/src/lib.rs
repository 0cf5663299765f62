#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/earnings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for quarterly earnings resolution.
//!
//! - [`CompanySpec`](company::CompanySpec) - Supported companies and their fiscal year ends
//! - [`expected_fiscal_date_ending`](calendar::expected_fiscal_date_ending) - Fiscal quarter to period-end date
//! - [`FiscalPeriodRequest`](types::FiscalPeriodRequest) - Validated lookup request
//! - [`StatementProvider`](provider::StatementProvider) - Upstream statement histories
//! - [`EarningsError`](error::EarningsError) - Typed failures

/// Fiscal calendar mapping.
pub mod calendar;
/// Supported company table.
pub mod company;
/// Error types for earnings resolution.
pub mod error;
/// Provider traits for fetching statements.
pub mod provider;
/// Core data types (Symbol, requests, records).
pub mod types;

// Re-export commonly used items at crate root
pub use calendar::expected_fiscal_date_ending;
pub use company::{CompanySpec, SUPPORTED_COMPANIES};
pub use error::{API_KEY_ENV_VAR, EarningsError, ErrorKind, Result};
pub use provider::{DataProvider, StatementProvider};
pub use types::{FiscalPeriodRequest, QuarterlyStatementRecord, StatementKind, Symbol};
