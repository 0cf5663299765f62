#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/earnings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Quarterly revenue and free cash flow resolution.
//!
//! This crate ties the fiscal calendar, a [`StatementProvider`], the record
//! matcher and the metric calculator into an [`EarningsResolver`], and exposes
//! it to agent frameworks through [`list_tools`] and [`call_tool`].
//!
//! # Example
//!
//! ```rust,ignore
//! use earnings::{AlphaVantageConfig, EarningsResolver, call_tool};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> earnings::Result<()> {
//!     let resolver = EarningsResolver::alpha_vantage(AlphaVantageConfig::from_env())?;
//!
//!     let output = call_tool(
//!         &resolver,
//!         "get_company_revenue",
//!         &json!({"company_symbol": "MSFT", "fiscal_year": 2024, "fiscal_quarter": 4}),
//!     )
//!     .await;
//!     println!("{}", serde_json::to_string_pretty(&output).unwrap());
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use earnings_core::*;

// Providers
pub use earnings_alphavantage::{AlphaVantageConfig, AlphaVantageProvider};

mod assembler;
mod matcher;
mod metrics;
mod resolver;
mod tools;

pub use assembler::{
    DEFAULT_CURRENCY, ErrorEnvelope, FreeCashFlowResult, RevenueResult, assemble_free_cash_flow,
    assemble_revenue,
};
pub use matcher::{DEFAULT_MAX_STALENESS_DAYS, FallbackPolicy, MatchedRecord, match_quarter};
pub use metrics::{
    FREE_CASH_FLOW_CALCULATION, FreeCashFlow, compute_free_cash_flow, compute_revenue, to_millions,
};
pub use resolver::EarningsResolver;
pub use tools::{
    DEFAULT_FISCAL_QUARTER, DEFAULT_FISCAL_YEAR, ToolArguments, ToolDescriptor, ToolName,
    ToolOutput, call_tool, list_tools,
};
