//! Command-line argument definitions.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `revenue` | Total revenue for a fiscal quarter |
//! | `free-cash-flow` | Free cash flow for a fiscal quarter |
//! | `call` | Invoke a tool by name with JSON arguments |
//! | `tools` | Print tool descriptors |
//! | `companies` | Print the supported companies and their fiscal calendars |

use clap::{Args, Parser, Subcommand};

use earnings::{DEFAULT_FISCAL_QUARTER, DEFAULT_FISCAL_YEAR, FallbackPolicy};

/// Quarterly revenue and free cash flow for MSFT, TSLA and NVDA.
///
/// Reads ALPHAVANTAGE_API_KEY from the environment, a `.env` file, or
/// `config/.env.dev`. Results are printed to stdout as JSON; logs go to
/// stderr and follow RUST_LOG.
#[derive(Debug, Parser)]
#[command(name = "earnings", author, version)]
pub(crate) struct Cli {
    /// Pretty-print JSON output.
    #[arg(long, global = true, default_value_t = false)]
    pub(crate) pretty: bool,

    /// Provider request timeout in seconds (at least 1).
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub(crate) timeout_secs: Option<u64>,

    /// Largest age in days of a record used in place of a missing quarter.
    #[arg(long, global = true, conflicts_with = "no_staleness_bound")]
    pub(crate) max_staleness_days: Option<u64>,

    /// Accept an earlier record of any age in place of a missing quarter.
    #[arg(long, global = true, default_value_t = false)]
    pub(crate) no_staleness_bound: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

impl Cli {
    /// Fallback policy selected by the flags.
    pub(crate) const fn fallback_policy(&self) -> FallbackPolicy {
        if self.no_staleness_bound {
            return FallbackPolicy::unbounded();
        }
        match self.max_staleness_days {
            Some(days) => FallbackPolicy::within_days(days),
            None => FallbackPolicy::within_days(earnings::DEFAULT_MAX_STALENESS_DAYS),
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Total revenue for a fiscal quarter.
    ///
    ///   earnings revenue MSFT --fiscal-year 2024 --fiscal-quarter 4
    Revenue(PeriodArgs),

    /// Free cash flow (operating cash flow minus capital expenditures).
    ///
    ///   earnings free-cash-flow NVDA -y 2025 -q 1
    FreeCashFlow(PeriodArgs),

    /// Invoke a tool by name with a JSON arguments object.
    ///
    ///   earnings call get_company_revenue '{"company_symbol": "TSLA"}'
    Call(CallArgs),

    /// Print the tool descriptors.
    Tools,

    /// Print the supported companies.
    Companies,
}

/// A company and fiscal period.
#[derive(Debug, Args)]
pub(crate) struct PeriodArgs {
    /// Company symbol (MSFT, TSLA, NVDA).
    pub(crate) symbol: String,

    /// Fiscal year.
    #[arg(short = 'y', long, default_value_t = DEFAULT_FISCAL_YEAR, allow_negative_numbers = true)]
    pub(crate) fiscal_year: i64,

    /// Fiscal quarter (1-4).
    #[arg(short = 'q', long, default_value_t = DEFAULT_FISCAL_QUARTER, allow_negative_numbers = true)]
    pub(crate) fiscal_quarter: i64,
}

/// A raw tool invocation.
#[derive(Debug, Args)]
pub(crate) struct CallArgs {
    /// Tool name, e.g. get_company_revenue.
    pub(crate) tool: String,

    /// JSON arguments object.
    #[arg(default_value = "{}")]
    pub(crate) arguments: String,
}
