//! Supported companies.
//!
//! Every company the service answers for is one [`CompanySpec`] row in
//! [`SUPPORTED_COMPANIES`]. Supporting another company only needs a new row
//! with its fiscal-year-end month.

use serde::Serialize;

use crate::error::{EarningsError, Result};
use crate::types::Symbol;

/// Static description of a supported company.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CompanySpec {
    symbol: &'static str,
    name: &'static str,
    fiscal_year_end_month: u32,
}

/// The companies this service resolves, in the order they are listed to callers.
pub static SUPPORTED_COMPANIES: &[CompanySpec] = &[
    CompanySpec::new("MSFT", "Microsoft Corporation", 6),
    CompanySpec::new("TSLA", "Tesla, Inc.", 12),
    CompanySpec::new("NVDA", "NVIDIA Corporation", 1),
];

impl CompanySpec {
    /// Creates a company entry.
    ///
    /// `fiscal_year_end_month` is the calendar month (1-12) in which the
    /// company's fourth fiscal quarter ends.
    #[must_use]
    pub const fn new(symbol: &'static str, name: &'static str, fiscal_year_end_month: u32) -> Self {
        Self {
            symbol,
            name,
            fiscal_year_end_month,
        }
    }

    /// Returns the ticker symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        self.symbol
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the calendar month in which the fiscal year ends.
    #[must_use]
    pub const fn fiscal_year_end_month(&self) -> u32 {
        self.fiscal_year_end_month
    }

    /// Looks up a supported company by symbol.
    pub fn lookup(symbol: &Symbol) -> Result<&'static Self> {
        SUPPORTED_COMPANIES
            .iter()
            .find(|c| c.symbol == symbol.as_str())
            .ok_or_else(|| EarningsError::InvalidCompany {
                symbol: symbol.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let company = CompanySpec::lookup(&Symbol::new("msft")).unwrap();
        assert_eq!(company.name(), "Microsoft Corporation");
        assert_eq!(company.fiscal_year_end_month(), 6);
    }

    #[test]
    fn test_lookup_unknown_symbol() {
        let err = CompanySpec::lookup(&Symbol::new("AAPL")).unwrap_err();
        assert_eq!(
            err,
            EarningsError::InvalidCompany {
                symbol: "AAPL".to_string()
            }
        );
    }

    #[test]
    fn test_table_months_are_valid() {
        assert_eq!(SUPPORTED_COMPANIES.len(), 3);
        for company in SUPPORTED_COMPANIES {
            assert!((1..=12).contains(&company.fiscal_year_end_month()));
        }
    }
}
