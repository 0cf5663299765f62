//! Fiscal calendar mapping.
//!
//! A company whose fiscal year `Y` ends in calendar month `M` closes its
//! fourth quarter at the end of month `M` of calendar year `Y`, and every
//! earlier quarter three months before the next. Fiscal years that do not end
//! in December therefore start in the previous calendar year: Microsoft's
//! FY2024 Q1 ends 2023-09-30 and its Q4 ends 2024-06-30.
//!
//! Upstream statements are dated on the last day of the closing month, so
//! that is the date produced here.

use chrono::{Datelike, Months, NaiveDate};

use crate::company::CompanySpec;
use crate::error::{EarningsError, Result};
use crate::types::Symbol;

/// Checks that a fiscal quarter is 1-4 and narrows it.
pub fn validate_quarter(fiscal_quarter: i64) -> Result<u8> {
    match fiscal_quarter {
        1..=4 => Ok(fiscal_quarter as u8),
        other => Err(EarningsError::InvalidQuarter(other)),
    }
}

/// Maps a fiscal period to the period-end date the provider reports it under.
///
/// # Errors
///
/// [`EarningsError::InvalidCompany`] for an unsupported symbol and
/// [`EarningsError::InvalidQuarter`] for a quarter outside 1-4.
pub fn expected_fiscal_date_ending(
    symbol: &Symbol,
    fiscal_year: i32,
    fiscal_quarter: i64,
) -> Result<NaiveDate> {
    let company = CompanySpec::lookup(symbol)?;
    let quarter = validate_quarter(fiscal_quarter)?;
    company.quarter_end_date(fiscal_year, quarter)
}

impl CompanySpec {
    /// Calendar months in which fiscal quarters 1 through 4 end.
    #[must_use]
    pub fn quarter_end_months(&self) -> [u32; 4] {
        [1, 2, 3, 4].map(|q| (self.fiscal_year_end_month() - 1 + 3 * q) % 12 + 1)
    }

    /// Returns the last calendar day of the given fiscal quarter.
    pub fn quarter_end_date(&self, fiscal_year: i32, fiscal_quarter: u8) -> Result<NaiveDate> {
        let quarter = validate_quarter(i64::from(fiscal_quarter))?;
        let months_before_year_end = 3 * (4 - i32::from(quarter));
        let index = fiscal_year * 12 + (self.fiscal_year_end_month() as i32 - 1)
            - months_before_year_end;

        last_day_of_month(index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
            .ok_or(EarningsError::InvalidFiscalYear(i64::from(fiscal_year)))
    }

    /// Returns the fiscal `(year, quarter)` a period-end date closes, if the
    /// date falls in one of the company's quarter-end months.
    #[must_use]
    pub fn fiscal_period_of(&self, date: NaiveDate) -> Option<(i32, u8)> {
        let position = self
            .quarter_end_months()
            .iter()
            .position(|m| *m == date.month())?;
        let quarter = position as u8 + 1;

        let index = date.year() * 12 + date.month0() as i32;
        let year_end_index = index + 3 * (4 - i32::from(quarter));
        let fiscal_year = (year_end_index - (self.fiscal_year_end_month() as i32 - 1)) / 12;

        Some((fiscal_year, quarter))
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}
