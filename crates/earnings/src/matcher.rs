//! Quarterly record matching.
//!
//! Picks the record for an expected period end out of a provider history,
//! falling back to the most recent earlier quarter when the exact one is
//! missing.

use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use tracing::warn;

use earnings_core::{EarningsError, QuarterlyStatementRecord, Result, Symbol};

/// Default bound on how far back a fallback record may lie.
pub const DEFAULT_MAX_STALENESS_DAYS: u64 = 366;

/// Controls which earlier records may stand in for a missing quarter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FallbackPolicy {
    /// Largest gap between the expected date and a fallback record's date.
    /// `None` accepts any earlier record.
    pub max_staleness: Option<Days>,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            max_staleness: Some(Days::new(DEFAULT_MAX_STALENESS_DAYS)),
        }
    }
}

impl FallbackPolicy {
    /// A policy with the given staleness bound in days.
    #[must_use]
    pub const fn within_days(days: u64) -> Self {
        Self {
            max_staleness: Some(Days::new(days)),
        }
    }

    /// A policy that accepts any earlier record.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_staleness: None,
        }
    }

    /// Oldest acceptable fallback date for an expected period end.
    fn cutoff(&self, expected: NaiveDate) -> Option<NaiveDate> {
        self.max_staleness
            .map(|days| expected.checked_sub_days(days).unwrap_or(NaiveDate::MIN))
    }
}

/// A record selected for a request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchedRecord<'a> {
    /// The selected record.
    pub record: &'a QuarterlyStatementRecord,
    /// Whether the record ends exactly on the expected date.
    pub exact: bool,
}

/// Select the record for `expected` from a statement history.
///
/// The exact record wins. Otherwise the most recent record strictly before
/// `expected` is used if it lies within the policy's staleness bound. When
/// several records share a date the first one in provider order is used.
pub fn match_quarter<'a>(
    symbol: &Symbol,
    history: &'a [QuarterlyStatementRecord],
    expected: NaiveDate,
    policy: &FallbackPolicy,
) -> Result<MatchedRecord<'a>> {
    let no_data = |reason: String| EarningsError::NoDataAvailable {
        symbol: symbol.to_string(),
        expected,
        reason,
    };

    if history.is_empty() {
        return Err(no_data("the provider returned no quarterly reports".into()));
    }

    warn_on_duplicates(symbol, history);

    if let Some(record) = history.iter().find(|r| r.fiscal_date_ending == expected) {
        return Ok(MatchedRecord {
            record,
            exact: true,
        });
    }

    // First record wins on equal dates.
    let earlier = history
        .iter()
        .filter(|r| r.fiscal_date_ending < expected)
        .fold(None::<&QuarterlyStatementRecord>, |best, r| match best {
            Some(b) if b.fiscal_date_ending >= r.fiscal_date_ending => Some(b),
            _ => Some(r),
        });

    let Some(record) = earlier else {
        let earliest = history
            .iter()
            .map(|r| r.fiscal_date_ending)
            .min()
            .unwrap_or(expected);
        return Err(no_data(format!(
            "no quarter ends on or before the expected date; the earliest reported quarter ends {earliest}"
        )));
    };

    if let Some(cutoff) = policy.cutoff(expected) {
        if record.fiscal_date_ending < cutoff {
            return Err(no_data(format!(
                "the most recent earlier quarter ends {}, more than {} days before the expected date",
                record.fiscal_date_ending,
                (expected - cutoff).num_days()
            )));
        }
    }

    Ok(MatchedRecord {
        record,
        exact: false,
    })
}

fn warn_on_duplicates(symbol: &Symbol, history: &[QuarterlyStatementRecord]) {
    let mut seen = HashSet::with_capacity(history.len());
    for record in history {
        if !seen.insert(record.fiscal_date_ending) {
            warn!(
                symbol = %symbol,
                fiscal_date_ending = %record.fiscal_date_ending,
                statement = %record.statement,
                "Duplicate quarterly report, keeping the first"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use earnings_core::StatementKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn revenue(d: NaiveDate, value: f64) -> QuarterlyStatementRecord {
        QuarterlyStatementRecord::new(StatementKind::IncomeStatement, d).with_total_revenue(value)
    }

    fn msft() -> Symbol {
        Symbol::new("MSFT")
    }

    #[test]
    fn test_exact_match() {
        let history = vec![
            revenue(date(2024, 6, 30), 64_727e6),
            revenue(date(2024, 3, 31), 61_858e6),
        ];
        let matched =
            match_quarter(&msft(), &history, date(2024, 3, 31), &FallbackPolicy::default())
                .unwrap();
        assert!(matched.exact);
        assert_eq!(matched.record.total_revenue, Some(61_858e6));
    }

    #[test]
    fn test_fallback_to_most_recent_earlier() {
        let history = vec![
            revenue(date(2024, 3, 31), 61_858e6),
            revenue(date(2023, 12, 31), 62_020e6),
        ];
        let matched =
            match_quarter(&msft(), &history, date(2024, 6, 30), &FallbackPolicy::default())
                .unwrap();
        assert!(!matched.exact);
        assert_eq!(matched.record.fiscal_date_ending, date(2024, 3, 31));
    }

    #[test]
    fn test_fallback_ignores_provider_order() {
        let history = vec![
            revenue(date(2023, 12, 31), 1.0),
            revenue(date(2024, 3, 31), 2.0),
            revenue(date(2024, 9, 30), 3.0),
        ];
        let matched =
            match_quarter(&msft(), &history, date(2024, 6, 30), &FallbackPolicy::default())
                .unwrap();
        assert_eq!(matched.record.total_revenue, Some(2.0));
    }

    #[test]
    fn test_duplicate_dates_keep_first() {
        let history = vec![
            revenue(date(2024, 6, 30), 1.0),
            revenue(date(2024, 6, 30), 2.0),
            revenue(date(2024, 3, 31), 3.0),
            revenue(date(2024, 3, 31), 4.0),
        ];
        let policy = FallbackPolicy::default();
        let exact = match_quarter(&msft(), &history, date(2024, 6, 30), &policy).unwrap();
        assert_eq!(exact.record.total_revenue, Some(1.0));

        let fallback = match_quarter(&msft(), &history, date(2024, 5, 31), &policy).unwrap();
        assert_eq!(fallback.record.total_revenue, Some(3.0));
    }

    #[test]
    fn test_empty_history() {
        let err = match_quarter(&msft(), &[], date(2024, 6, 30), &FallbackPolicy::default())
            .unwrap_err();
        assert!(matches!(err, EarningsError::NoDataAvailable { .. }), "{err:?}");
    }

    #[test]
    fn test_only_later_records() {
        let history = vec![revenue(date(2024, 9, 30), 1.0)];
        let err = match_quarter(&msft(), &history, date(2024, 6, 30), &FallbackPolicy::default())
            .unwrap_err();
        match err {
            EarningsError::NoDataAvailable {
                symbol,
                expected,
                reason,
            } => {
                assert_eq!(symbol, "MSFT");
                assert_eq!(expected, date(2024, 6, 30));
                assert!(reason.contains("2024-09-30"));
            }
            other => panic!("expected NoDataAvailable, got {other:?}"),
        }
    }

    #[test]
    fn test_staleness_bound() {
        let history = vec![revenue(date(2022, 6, 30), 1.0)];
        let expected = date(2024, 6, 30);

        let err = match_quarter(&msft(), &history, expected, &FallbackPolicy::default())
            .unwrap_err();
        assert!(matches!(err, EarningsError::NoDataAvailable { .. }));

        let matched =
            match_quarter(&msft(), &history, expected, &FallbackPolicy::unbounded()).unwrap();
        assert!(!matched.exact);

        let matched =
            match_quarter(&msft(), &history, expected, &FallbackPolicy::within_days(731)).unwrap();
        assert_eq!(matched.record.fiscal_date_ending, date(2022, 6, 30));
    }

    #[test]
    fn test_default_bound_accepts_same_quarter_last_year() {
        let history = vec![revenue(date(2023, 6, 30), 1.0)];
        let matched =
            match_quarter(&msft(), &history, date(2024, 6, 30), &FallbackPolicy::default())
                .unwrap();
        assert!(!matched.exact);
    }
}
