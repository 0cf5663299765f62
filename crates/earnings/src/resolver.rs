//! Request resolution: validation, fetch, match, compute, assemble.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use earnings_alphavantage::{AlphaVantageConfig, AlphaVantageProvider};
use earnings_core::{
    FiscalPeriodRequest, QuarterlyStatementRecord, Result, StatementKind, StatementProvider,
};

use crate::assembler::{FreeCashFlowResult, RevenueResult, assemble_free_cash_flow, assemble_revenue};
use crate::matcher::{FallbackPolicy, MatchedRecord, match_quarter};
use crate::metrics::{compute_free_cash_flow, compute_revenue};

/// Resolves fiscal period requests against a statement provider.
///
/// Holds no mutable state; one resolver can serve concurrent callers.
///
/// # Example
///
/// ```rust,ignore
/// use earnings::{AlphaVantageConfig, EarningsResolver};
///
/// let resolver = EarningsResolver::alpha_vantage(AlphaVantageConfig::from_env())?;
/// let revenue = resolver.revenue("MSFT", 2024, 4).await?;
/// println!("{}", revenue.total_revenue_usd_millions);
/// ```
#[derive(Clone)]
pub struct EarningsResolver {
    provider: Arc<dyn StatementProvider>,
    fallback: FallbackPolicy,
}

impl std::fmt::Debug for EarningsResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EarningsResolver")
            .field("provider", &self.provider.name())
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl EarningsResolver {
    /// Create a resolver over any statement provider with the default
    /// fallback policy.
    #[must_use]
    pub fn new(provider: Arc<dyn StatementProvider>) -> Self {
        Self {
            provider,
            fallback: FallbackPolicy::default(),
        }
    }

    /// Create a resolver backed by Alpha Vantage.
    pub fn alpha_vantage(config: AlphaVantageConfig) -> Result<Self> {
        let provider = AlphaVantageProvider::new(config)?;
        debug!(provider = ?provider, "Using Alpha Vantage provider");
        Ok(Self::new(Arc::new(provider)))
    }

    /// Set the fallback policy.
    #[must_use]
    pub const fn with_fallback_policy(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Returns the fallback policy in use.
    #[must_use]
    pub const fn fallback_policy(&self) -> &FallbackPolicy {
        &self.fallback
    }

    /// Returns the provider's name.
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Total revenue for a fiscal quarter.
    ///
    /// Inputs are validated before the provider is called.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn revenue(
        &self,
        symbol: &str,
        fiscal_year: i64,
        fiscal_quarter: i64,
    ) -> Result<RevenueResult> {
        let request = FiscalPeriodRequest::new(symbol, fiscal_year, fiscal_quarter)?;
        self.revenue_for(&request).await
    }

    /// Total revenue for a validated request.
    pub async fn revenue_for(&self, request: &FiscalPeriodRequest) -> Result<RevenueResult> {
        let history = self
            .history(request, StatementKind::IncomeStatement)
            .await?;
        let matched = self.select(request, &history)?;
        let revenue = compute_revenue(matched.record)?;

        info!(
            "Revenue for {} FY{} Q{}: ${revenue:.2}M",
            request.company().symbol(),
            request.fiscal_year(),
            request.fiscal_quarter()
        );

        assemble_revenue(request, matched, revenue, self.provider.name())
    }

    /// Free cash flow for a fiscal quarter.
    ///
    /// Inputs are validated before the provider is called.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn free_cash_flow(
        &self,
        symbol: &str,
        fiscal_year: i64,
        fiscal_quarter: i64,
    ) -> Result<FreeCashFlowResult> {
        let request = FiscalPeriodRequest::new(symbol, fiscal_year, fiscal_quarter)?;
        self.free_cash_flow_for(&request).await
    }

    /// Free cash flow for a validated request.
    pub async fn free_cash_flow_for(
        &self,
        request: &FiscalPeriodRequest,
    ) -> Result<FreeCashFlowResult> {
        let history = self.history(request, StatementKind::CashFlow).await?;
        let matched = self.select(request, &history)?;
        let values = compute_free_cash_flow(matched.record)?;

        info!(
            "Free cash flow for {} FY{} Q{}: ${:.2}M (OCF ${:.2}M - CapEx ${:.2}M)",
            request.company().symbol(),
            request.fiscal_year(),
            request.fiscal_quarter(),
            values.free_cash_flow,
            values.operating_cash_flow,
            values.capital_expenditures
        );

        assemble_free_cash_flow(request, matched, values, self.provider.name())
    }

    async fn history(
        &self,
        request: &FiscalPeriodRequest,
        statement: StatementKind,
    ) -> Result<Vec<QuarterlyStatementRecord>> {
        let symbol = request.symbol();
        debug!(symbol = %symbol, statement = %statement, "Fetching quarterly history");

        match self.provider.fetch_history(&symbol, statement).await {
            Ok(history) => Ok(history),
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    symbol = %symbol,
                    error = %e,
                    "Provider fetch failed"
                );
                Err(e)
            }
        }
    }

    fn select<'a>(
        &self,
        request: &FiscalPeriodRequest,
        history: &'a [QuarterlyStatementRecord],
    ) -> Result<MatchedRecord<'a>> {
        let expected = request.expected_fiscal_date_ending()?;
        let matched = match_quarter(&request.symbol(), history, expected, &self.fallback)?;

        if !matched.exact {
            warn!(
                request = %request,
                expected = %expected,
                used = %matched.record.fiscal_date_ending,
                "Requested quarter not reported, using earlier quarter"
            );
        }

        Ok(matched)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use earnings_core::{DataProvider, EarningsError, Symbol};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-process provider serving fixed histories.
    #[derive(Debug, Default)]
    pub(crate) struct FakeProvider {
        pub(crate) income: Vec<QuarterlyStatementRecord>,
        pub(crate) cash_flow: Vec<QuarterlyStatementRecord>,
        pub(crate) failure: Option<EarningsError>,
        pub(crate) calls: AtomicUsize,
    }

    impl FakeProvider {
        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn serve(&self, history: &[QuarterlyStatementRecord]) -> Result<Vec<QuarterlyStatementRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.failure {
                Some(err) => Err(err.clone()),
                None => Ok(history.to_vec()),
            }
        }
    }

    impl DataProvider for FakeProvider {
        fn name(&self) -> &str {
            "Fake"
        }

        fn description(&self) -> &str {
            "Fixed in-memory histories"
        }
    }

    #[async_trait]
    impl StatementProvider for FakeProvider {
        async fn fetch_income_statement_history(
            &self,
            _symbol: &Symbol,
        ) -> Result<Vec<QuarterlyStatementRecord>> {
            self.serve(&self.income)
        }

        async fn fetch_cash_flow_history(
            &self,
            _symbol: &Symbol,
        ) -> Result<Vec<QuarterlyStatementRecord>> {
            self.serve(&self.cash_flow)
        }
    }

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// MSFT histories covering FY2024 Q3 and Q4.
    pub(crate) fn msft_provider() -> FakeProvider {
        FakeProvider {
            income: vec![
                QuarterlyStatementRecord::new(StatementKind::IncomeStatement, date(2024, 6, 30))
                    .with_currency("USD")
                    .with_total_revenue(64_727_000_000.0),
                QuarterlyStatementRecord::new(StatementKind::IncomeStatement, date(2024, 3, 31))
                    .with_currency("USD")
                    .with_total_revenue(61_858_000_000.0),
            ],
            cash_flow: vec![
                QuarterlyStatementRecord::new(StatementKind::CashFlow, date(2024, 6, 30))
                    .with_currency("USD")
                    .with_operating_cash_flow(28_515_000_000.0)
                    .with_capital_expenditures(5_260_000_000.0),
            ],
            ..FakeProvider::default()
        }
    }

    fn resolver(provider: &Arc<FakeProvider>) -> EarningsResolver {
        EarningsResolver::new(provider.clone())
    }

    #[tokio::test]
    async fn test_exact_revenue() {
        let provider = Arc::new(msft_provider());
        let result = resolver(&provider).revenue("msft", 2024, 4).await.unwrap();

        assert_eq!(result.company, "MSFT");
        assert_eq!(result.fiscal_date_ending, date(2024, 6, 30));
        assert_eq!(result.total_revenue_usd_millions, 64727.0);
        assert_eq!(result.data_source, "Fake");
        assert!(result.exact_match);
        assert!(result.fallback_warning.is_none());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_free_cash_flow() {
        let provider = Arc::new(msft_provider());
        let result = resolver(&provider)
            .free_cash_flow("MSFT", 2024, 4)
            .await
            .unwrap();

        assert_eq!(result.free_cash_flow_usd_millions, 23255.0);
        assert_eq!(result.operating_cash_flow_usd_millions, 28515.0);
        assert_eq!(result.capital_expenditures_usd_millions, 5260.0);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_fallback_is_flagged() {
        let provider = Arc::new(msft_provider());
        let result = resolver(&provider)
            .free_cash_flow("MSFT", 2025, 1)
            .await
            .unwrap();

        assert!(!result.exact_match);
        assert_eq!(result.fiscal_date_ending, date(2024, 6, 30));
        let warning = result.fallback_warning.unwrap();
        assert!(warning.contains("2024-09-30"), "{warning}");
        assert!(warning.contains("2024-06-30"), "{warning}");
    }

    #[tokio::test]
    async fn test_invalid_inputs_never_reach_provider() {
        let provider = Arc::new(msft_provider());
        let resolver = resolver(&provider);

        for quarter in [0, 5] {
            let err = resolver.revenue("MSFT", 2024, quarter).await.unwrap_err();
            assert_eq!(err, EarningsError::InvalidQuarter(quarter));
        }

        let err = resolver.free_cash_flow("AAPL", 2024, 4).await.unwrap_err();
        assert!(matches!(err, EarningsError::InvalidCompany { .. }));
        let message = err.to_string();
        for symbol in ["MSFT", "TSLA", "NVDA"] {
            assert!(message.contains(symbol), "{message}");
        }

        let err = resolver.revenue("MSFT", 24, 4).await.unwrap_err();
        assert_eq!(err, EarningsError::InvalidFiscalYear(24));

        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_history_is_no_data() {
        let provider = Arc::new(FakeProvider::default());
        let err = resolver(&provider)
            .revenue("TSLA", 2024, 4)
            .await
            .unwrap_err();
        assert!(matches!(err, EarningsError::NoDataAvailable { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn test_missing_field_is_incomplete() {
        let provider = Arc::new(FakeProvider {
            cash_flow: vec![
                QuarterlyStatementRecord::new(StatementKind::CashFlow, date(2024, 12, 31))
                    .with_operating_cash_flow(4_814_000_000.0),
            ],
            ..FakeProvider::default()
        });
        let err = resolver(&provider)
            .free_cash_flow("TSLA", 2024, 4)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EarningsError::IncompleteRecord {
                field: "capital_expenditures",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let provider = Arc::new(FakeProvider {
            failure: Some(EarningsError::missing_api_key()),
            ..FakeProvider::default()
        });
        let err = resolver(&provider)
            .revenue("NVDA", 2025, 1)
            .await
            .unwrap_err();
        assert_eq!(err, EarningsError::missing_api_key());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_staleness_policy_applies() {
        let provider = Arc::new(msft_provider());
        let strict = resolver(&provider).with_fallback_policy(FallbackPolicy::within_days(30));
        let err = strict.revenue("MSFT", 2025, 2).await.unwrap_err();
        assert!(matches!(err, EarningsError::NoDataAvailable { .. }));

        let loose = resolver(&provider).with_fallback_policy(FallbackPolicy::unbounded());
        let result = loose.revenue("MSFT", 2026, 4).await.unwrap();
        assert_eq!(result.fiscal_date_ending, date(2024, 6, 30));
    }

    #[tokio::test]
    async fn test_repeated_lookup_is_byte_identical() {
        let provider = Arc::new(msft_provider());
        let resolver = resolver(&provider);

        let first = serde_json::to_string(&resolver.revenue("MSFT", 2024, 4).await.unwrap()).unwrap();
        let second =
            serde_json::to_string(&resolver.revenue("MSFT", 2024, 4).await.unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
