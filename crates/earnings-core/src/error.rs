//! Error types for earnings resolution.
//!
//! This module defines [`EarningsError`], which covers every failure a lookup
//! can end in, and [`ErrorKind`], the stable machine-readable tag that tool
//! callers branch on.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::company::{CompanySpec, SUPPORTED_COMPANIES};

/// Environment variable holding the upstream provider credential.
pub const API_KEY_ENV_VAR: &str = "ALPHAVANTAGE_API_KEY";

/// Errors that can occur while resolving a fiscal period request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EarningsError {
    /// The requested symbol is not in the supported set.
    #[error("Invalid company symbol '{symbol}'. Supported: {}", supported_symbols().join(", "))]
    InvalidCompany {
        /// The symbol that was requested.
        symbol: String,
    },

    /// The fiscal quarter is outside 1-4.
    #[error("Fiscal quarter must be 1, 2, 3, or 4 (got {0})")]
    InvalidQuarter(i64),

    /// The fiscal year is not a plausible four-digit year.
    #[error("Fiscal year must be between {min} and {max} (got {0})", min = MIN_FISCAL_YEAR, max = MAX_FISCAL_YEAR)]
    InvalidFiscalYear(i64),

    /// Tool arguments were missing, mistyped, or named an unknown tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// No provider credential is configured.
    #[error("Missing required credential: {variable} is not set")]
    MissingCredential {
        /// The configuration variable that must be set.
        variable: String,
    },

    /// Network failure, timeout, or unexpected HTTP status from the provider.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The provider throttled the request.
    #[error("Rate limited by {provider}: {message}")]
    UpstreamRateLimited {
        /// The provider that rejected the call.
        provider: String,
        /// The provider's own throttle notice.
        message: String,
    },

    /// The provider payload could not be read as quarterly reports.
    #[error("Malformed upstream response: {0}")]
    UpstreamMalformedResponse(String),

    /// No usable record exists at or before the expected period end.
    #[error("No quarterly data available for {symbol} on or before {expected}: {reason}")]
    NoDataAvailable {
        /// The symbol that was requested.
        symbol: String,
        /// The period end the request mapped to.
        expected: NaiveDate,
        /// Why no record qualified.
        reason: String,
    },

    /// The matched record lacks a field the metric needs.
    #[error("Quarterly record ending {fiscal_date_ending} is missing {field}")]
    IncompleteRecord {
        /// Period end of the matched record.
        fiscal_date_ending: NaiveDate,
        /// Name of the missing field.
        field: &'static str,
    },
}

/// Smallest fiscal year accepted in a request.
pub const MIN_FISCAL_YEAR: i64 = 1900;
/// Largest fiscal year accepted in a request.
pub const MAX_FISCAL_YEAR: i64 = 2100;

/// Valid fiscal quarters, as shown to callers.
pub const VALID_QUARTERS: [u8; 4] = [1, 2, 3, 4];

fn supported_symbols() -> Vec<&'static str> {
    SUPPORTED_COMPANIES.iter().map(CompanySpec::symbol).collect()
}

/// Machine-readable error category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// See [`EarningsError::InvalidCompany`].
    InvalidCompany,
    /// See [`EarningsError::InvalidQuarter`].
    InvalidQuarter,
    /// See [`EarningsError::InvalidFiscalYear`].
    InvalidFiscalYear,
    /// See [`EarningsError::InvalidArguments`].
    InvalidArguments,
    /// See [`EarningsError::MissingCredential`].
    MissingCredential,
    /// See [`EarningsError::UpstreamUnavailable`].
    UpstreamUnavailable,
    /// See [`EarningsError::UpstreamRateLimited`].
    UpstreamRateLimited,
    /// See [`EarningsError::UpstreamMalformedResponse`].
    UpstreamMalformedResponse,
    /// See [`EarningsError::NoDataAvailable`].
    NoDataAvailable,
    /// See [`EarningsError::IncompleteRecord`].
    IncompleteRecord,
}

impl ErrorKind {
    /// Returns the kind's wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCompany => "InvalidCompany",
            Self::InvalidQuarter => "InvalidQuarter",
            Self::InvalidFiscalYear => "InvalidFiscalYear",
            Self::InvalidArguments => "InvalidArguments",
            Self::MissingCredential => "MissingCredential",
            Self::UpstreamUnavailable => "UpstreamUnavailable",
            Self::UpstreamRateLimited => "UpstreamRateLimited",
            Self::UpstreamMalformedResponse => "UpstreamMalformedResponse",
            Self::NoDataAvailable => "NoDataAvailable",
            Self::IncompleteRecord => "IncompleteRecord",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EarningsError {
    /// Returns the machine-readable category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCompany { .. } => ErrorKind::InvalidCompany,
            Self::InvalidQuarter(_) => ErrorKind::InvalidQuarter,
            Self::InvalidFiscalYear(_) => ErrorKind::InvalidFiscalYear,
            Self::InvalidArguments(_) => ErrorKind::InvalidArguments,
            Self::MissingCredential { .. } => ErrorKind::MissingCredential,
            Self::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            Self::UpstreamRateLimited { .. } => ErrorKind::UpstreamRateLimited,
            Self::UpstreamMalformedResponse(_) => ErrorKind::UpstreamMalformedResponse,
            Self::NoDataAvailable { .. } => ErrorKind::NoDataAvailable,
            Self::IncompleteRecord { .. } => ErrorKind::IncompleteRecord,
        }
    }

    /// Creates a [`EarningsError::MissingCredential`] for the provider API key.
    #[must_use]
    pub fn missing_api_key() -> Self {
        Self::MissingCredential {
            variable: API_KEY_ENV_VAR.to_string(),
        }
    }

    /// Returns a short hint telling the caller how to recover.
    #[must_use]
    pub fn remediation_hint(&self) -> String {
        match self {
            Self::InvalidCompany { .. } => format!(
                "Use one of the supported symbols: {}",
                supported_symbols().join(", ")
            ),
            Self::InvalidQuarter(_) => "Pass fiscal_quarter as 1, 2, 3, or 4".to_string(),
            Self::InvalidFiscalYear(_) => {
                "Pass fiscal_year as a four-digit year, e.g. 2024".to_string()
            }
            Self::InvalidArguments(_) => {
                "Provide company_symbol (string), fiscal_year and fiscal_quarter (integers)"
                    .to_string()
            }
            Self::MissingCredential { variable } => format!(
                "Set {variable} in the environment or in a .env file before starting the server"
            ),
            Self::UpstreamUnavailable(_) => {
                "The data provider could not be reached; try again later".to_string()
            }
            Self::UpstreamRateLimited { .. } => {
                "The provider's call budget is exhausted; wait before retrying (free tier allows 25 calls per day)"
                    .to_string()
            }
            Self::UpstreamMalformedResponse(_) => {
                "The provider returned an unexpected payload; check the API key and symbol"
                    .to_string()
            }
            Self::NoDataAvailable { .. } => {
                "Request a quarter the company has already reported".to_string()
            }
            Self::IncompleteRecord { .. } => {
                "The provider has not published this figure for the quarter; try another quarter"
                    .to_string()
            }
        }
    }

    /// Returns the accepted values for input-validation errors.
    #[must_use]
    pub fn valid_values(&self) -> Option<Vec<String>> {
        match self {
            Self::InvalidCompany { .. } => Some(
                supported_symbols()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            ),
            Self::InvalidQuarter(_) => Some(VALID_QUARTERS.iter().map(u8::to_string).collect()),
            _ => None,
        }
    }
}

/// Result type alias using [`EarningsError`].
pub type Result<T> = std::result::Result<T, EarningsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_company_lists_supported_symbols() {
        let err = EarningsError::InvalidCompany {
            symbol: "AAPL".to_string(),
        };
        let message = err.to_string();
        for symbol in ["MSFT", "TSLA", "NVDA"] {
            assert!(message.contains(symbol), "{message}");
        }
        assert_eq!(
            err.valid_values(),
            Some(vec!["MSFT".into(), "TSLA".into(), "NVDA".into()])
        );
    }

    #[test]
    fn test_invalid_quarter_states_range() {
        let err = EarningsError::InvalidQuarter(5);
        assert_eq!(err.kind(), ErrorKind::InvalidQuarter);
        assert!(err.to_string().contains("1, 2, 3, or 4"));
        assert_eq!(err.valid_values().map(|v| v.len()), Some(4));
    }

    #[test]
    fn test_missing_credential_mentions_variable() {
        let err = EarningsError::missing_api_key();
        assert_eq!(err.kind(), ErrorKind::MissingCredential);
        assert!(err.remediation_hint().contains(API_KEY_ENV_VAR));
    }

    #[test]
    fn test_kind_serializes_as_name() {
        let json = serde_json::to_string(&ErrorKind::UpstreamRateLimited).unwrap();
        assert_eq!(json, "\"UpstreamRateLimited\"");
        assert_eq!(ErrorKind::NoDataAvailable.to_string(), "NoDataAvailable");
    }
}
