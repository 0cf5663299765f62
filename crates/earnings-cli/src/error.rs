use thiserror::Error;

/// CLI-level failures mapped to exit codes.
///
/// Tool failures are not `CliError`s: they are printed as error envelopes and
/// exit with [`TOOL_ERROR_EXIT_CODE`].
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Setup(#[from] earnings::EarningsError),

    #[error("invalid JSON arguments: {0}")]
    InvalidArguments(serde_json::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Exit code when a tool returned an error envelope.
pub(crate) const TOOL_ERROR_EXIT_CODE: u8 = 3;

impl CliError {
    pub(crate) const fn exit_code(&self) -> u8 {
        match self {
            Self::Setup(_) => 1,
            Self::InvalidArguments(_) => 2,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let json_err = || serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let codes = [
            CliError::Setup(earnings::EarningsError::missing_api_key()).exit_code(),
            CliError::InvalidArguments(json_err()).exit_code(),
            CliError::Serialization(json_err()).exit_code(),
            CliError::Io(std::io::Error::other("closed")).exit_code(),
        ];
        for (i, code) in codes.iter().enumerate() {
            assert_ne!(*code, 0);
            assert_ne!(*code, TOOL_ERROR_EXIT_CODE);
            assert!(!codes[i + 1..].contains(code));
        }
    }

    #[test]
    fn test_invalid_arguments_message() {
        let err = CliError::InvalidArguments(
            serde_json::from_str::<serde_json::Value>("{nope").unwrap_err(),
        );
        assert!(err.to_string().starts_with("invalid JSON arguments"));
    }
}
