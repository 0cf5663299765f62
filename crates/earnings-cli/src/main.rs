//! `earnings` command-line tool.

mod cli;
mod error;

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use serde_json::{Value, json};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use earnings::{
    AlphaVantageConfig, CompanySpec, EarningsResolver, SUPPORTED_COMPANIES, ToolName, call_tool,
    list_tools,
};

use crate::cli::{Cli, Command, PeriodArgs};
use crate::error::{CliError, TOOL_ERROR_EXIT_CODE};

/// Extra dotenv file read after `.env`.
const DEV_ENV_FILE: &str = "config/.env.dev";

#[tokio::main]
async fn main() -> ExitCode {
    let loaded = load_env_files();
    init_tracing();
    for file in loaded {
        debug!(file = %file, "Loaded environment file");
    }

    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

/// Load `.env` and the dev env file. Variables already set are kept.
fn load_env_files() -> Vec<String> {
    let mut loaded = Vec::new();
    if let Ok(path) = dotenvy::dotenv() {
        loaded.push(path.display().to_string());
    }
    if Path::new(DEV_ENV_FILE).exists() && dotenvy::from_filename(DEV_ENV_FILE).is_ok() {
        loaded.push(DEV_ENV_FILE.to_string());
    }
    loaded
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();

    let output = match &cli.command {
        Command::Tools => serde_json::to_value(list_tools())?,
        Command::Companies => companies(),
        Command::Revenue(args) => {
            return invoke(&cli, ToolName::CompanyRevenue.as_str(), &period_arguments(args)).await;
        }
        Command::FreeCashFlow(args) => {
            return invoke(
                &cli,
                ToolName::CompanyFreeCashFlow.as_str(),
                &period_arguments(args),
            )
            .await;
        }
        Command::Call(args) => {
            let arguments: Value =
                serde_json::from_str(&args.arguments).map_err(CliError::InvalidArguments)?;
            return invoke(&cli, &args.tool, &arguments).await;
        }
    };

    print_json(&output, cli.pretty)?;
    Ok(ExitCode::SUCCESS)
}

async fn invoke(cli: &Cli, tool: &str, arguments: &Value) -> Result<ExitCode, CliError> {
    let resolver = resolver(cli)?;
    let output = call_tool(&resolver, tool, arguments).await;

    print_json(&serde_json::to_value(&output)?, cli.pretty)?;

    if output.is_error() {
        return Ok(ExitCode::from(TOOL_ERROR_EXIT_CODE));
    }
    Ok(ExitCode::SUCCESS)
}

fn resolver(cli: &Cli) -> Result<EarningsResolver, CliError> {
    let mut config = AlphaVantageConfig::from_env();
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    let resolver =
        EarningsResolver::alpha_vantage(config)?.with_fallback_policy(cli.fallback_policy());
    info!(provider = resolver.provider_name(), "Resolver ready");
    Ok(resolver)
}

fn period_arguments(args: &PeriodArgs) -> Value {
    json!({
        "company_symbol": args.symbol,
        "fiscal_year": args.fiscal_year,
        "fiscal_quarter": args.fiscal_quarter,
    })
}

fn companies() -> Value {
    let companies: Vec<Value> = SUPPORTED_COMPANIES
        .iter()
        .map(|company: &CompanySpec| {
            json!({
                "symbol": company.symbol(),
                "name": company.name(),
                "fiscal_year_end_month": company.fiscal_year_end_month(),
                "quarter_end_months": company.quarter_end_months(),
            })
        })
        .collect();
    Value::Array(companies)
}

fn print_json(value: &Value, pretty: bool) -> Result<(), CliError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}")?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_arguments() {
        let args = PeriodArgs {
            symbol: "tsla".to_string(),
            fiscal_year: 2023,
            fiscal_quarter: 2,
        };
        assert_eq!(
            period_arguments(&args),
            json!({"company_symbol": "tsla", "fiscal_year": 2023, "fiscal_quarter": 2})
        );
    }

    #[test]
    fn test_companies_listing() {
        let listing = companies();
        let entries = listing.as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["symbol"], "MSFT");
        assert_eq!(entries[0]["quarter_end_months"], json!([9, 12, 3, 6]));
        assert_eq!(entries[2]["symbol"], "NVDA");
        assert_eq!(entries[2]["quarter_end_months"], json!([4, 7, 10, 1]));
    }
}
