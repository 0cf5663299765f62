//! Tool descriptors and dispatch for agent frameworks.
//!
//! A transport registers the descriptors from [`list_tools`] and forwards
//! each invocation to [`call_tool`], which never fails: every error comes
//! back as an [`ErrorEnvelope`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use earnings_core::{CompanySpec, EarningsError, Result, SUPPORTED_COMPANIES};

use crate::assembler::{ErrorEnvelope, FreeCashFlowResult, RevenueResult};
use crate::resolver::EarningsResolver;

/// Fiscal year used when a call omits it.
pub const DEFAULT_FISCAL_YEAR: i64 = 2024;

/// Fiscal quarter used when a call omits it.
pub const DEFAULT_FISCAL_QUARTER: i64 = 4;

/// The tools this crate exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolName {
    /// `get_company_revenue`
    #[serde(rename = "get_company_revenue")]
    CompanyRevenue,
    /// `get_company_free_cash_flow`
    #[serde(rename = "get_company_free_cash_flow")]
    CompanyFreeCashFlow,
}

impl ToolName {
    /// All tools, in registration order.
    pub const ALL: [Self; 2] = [Self::CompanyRevenue, Self::CompanyFreeCashFlow];

    /// Returns the wire name of the tool.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CompanyRevenue => "get_company_revenue",
            Self::CompanyFreeCashFlow => "get_company_free_cash_flow",
        }
    }

    const fn description(&self) -> &'static str {
        match self {
            Self::CompanyRevenue => {
                "Get total revenue for a company in a specific fiscal quarter. \
                 Supports MSFT, TSLA and NVDA; fiscal quarters follow each company's \
                 own fiscal calendar. Values are in millions of USD."
            }
            Self::CompanyFreeCashFlow => {
                "Get free cash flow (operating cash flow minus capital expenditures) \
                 for a company in a specific fiscal quarter. Supports MSFT, TSLA and NVDA; \
                 fiscal quarters follow each company's own fiscal calendar. Values are in \
                 millions of USD."
            }
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = EarningsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| {
                EarningsError::InvalidArguments(format!(
                    "unknown tool '{s}'; available tools: {}",
                    Self::ALL.map(|t| t.as_str()).join(", ")
                ))
            })
    }
}

/// Registration data for one tool.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolDescriptor {
    /// Tool name.
    pub name: ToolName,
    /// Human-readable description shown to the agent.
    pub description: String,
    /// JSON Schema of the arguments object.
    pub input_schema: Value,
}

/// Descriptors for every tool.
#[must_use]
pub fn list_tools() -> Vec<ToolDescriptor> {
    ToolName::ALL
        .into_iter()
        .map(|name| ToolDescriptor {
            name,
            description: name.description().to_string(),
            input_schema: input_schema(),
        })
        .collect()
}

fn input_schema() -> Value {
    let symbols: Vec<&str> = SUPPORTED_COMPANIES.iter().map(CompanySpec::symbol).collect();
    json!({
        "type": "object",
        "properties": {
            "company_symbol": {
                "type": "string",
                "description": format!("Company stock symbol ({})", symbols.join(", ")),
                "enum": symbols,
            },
            "fiscal_year": {
                "type": "integer",
                "description": "Fiscal year, e.g. 2024",
                "default": DEFAULT_FISCAL_YEAR,
            },
            "fiscal_quarter": {
                "type": "integer",
                "description": "Fiscal quarter (1-4)",
                "minimum": 1,
                "maximum": 4,
                "default": DEFAULT_FISCAL_QUARTER,
            },
        },
        "required": ["company_symbol"],
    })
}

/// Parsed tool arguments, before domain validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolArguments {
    /// Requested symbol, uppercased.
    pub company_symbol: String,
    /// Requested fiscal year.
    pub fiscal_year: i64,
    /// Requested fiscal quarter.
    pub fiscal_quarter: i64,
}

impl ToolArguments {
    /// Parse an arguments object.
    ///
    /// Numbers may be integers or integral floats. `null` counts as omitted.
    pub fn from_value(arguments: &Value) -> Result<Self> {
        let empty = Map::new();
        let object = match arguments {
            Value::Object(object) => object,
            Value::Null => &empty,
            other => {
                return Err(EarningsError::InvalidArguments(format!(
                    "arguments must be an object, got {other}"
                )));
            }
        };

        let company_symbol = match object.get("company_symbol") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_uppercase(),
            None | Some(Value::Null) | Some(Value::String(_)) => {
                return Err(EarningsError::InvalidArguments(
                    "company_symbol is required".to_string(),
                ));
            }
            Some(other) => {
                return Err(EarningsError::InvalidArguments(format!(
                    "company_symbol must be a string, got {other}"
                )));
            }
        };

        Ok(Self {
            company_symbol,
            fiscal_year: integer_argument(object, "fiscal_year", DEFAULT_FISCAL_YEAR)?,
            fiscal_quarter: integer_argument(object, "fiscal_quarter", DEFAULT_FISCAL_QUARTER)?,
        })
    }
}

fn integer_argument(object: &Map<String, Value>, name: &str, default: i64) -> Result<i64> {
    let invalid = |value: &Value| {
        EarningsError::InvalidArguments(format!("{name} must be an integer, got {value}"))
    };

    match object.get(name) {
        None | Some(Value::Null) => Ok(default),
        Some(value @ Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                _ => Err(invalid(value)),
            }
        }
        Some(other) => Err(invalid(other)),
    }
}

/// Output of a tool call.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    /// `get_company_revenue` success.
    Revenue(RevenueResult),
    /// `get_company_free_cash_flow` success.
    FreeCashFlow(FreeCashFlowResult),
    /// Any failure.
    Error(ErrorEnvelope),
}

impl ToolOutput {
    /// Whether the call failed.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl From<EarningsError> for ToolOutput {
    fn from(err: EarningsError) -> Self {
        Self::Error(ErrorEnvelope::from(err))
    }
}

/// Invoke a tool by name with MCP-style JSON arguments.
pub async fn call_tool(resolver: &EarningsResolver, name: &str, arguments: &Value) -> ToolOutput {
    debug!(tool = name, arguments = %arguments, "Tool call");

    match dispatch(resolver, name, arguments).await {
        Ok(output) => output,
        Err(err) => {
            warn!(tool = name, kind = %err.kind(), error = %err, "Tool call failed");
            err.into()
        }
    }
}

async fn dispatch(resolver: &EarningsResolver, name: &str, arguments: &Value) -> Result<ToolOutput> {
    let tool = name.parse::<ToolName>()?;
    let args = ToolArguments::from_value(arguments)?;

    match tool {
        ToolName::CompanyRevenue => resolver
            .revenue(&args.company_symbol, args.fiscal_year, args.fiscal_quarter)
            .await
            .map(ToolOutput::Revenue),
        ToolName::CompanyFreeCashFlow => resolver
            .free_cash_flow(&args.company_symbol, args.fiscal_year, args.fiscal_quarter)
            .await
            .map(ToolOutput::FreeCashFlow),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::tests::{FakeProvider, msft_provider};
    use earnings_core::ErrorKind;
    use std::sync::Arc;

    fn resolver(provider: &Arc<FakeProvider>) -> EarningsResolver {
        EarningsResolver::new(provider.clone())
    }

    #[test]
    fn test_list_tools() {
        let tools = list_tools();
        let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["get_company_revenue", "get_company_free_cash_flow"]);

        let schema = &tools[0].input_schema;
        assert_eq!(schema["required"], json!(["company_symbol"]));
        assert_eq!(
            schema["properties"]["company_symbol"]["enum"],
            json!(["MSFT", "TSLA", "NVDA"])
        );
        assert_eq!(schema["properties"]["fiscal_quarter"]["default"], 4);

        let serialized = serde_json::to_value(&tools[1]).unwrap();
        assert_eq!(serialized["name"], "get_company_free_cash_flow");
    }

    #[test]
    fn test_argument_defaults_and_coercion() {
        let args = ToolArguments::from_value(&json!({"company_symbol": " nvda "})).unwrap();
        assert_eq!(
            args,
            ToolArguments {
                company_symbol: "NVDA".to_string(),
                fiscal_year: 2024,
                fiscal_quarter: 4,
            }
        );

        let args = ToolArguments::from_value(&json!({
            "company_symbol": "TSLA",
            "fiscal_year": 2023.0,
            "fiscal_quarter": null
        }))
        .unwrap();
        assert_eq!(args.fiscal_year, 2023);
        assert_eq!(args.fiscal_quarter, 4);
    }

    #[test]
    fn test_argument_errors() {
        let cases = [
            json!({}),
            json!({"company_symbol": 7}),
            json!({"company_symbol": "MSFT", "fiscal_quarter": 2.5}),
            json!({"company_symbol": "MSFT", "fiscal_year": "2024"}),
            json!(["MSFT"]),
        ];
        for case in cases {
            let err = ToolArguments::from_value(&case).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArguments, "{case}");
        }
    }

    #[tokio::test]
    async fn test_call_revenue() {
        let provider = Arc::new(msft_provider());
        let output = call_tool(
            &resolver(&provider),
            "get_company_revenue",
            &json!({"company_symbol": "msft", "fiscal_year": 2024, "fiscal_quarter": 4}),
        )
        .await;

        assert!(!output.is_error());
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["company"], "MSFT");
        assert_eq!(value["total_revenue_usd_millions"], 64727.0);
        assert_eq!(value["exact_match"], true);
        assert_eq!(value["fallback_warning"], Value::Null);
    }

    #[tokio::test]
    async fn test_call_free_cash_flow() {
        let provider = Arc::new(msft_provider());
        let output = call_tool(
            &resolver(&provider),
            "get_company_free_cash_flow",
            &json!({"company_symbol": "MSFT"}),
        )
        .await;

        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["free_cash_flow_usd_millions"], 23255.0);
        assert_eq!(
            value["calculation"],
            "Operating Cash Flow - Capital Expenditures"
        );
    }

    #[tokio::test]
    async fn test_call_invalid_quarter_is_envelope() {
        let provider = Arc::new(msft_provider());
        let output = call_tool(
            &resolver(&provider),
            "get_company_revenue",
            &json!({"company_symbol": "MSFT", "fiscal_quarter": 5}),
        )
        .await;

        assert!(output.is_error());
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["error_kind"], "InvalidQuarter");
        assert_eq!(value["valid_values"], json!(["1", "2", "3", "4"]));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_call_unknown_tool() {
        let provider = Arc::new(msft_provider());
        let output = call_tool(&resolver(&provider), "get_stock_price", &json!({})).await;

        let ToolOutput::Error(envelope) = output else {
            panic!("expected an error envelope");
        };
        assert_eq!(envelope.error_kind, ErrorKind::InvalidArguments);
        assert!(envelope.message.contains("get_stock_price"));
        assert_eq!(provider.calls(), 0);
    }
}
