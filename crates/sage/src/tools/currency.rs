use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{endpoint, parse_arguments, Tool};
use crate::errors::AgentResult;
use crate::models::tool::ToolDescriptor;

const FETCH_FAILED: &str = "Failed to fetch exchange rates";

/// Converts an amount between currencies using the latest published rate table
pub struct CurrencyConversionTool {
    client: reqwest::Client,
    host: String,
    descriptor: ToolDescriptor,
}

#[derive(Deserialize)]
struct ConversionArgs {
    amount: f64,
    from_currency: String,
    to_currency: String,
}

#[derive(Deserialize)]
struct RateTable {
    #[serde(default)]
    result: Option<String>,
    rates: Option<HashMap<String, f64>>,
}

enum Rates {
    Table(HashMap<String, f64>),
    UnknownBase,
}

impl CurrencyConversionTool {
    pub fn new(client: reqwest::Client, host: &str) -> Self {
        Self {
            client,
            host: host.to_string(),
            descriptor: ToolDescriptor::new(
                "currency_conversion",
                "Convert currency between different currencies",
                json!({
                    "type": "object",
                    "properties": {
                        "amount": {
                            "type": "number",
                            "description": "Amount to convert"
                        },
                        "from_currency": {
                            "type": "string",
                            "description": "Source currency code (e.g., USD, EUR)"
                        },
                        "to_currency": {
                            "type": "string",
                            "description": "Target currency code (e.g., EUR, GBP)"
                        }
                    },
                    "required": ["amount", "from_currency", "to_currency"]
                }),
            ),
        }
    }

    async fn rates(&self, base: &str) -> anyhow::Result<Rates> {
        let response = self
            .client
            .get(endpoint(&self.host, &format!("v4/latest/{}", base)))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Rates::UnknownBase);
        }
        let table: RateTable = response.error_for_status()?.json().await?;
        if table.result.as_deref() == Some("error") {
            return Ok(Rates::UnknownBase);
        }
        table
            .rates
            .map(Rates::Table)
            .ok_or_else(|| anyhow::anyhow!("rate table has no rates"))
    }
}

fn convert(args: &ConversionArgs, rates: &HashMap<String, f64>) -> String {
    let from = args.from_currency.to_uppercase();
    let to = args.to_currency.to_uppercase();
    match rates.get(&to) {
        Some(rate) if *rate > 0.0 => format!(
            "{} {} = {:.2} {}",
            args.amount,
            from,
            args.amount * rate,
            to
        ),
        _ => format!("Currency {} not found", args.to_currency),
    }
}

#[async_trait]
impl Tool for CurrencyConversionTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, arguments: Value) -> AgentResult<String> {
        let args: ConversionArgs = parse_arguments(arguments)?;
        let base = args.from_currency.to_uppercase();
        if base.is_empty() || !base.chars().all(|c| c.is_ascii_alphabetic()) {
            return Ok(format!("Currency {} not found", args.from_currency));
        }

        Ok(match self.rates(&base).await {
            Ok(Rates::Table(rates)) => convert(&args, &rates),
            Ok(Rates::UnknownBase) => format!("Currency {} not found", args.from_currency),
            Err(e) => {
                tracing::warn!(error = %e, "exchange rate lookup failed");
                FETCH_FAILED.to_string()
            }
        })
    }
}
