use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use url::Url;

use super::{endpoint, parse_arguments, Tool};
use crate::errors::AgentResult;
use crate::models::tool::ToolDescriptor;

const FETCH_FAILED: &str = "Failed to fetch country information";
const MISSING: &str = "N/A";

/// Capital, population, region and languages of a country from REST Countries
pub struct CountryInfoTool {
    client: reqwest::Client,
    host: String,
    descriptor: ToolDescriptor,
}

#[derive(Deserialize)]
struct CountryArgs {
    country: String,
}

#[derive(Deserialize)]
struct Country {
    name: CountryName,
    #[serde(default)]
    capital: Vec<String>,
    #[serde(default)]
    population: Option<u64>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    languages: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct CountryName {
    common: String,
}

impl CountryInfoTool {
    pub fn new(client: reqwest::Client, host: &str) -> Self {
        Self {
            client,
            host: host.to_string(),
            descriptor: ToolDescriptor::new(
                "country_info",
                "Get information about a country (capital, population, languages, etc.)",
                json!({
                    "type": "object",
                    "properties": {
                        "country": {
                            "type": "string",
                            "description": "Country name"
                        }
                    },
                    "required": ["country"]
                }),
            ),
        }
    }

    async fn lookup(&self, country: &str) -> anyhow::Result<Option<Country>> {
        let mut url = Url::parse(&endpoint(&self.host, "v3.1/name"))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("countries host cannot be a base URL"))?
            .push(country);

        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let matches: Vec<Country> = response.error_for_status()?.json().await?;
        Ok(matches.into_iter().next())
    }
}

/// Group digits in thousands, as in `1,234,567`
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn format_country(country: &Country) -> String {
    let capital = country
        .capital
        .first()
        .map(String::as_str)
        .unwrap_or(MISSING);
    let population = country
        .population
        .map(group_thousands)
        .unwrap_or_else(|| MISSING.to_string());
    let region = country
        .region
        .as_deref()
        .filter(|r| !r.is_empty())
        .unwrap_or(MISSING);
    let languages = country
        .languages
        .as_ref()
        .map(|langs| {
            langs
                .values()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| MISSING.to_string());

    format!(
        "{}: Capital: {}, Population: {}, Region: {}, Languages: {}",
        country.name.common, capital, population, region, languages
    )
}

#[async_trait]
impl Tool for CountryInfoTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, arguments: Value) -> AgentResult<String> {
        let args: CountryArgs = parse_arguments(arguments)?;
        Ok(match self.lookup(&args.country).await {
            Ok(Some(country)) => format_country(&country),
            Ok(None) => format!("Country \"{}\" not found", args.country),
            Err(e) => {
                tracing::warn!(error = %e, "country lookup failed");
                FETCH_FAILED.to_string()
            }
        })
    }
}
