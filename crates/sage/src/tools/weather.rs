use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{endpoint, parse_arguments, Tool};
use crate::errors::AgentResult;
use crate::models::tool::ToolDescriptor;

const FETCH_FAILED: &str = "Failed to fetch weather data";

/// Current conditions for a city, geocoded then looked up on open-meteo
pub struct WeatherTool {
    client: reqwest::Client,
    geocoding_host: String,
    weather_host: String,
    descriptor: ToolDescriptor,
}

#[derive(Deserialize)]
struct WeatherArgs {
    location: String,
}

#[derive(Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<Place>,
}

#[derive(Deserialize)]
struct Place {
    latitude: f64,
    longitude: f64,
    name: String,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Deserialize)]
struct ForecastResponse {
    current: Conditions,
}

#[derive(Deserialize)]
struct Conditions {
    temperature_2m: f64,
    wind_speed_10m: f64,
    relative_humidity_2m: f64,
}

enum Lookup {
    Found(Place, Conditions),
    UnknownLocation,
}

impl WeatherTool {
    pub fn new(client: reqwest::Client, geocoding_host: &str, weather_host: &str) -> Self {
        Self {
            client,
            geocoding_host: geocoding_host.to_string(),
            weather_host: weather_host.to_string(),
            descriptor: ToolDescriptor::new(
                "weather",
                "Get current weather for a location. Just provide city name.",
                json!({
                    "type": "object",
                    "properties": {
                        "location": {
                            "type": "string",
                            "description": "City name"
                        }
                    },
                    "required": ["location"]
                }),
            ),
        }
    }

    async fn lookup(&self, location: &str) -> reqwest::Result<Lookup> {
        let geocoding: GeocodingResponse = self
            .client
            .get(endpoint(&self.geocoding_host, "v1/search"))
            .query(&[
                ("name", location),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some(place) = geocoding.results.into_iter().next() else {
            return Ok(Lookup::UnknownLocation);
        };

        let forecast: ForecastResponse = self
            .client
            .get(endpoint(&self.weather_host, "v1/forecast"))
            .query(&[
                ("latitude", place.latitude.to_string()),
                ("longitude", place.longitude.to_string()),
                (
                    "current",
                    "temperature_2m,weather_code,wind_speed_10m,relative_humidity_2m".to_string(),
                ),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(Lookup::Found(place, forecast.current))
    }
}

fn format_conditions(place: &Place, conditions: &Conditions) -> String {
    let name = match &place.country {
        Some(country) => format!("{}, {}", place.name, country),
        None => place.name.clone(),
    };
    format!(
        "{}: {}°C, Wind: {} km/h, Humidity: {}%",
        name,
        conditions.temperature_2m,
        conditions.wind_speed_10m,
        conditions.relative_humidity_2m
    )
}

#[async_trait]
impl Tool for WeatherTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, arguments: Value) -> AgentResult<String> {
        let args: WeatherArgs = parse_arguments(arguments)?;
        Ok(match self.lookup(&args.location).await {
            Ok(Lookup::Found(place, conditions)) => format_conditions(&place, &conditions),
            Ok(Lookup::UnknownLocation) => format!("Location \"{}\" not found", args.location),
            Err(e) => {
                tracing::warn!(error = %e, "weather lookup failed");
                FETCH_FAILED.to_string()
            }
        })
    }
}
