use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::weather::{
    ConditionsSnapshot, CurrentConditions, Location, numeric_metric, weather_code_from_json,
};

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const CURRENT_FIELDS: &str = "weather_code,cloud_cover,temperature_2m";

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("forecast request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("forecast request returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("failed to parse forecast payload: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Client,
    base_url: String,
}

impl ForecastClient {
    pub fn new() -> Result<Self, ForecastError> {
        Self::with_base_url(FORECAST_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ForecastError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(ForecastError::Request)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub async fn fetch(&self, location: Location) -> Result<ConditionsSnapshot, ForecastError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .map_err(ForecastError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForecastError::Status(status));
        }

        let payload: ForecastResponse = response.json().await.map_err(ForecastError::Decode)?;

        Ok(ConditionsSnapshot {
            location,
            current: payload.current.map(CurrentBlock::normalize).unwrap_or_default(),
            fetched_at: Utc::now(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current: Option<CurrentBlock>,
}

/// Fields are kept as raw JSON so an odd value degrades to "absent" instead
/// of failing the whole payload. Numeric strings still count as a code.
#[derive(Debug, Default, Deserialize)]
struct CurrentBlock {
    #[serde(default)]
    weather_code: Value,
    #[serde(default)]
    cloud_cover: Value,
    #[serde(default)]
    temperature_2m: Value,
}

impl CurrentBlock {
    fn normalize(self) -> CurrentConditions {
        CurrentConditions {
            weather_code: weather_code_from_json(&self.weather_code),
            cloud_cover: numeric_metric(self.cloud_cover.as_f64()),
            temperature_2m_c: numeric_metric(self.temperature_2m.as_f64()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn block(value: serde_json::Value) -> CurrentConditions {
        serde_json::from_value::<CurrentBlock>(value)
            .expect("block")
            .normalize()
    }

    #[test]
    fn numeric_fields_pass_through() {
        let current = block(json!({
            "weather_code": 61,
            "cloud_cover": 87,
            "temperature_2m": -1.5,
        }));
        assert_eq!(current, CurrentConditions::new(Some(61.0), Some(87.0), Some(-1.5)));
    }

    #[test]
    fn non_numeric_fields_become_absent() {
        let current = block(json!({
            "weather_code": "storm",
            "cloud_cover": null,
            "temperature_2m": "-4",
        }));
        assert_eq!(current, CurrentConditions::default());
    }

    #[test]
    fn numeric_string_code_is_read_as_a_number() {
        let current = block(json!({ "weather_code": "61" }));
        assert_eq!(current.weather_code, Some(61.0));
    }

    #[test]
    fn codes_outside_the_table_are_kept() {
        for raw in [json!(300), json!(2.5), json!(-1)] {
            let current = block(json!({ "weather_code": raw }));
            assert_eq!(current.weather_code, raw.as_f64());
        }
    }

    #[test]
    fn missing_current_block_is_all_absent() {
        let payload: ForecastResponse = serde_json::from_value(json!({})).expect("payload");
        assert!(payload.current.is_none());
    }
}
