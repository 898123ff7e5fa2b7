use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::weather::Location;

const GEOCODE_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const RESULT_COUNT: &str = "8";

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("geocoding request returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("failed to parse geocoding payload: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("no place found for \"{0}\"")]
    NotFound(String),
}

#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: Client,
    base_url: String,
}

impl GeocodeClient {
    pub fn new() -> Result<Self, GeocodeError> {
        Self::with_base_url(GEOCODE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(8))
            .build()
            .map_err(GeocodeError::Request)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Candidate places for `city`, best match first.
    pub async fn search(&self, city: &str) -> Result<Vec<Location>, GeocodeError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("name", city),
                ("count", RESULT_COUNT),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(GeocodeError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status));
        }

        let payload: GeocodeResponse = response.json().await.map_err(GeocodeError::Decode)?;
        Ok(rank(payload.results.unwrap_or_default(), city))
    }

    /// The best match for `city`.
    pub async fn resolve(&self, city: &str) -> Result<Location, GeocodeError> {
        self.search(city)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NotFound(city.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    results: Option<Vec<GeocodeResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    name: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    country: Option<String>,
    population: Option<u64>,
}

impl GeocodeResult {
    fn into_location(self) -> Option<Location> {
        let (latitude, longitude) = (self.latitude?, self.longitude?);
        let name = match self.country.as_deref().filter(|c| !c.is_empty()) {
            Some(country) => format!("{}, {country}", self.name),
            None => self.name,
        };
        Some(Location {
            name,
            latitude,
            longitude,
        })
    }
}

/// Exact name matches first, then larger places; ties keep provider order.
/// Entries without coordinates are dropped.
fn rank(results: Vec<GeocodeResult>, city: &str) -> Vec<Location> {
    let wanted = normalize(city);
    let mut scored: Vec<(bool, u64, Location)> = results
        .into_iter()
        .filter_map(|entry| {
            let exact = normalize(&entry.name) == wanted;
            let population = entry.population.unwrap_or_default();
            entry
                .into_location()
                .map(|location| (exact, population, location))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
    scored.into_iter().map(|(_, _, location)| location).collect()
}

fn normalize(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, population: Option<u64>) -> GeocodeResult {
        GeocodeResult {
            name: name.to_string(),
            latitude: Some(50.0),
            longitude: Some(19.0),
            country: Some("Poland".to_string()),
            population,
        }
    }

    #[test]
    fn exact_match_beats_population() {
        let ranked = rank(
            vec![result("Krakowiany", Some(900_000)), result("Kraków", Some(780_000))],
            "kraków",
        );
        assert_eq!(ranked[0].name, "Kraków, Poland");
        assert_eq!(ranked[1].name, "Krakowiany, Poland");
    }

    #[test]
    fn ties_keep_provider_order() {
        let ranked = rank(
            vec![result("Nowa Wieś", None), result("Nowa-Wieś", None)],
            "nowa wieś",
        );
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].name, "Nowa Wieś, Poland");
    }

    #[test]
    fn entries_without_coordinates_are_dropped() {
        let mut missing = result("Gdańsk", Some(470_000));
        missing.longitude = None;
        let ranked = rank(vec![missing, result("Gdańsk", None)], "Gdańsk");
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn blank_country_keeps_bare_name() {
        let mut entry = result("Hel", None);
        entry.country = Some(String::new());
        assert_eq!(entry.into_location().map(|l| l.name), Some("Hel".to_string()));
    }
}
