//! Nominatim (OpenStreetMap) geocoding client

use super::http::{json_body, send, trim_base};
use crate::error::ProviderError;
use crate::geo::Coordinate;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const SERVICE: &str = "nominatim";

/// Default public endpoint
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

#[derive(Debug, Default, Deserialize)]
struct ReverseAddress {
    #[serde(default)]
    road: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    village: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    address: Option<ReverseAddress>,
    #[serde(default)]
    display_name: Option<String>,
}

impl ReverseResponse {
    /// `"{street}, {city}, {region}, {country}"`, skipping missing parts
    fn label(self) -> Option<String> {
        if self.error.is_some() {
            return None;
        }
        let address = self.address.unwrap_or_default();
        let city = address.city.or(address.town).or(address.village);
        let parts: Vec<String> = [address.road, city, address.state, address.country]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect();
        if parts.is_empty() {
            self.display_name.filter(|name| !name.trim().is_empty())
        } else {
            Some(parts.join(", "))
        }
    }
}

fn parse_hit(hit: &SearchHit) -> Result<Coordinate, ProviderError> {
    let decode = |value: &str| {
        value.trim().parse::<f64>().map_err(|e| ProviderError::Decode {
            service: SERVICE,
            message: format!("invalid coordinate '{value}': {e}"),
        })
    };
    let lat = decode(&hit.lat)?;
    let lon = decode(&hit.lon)?;
    Coordinate::new(lat, lon).map_err(|_| ProviderError::OutOfRange {
        service: SERVICE,
        lat,
        lon,
    })
}

/// Client for the Nominatim search and reverse endpoints
#[derive(Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
    country_codes: Option<String>,
}

impl NominatimClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            country_codes: None,
        }
    }

    /// Restrict forward searches to a comma-separated list of ISO country codes
    pub fn with_country_codes(mut self, codes: Option<String>) -> Self {
        self.country_codes = codes.filter(|c| !c.trim().is_empty());
        self
    }

    /// Address text to coordinate; `Ok(None)` when nothing matches
    pub async fn search(&self, query: &str) -> Result<Option<Coordinate>, ProviderError> {
        let url = format!("{}/search", self.base_url);
        debug!(%url, %query, "Forward geocoding");

        let mut params = vec![
            ("q", query.to_string()),
            ("format", "jsonv2".to_string()),
            ("limit", "1".to_string()),
        ];
        if let Some(codes) = &self.country_codes {
            params.push(("countrycodes", codes.clone()));
        }

        let response = send(SERVICE, self.client.get(&url).query(&params)).await?;
        let hits: Vec<SearchHit> = json_body(SERVICE, response).await?;
        hits.first().map(parse_hit).transpose()
    }

    /// Coordinate to a human-readable label; `Ok(None)` when nothing is known
    pub async fn reverse(&self, coordinate: &Coordinate) -> Result<Option<String>, ProviderError> {
        let url = format!("{}/reverse", self.base_url);
        debug!(%url, %coordinate, "Reverse geocoding");

        let params = [
            ("lat", coordinate.lat().to_string()),
            ("lon", coordinate.lon().to_string()),
            ("format", "jsonv2".to_string()),
        ];
        let response = send(SERVICE, self.client.get(&url).query(&params)).await?;
        let body: ReverseResponse = json_body(SERVICE, response).await?;
        Ok(body.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hit() {
        let hit = SearchHit {
            lat: "-23.5613".to_string(),
            lon: "-46.6565".to_string(),
        };
        let coordinate = parse_hit(&hit).unwrap();
        assert_eq!(coordinate.lat(), -23.5613);
        assert_eq!(coordinate.lon(), -46.6565);
    }

    #[test]
    fn test_parse_hit_rejects_garbage_and_range() {
        let garbage = SearchHit {
            lat: "north".to_string(),
            lon: "0".to_string(),
        };
        assert!(matches!(
            parse_hit(&garbage),
            Err(ProviderError::Decode { .. })
        ));

        let out_of_range = SearchHit {
            lat: "123.0".to_string(),
            lon: "0".to_string(),
        };
        assert!(matches!(
            parse_hit(&out_of_range),
            Err(ProviderError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_reverse_label_composition() {
        let body: ReverseResponse = serde_json::from_str(
            r#"{
                "display_name": "Praça da Sé, Sé, São Paulo, Brasil",
                "address": {
                    "road": "Praça da Sé",
                    "suburb": "Sé",
                    "city": "São Paulo",
                    "state": "São Paulo",
                    "country": "Brasil"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(
            body.label().as_deref(),
            Some("Praça da Sé, São Paulo, São Paulo, Brasil")
        );
    }

    #[test]
    fn test_reverse_label_falls_back_to_town_and_display_name() {
        let town: ReverseResponse = serde_json::from_str(
            r#"{"address": {"town": "Poconé", "state": "Mato Grosso", "country": "Brasil"}}"#,
        )
        .unwrap();
        assert_eq!(town.label().as_deref(), Some("Poconé, Mato Grosso, Brasil"));

        let bare: ReverseResponse =
            serde_json::from_str(r#"{"display_name": "Oceano Atlântico", "address": {}}"#)
                .unwrap();
        assert_eq!(bare.label().as_deref(), Some("Oceano Atlântico"));
    }

    #[test]
    fn test_reverse_error_means_no_label() {
        let body: ReverseResponse =
            serde_json::from_str(r#"{"error": "Unable to geocode"}"#).unwrap();
        assert_eq!(body.label(), None);
    }
}
