//! Approximate device position from the public IP address (ip-api.com)

use super::http::{json_body, send};
use crate::error::ProviderError;
use crate::geo::Coordinate;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const SERVICE: &str = "ip-api";

/// Default public endpoint (the free tier is HTTP only)
pub const DEFAULT_URL: &str = "http://ip-api.com/json";

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl IpApiResponse {
    fn into_coordinate(self) -> Result<Coordinate, ProviderError> {
        if self.status != "success" {
            return Err(ProviderError::unavailable(format!(
                "{SERVICE} could not locate this address: {}",
                self.message.unwrap_or_else(|| self.status.clone())
            )));
        }
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => {
                Coordinate::new(lat, lon).map_err(|_| ProviderError::OutOfRange {
                    service: SERVICE,
                    lat,
                    lon,
                })
            }
            _ => Err(ProviderError::Decode {
                service: SERVICE,
                message: "response has no coordinates".to_string(),
            }),
        }
    }
}

/// Locates the machine by its public IP address
#[derive(Clone)]
pub struct IpLocator {
    client: Client,
    url: String,
}

impl IpLocator {
    pub fn new(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }

    pub async fn locate(&self) -> Result<Coordinate, ProviderError> {
        debug!(url = %self.url, "Locating by IP address");
        let response = send(SERVICE, self.client.get(&self.url)).await?;
        let body: IpApiResponse = json_body(SERVICE, response).await?;
        body.into_coordinate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let body: IpApiResponse = serde_json::from_str(
            r#"{"status": "success", "country": "Brazil", "lat": -23.5475, "lon": -46.6361}"#,
        )
        .unwrap();
        let coordinate = body.into_coordinate().unwrap();
        assert_eq!(coordinate.lat(), -23.5475);
    }

    #[test]
    fn test_fail_response() {
        let body: IpApiResponse =
            serde_json::from_str(r#"{"status": "fail", "message": "private range"}"#).unwrap();
        let err = body.into_coordinate().unwrap_err();
        assert!(err.to_string().contains("private range"));
    }
}
