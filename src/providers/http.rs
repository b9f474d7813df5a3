//! Shared HTTP plumbing for the lookup services

use crate::config::HttpSettings;
use crate::error::{CepDistError, ErrorCode, ProviderError, Result};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Build the HTTP client shared by every adapter
pub fn build_client(settings: &HttpSettings) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .user_agent(settings.user_agent.clone())
        .build()
        .map_err(|e| {
            CepDistError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                format!("Failed to create HTTP client: {e}"),
            )
        })
}

/// Strip trailing slashes so paths can be appended with `/`
pub(crate) fn trim_base(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Send a prepared request and map transport errors
pub(crate) async fn send(
    service: &'static str,
    request: reqwest::RequestBuilder,
) -> std::result::Result<Response, ProviderError> {
    request
        .send()
        .await
        .map_err(|source| ProviderError::Transport { service, source })
}

/// Decode a successful JSON body, mapping any other status to an error
pub(crate) async fn json_body<T: DeserializeOwned>(
    service: &'static str,
    response: Response,
) -> std::result::Result<T, ProviderError> {
    let status = response.status();
    if status != StatusCode::OK {
        return Err(ProviderError::Status {
            service,
            status: status.as_u16(),
        });
    }
    response.json::<T>().await.map_err(|e| ProviderError::Decode {
        service,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_base() {
        assert_eq!(trim_base("https://viacep.com.br/ws/"), "https://viacep.com.br/ws");
        assert_eq!(trim_base("http://127.0.0.1:8080"), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_build_client_from_defaults() {
        assert!(build_client(&HttpSettings::default()).is_ok());
    }
}
