//! ViaCEP postal-code lookup client
//!
//! `GET {base}/{cep}/json/`. Unknown codes come back as HTTP 200 with an
//! `erro` flag; syntactically rejected codes come back as HTTP 400.

use super::http::{json_body, send, trim_base};
use crate::address::ResolvedAddress;
use crate::error::ProviderError;
use crate::postal::PostalCode;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

const SERVICE: &str = "viacep";

/// Default public endpoint
pub const DEFAULT_BASE_URL: &str = "https://viacep.com.br/ws";

#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    erro: Option<serde_json::Value>,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
}

impl ViaCepResponse {
    /// `erro` has been seen both as a boolean and as the string "true"
    fn is_error(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(flag)) => flag.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    fn into_address(self, code: &PostalCode) -> Option<ResolvedAddress> {
        if self.is_error() {
            return None;
        }
        Some(ResolvedAddress::new(
            code.clone(),
            self.logradouro,
            self.bairro,
            self.localidade,
            self.uf,
        ))
    }
}

/// Client for the ViaCEP web service
#[derive(Clone)]
pub struct ViaCepClient {
    client: Client,
    base_url: String,
}

impl ViaCepClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
        }
    }

    /// Look up a postal code; `Ok(None)` when ViaCEP does not know it
    pub async fn lookup(
        &self,
        code: &PostalCode,
    ) -> Result<Option<ResolvedAddress>, ProviderError> {
        let url = format!("{}/{}/json/", self.base_url, code.as_str());
        debug!(%url, "Querying ViaCEP");

        let response = send(SERVICE, self.client.get(&url)).await?;
        if response.status() == StatusCode::BAD_REQUEST {
            return Ok(None);
        }
        let body: ViaCepResponse = json_body(SERVICE, response).await?;
        Ok(body.into_address(code))
    }
}
