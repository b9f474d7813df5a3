//! Location provider for a machine without positioning hardware
//!
//! The permission decision comes from configuration or a terminal prompt;
//! the fix comes from configured coordinates or an IP lookup.

use super::ip_api::IpLocator;
use super::nominatim::NominatimClient;
use super::terminal::LineInput;
use crate::abstractions::{LocationProvider, Permission};
use crate::config::PermissionPolicy;
use crate::error::ProviderError;
use crate::geo::Coordinate;
use async_trait::async_trait;
use std::io::Write;
use tracing::{debug, warn};

/// Where the device fix comes from
#[derive(Clone)]
pub enum FixSource {
    Fixed(Coordinate),
    Ip(IpLocator),
    Unavailable,
}

pub struct DeviceLocationProvider {
    policy: PermissionPolicy,
    source: FixSource,
    reverse: Option<NominatimClient>,
    input: LineInput,
}

impl DeviceLocationProvider {
    pub fn new(policy: PermissionPolicy, source: FixSource) -> Self {
        Self {
            policy,
            source,
            reverse: None,
            input: LineInput::stdin(),
        }
    }

    /// Read prompt answers from `input` instead of a private stdin reader
    pub fn with_input(mut self, input: LineInput) -> Self {
        self.input = input;
        self
    }

    /// Use Nominatim to label the fix
    pub fn with_reverse_geocoder(mut self, geocoder: NominatimClient) -> Self {
        self.reverse = Some(geocoder);
        self
    }
}

/// Interpret a prompt answer; anything but yes is a refusal
fn parse_answer(answer: &str) -> Permission {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "s" | "sim" => Permission::Granted,
        _ => Permission::Denied,
    }
}

async fn prompt_for_permission(input: &LineInput) -> Permission {
    let mut stderr = std::io::stderr();
    let _ = write!(stderr, "Allow access to your location? [y/N] ");
    let _ = stderr.flush();

    match input.next_line().await {
        Ok(Some(line)) => parse_answer(&line),
        Ok(None) => {
            debug!("No permission answer before end of input");
            Permission::Denied
        }
        Err(e) => {
            warn!(error = %e, "Could not read permission answer");
            Permission::Denied
        }
    }
}

#[async_trait]
impl LocationProvider for DeviceLocationProvider {
    async fn request_permission(&self) -> Permission {
        match self.policy {
            PermissionPolicy::Granted => Permission::Granted,
            PermissionPolicy::Denied => Permission::Denied,
            PermissionPolicy::Prompt => prompt_for_permission(&self.input).await,
        }
    }

    async fn current_coordinate(&self) -> Result<Coordinate, ProviderError> {
        match &self.source {
            FixSource::Fixed(coordinate) => {
                debug!(%coordinate, "Using configured device location");
                Ok(*coordinate)
            }
            FixSource::Ip(locator) => locator.locate().await,
            FixSource::Unavailable => Err(ProviderError::unavailable(
                "no location source configured",
            )),
        }
    }

    async fn reverse_geocode(
        &self,
        coordinate: &Coordinate,
    ) -> Result<Option<String>, ProviderError> {
        match &self.reverse {
            Some(geocoder) => geocoder.reverse(coordinate).await,
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("y\n"), Permission::Granted);
        assert_eq!(parse_answer(" YES "), Permission::Granted);
        assert_eq!(parse_answer("sim"), Permission::Granted);
        assert_eq!(parse_answer("n"), Permission::Denied);
        assert_eq!(parse_answer(""), Permission::Denied);
    }

    #[tokio::test]
    async fn test_policy_and_fixed_source() {
        let here = Coordinate::new(-23.5505, -46.6333).unwrap();
        let provider =
            DeviceLocationProvider::new(PermissionPolicy::Granted, FixSource::Fixed(here));
        assert_eq!(provider.request_permission().await, Permission::Granted);
        assert_eq!(provider.current_coordinate().await.unwrap(), here);
        assert_eq!(provider.reverse_geocode(&here).await.unwrap(), None);

        let denied = DeviceLocationProvider::new(PermissionPolicy::Denied, FixSource::Unavailable);
        assert_eq!(denied.request_permission().await, Permission::Denied);
        assert!(denied.current_coordinate().await.is_err());
    }

    #[tokio::test]
    async fn test_prompt_reads_from_shared_input() {
        let here = Coordinate::new(-23.5505, -46.6333).unwrap();
        let input = LineInput::from_reader(&b"y\n01310100\nno\n"[..]);
        let provider =
            DeviceLocationProvider::new(PermissionPolicy::Prompt, FixSource::Fixed(here))
                .with_input(input.clone());

        assert_eq!(provider.request_permission().await, Permission::Granted);
        assert_eq!(
            input.next_line().await.unwrap().as_deref(),
            Some("01310100")
        );
        assert_eq!(provider.request_permission().await, Permission::Denied);
        // End of input counts as a refusal
        assert_eq!(provider.request_permission().await, Permission::Denied);
    }
}
