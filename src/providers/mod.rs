//! Network-backed collaborator implementations
//!
//! - `viacep` - postal-code lookup
//! - `nominatim` - forward and reverse geocoding
//! - `ip_api` - IP-derived device position
//! - `device` - [`LocationProvider`](crate::abstractions::LocationProvider) for a desktop machine
//! - `terminal` - stdin lines shared by the prompt and the interactive loop
//!
//! [`CompositeResolver`] pairs ViaCEP with Nominatim into one
//! [`AddressResolver`].

pub mod device;
pub mod http;
pub mod ip_api;
pub mod nominatim;
pub mod terminal;
pub mod viacep;

pub use device::{DeviceLocationProvider, FixSource};
pub use http::build_client;
pub use ip_api::IpLocator;
pub use nominatim::NominatimClient;
pub use terminal::LineInput;
pub use viacep::ViaCepClient;

use crate::abstractions::AddressResolver;
use crate::address::ResolvedAddress;
use crate::error::ProviderError;
use crate::geo::Coordinate;
use crate::postal::PostalCode;
use async_trait::async_trait;

/// Postal lookup through ViaCEP, geocoding through Nominatim
#[derive(Clone)]
pub struct CompositeResolver {
    postal: ViaCepClient,
    geocoder: NominatimClient,
}

impl CompositeResolver {
    pub fn new(postal: ViaCepClient, geocoder: NominatimClient) -> Self {
        Self { postal, geocoder }
    }
}

#[async_trait]
impl AddressResolver for CompositeResolver {
    async fn lookup_postal_code(
        &self,
        code: &PostalCode,
    ) -> Result<Option<ResolvedAddress>, ProviderError> {
        self.postal.lookup(code).await
    }

    async fn forward_geocode(
        &self,
        address_text: &str,
    ) -> Result<Option<Coordinate>, ProviderError> {
        self.geocoder.search(address_text).await
    }
}
