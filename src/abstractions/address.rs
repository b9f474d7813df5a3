//! Address lookup abstraction layer
//!
//! Provides trait-based abstraction for postal-code lookups and forward
//! geocoding to enable testing without network access.

use super::{Gates, MockOutcome};
use crate::address::ResolvedAddress;
use crate::error::ProviderError;
use crate::geo::Coordinate;
use crate::postal::PostalCode;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Trait for address resolution operations
///
/// `Ok(None)` means the request was valid but matched nothing; `Err` means
/// the request could not be completed.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Resolve a postal code to a structured address (without coordinate)
    async fn lookup_postal_code(
        &self,
        code: &PostalCode,
    ) -> Result<Option<ResolvedAddress>, ProviderError>;

    /// Resolve free-form address text to a coordinate
    async fn forward_geocode(&self, address_text: &str)
        -> Result<Option<Coordinate>, ProviderError>;
}

/// Calls recorded by [`MockAddressResolver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverCall {
    Lookup(String),
    Geocode(String),
}

/// Mock implementation of AddressResolver for testing
///
/// Unscripted postal codes and address texts resolve to "not found".
#[derive(Default)]
pub struct MockAddressResolver {
    lookups: Mutex<HashMap<String, MockOutcome<ResolvedAddress>>>,
    geocodes: Mutex<HashMap<String, MockOutcome<Coordinate>>>,
    gates: Gates,
    /// Track calls for verification
    pub calls: Arc<Mutex<Vec<ResolverCall>>>,
}

impl MockAddressResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the lookup result for a postal code
    pub fn with_lookup(self, code: &str, outcome: MockOutcome<ResolvedAddress>) -> Self {
        self.lookups
            .lock()
            .unwrap()
            .insert(code.to_string(), outcome);
        self
    }

    /// Script the geocoding result for an address text
    pub fn with_geocode(self, address_text: &str, outcome: MockOutcome<Coordinate>) -> Self {
        self.geocodes
            .lock()
            .unwrap()
            .insert(address_text.to_string(), outcome);
        self
    }

    /// Script a full successful resolution: the lookup of `address`'s postal
    /// code returns it and its geocoding query returns `coordinate`
    pub fn with_resolution(self, address: ResolvedAddress, coordinate: Coordinate) -> Self {
        let code = address.postal_code.as_str().to_string();
        let query = address.geocoding_query();
        self.with_lookup(&code, MockOutcome::Found(address))
            .with_geocode(&query, MockOutcome::Found(coordinate))
    }

    /// Hold calls keyed by `key` (postal code or address text) open
    pub fn hold(&self, key: &str) {
        self.gates.hold(key);
    }

    pub fn release(&self, key: &str) {
        self.gates.release(key);
    }

    /// Get the list of recorded calls
    pub fn get_calls(&self) -> Vec<ResolverCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Whether the resolver has been contacted at all
    pub fn was_called(&self) -> bool {
        !self.calls.lock().unwrap().is_empty()
    }

    /// Wait until a lookup for `code` has been entered
    pub async fn wait_for_lookup(&self, code: &str) {
        let expected = ResolverCall::Lookup(code.to_string());
        while !self.get_calls().contains(&expected) {
            tokio::task::yield_now().await;
        }
    }

    fn record(&self, call: ResolverCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AddressResolver for MockAddressResolver {
    async fn lookup_postal_code(
        &self,
        code: &PostalCode,
    ) -> Result<Option<ResolvedAddress>, ProviderError> {
        self.record(ResolverCall::Lookup(code.as_str().to_string()));
        let outcome = self
            .lookups
            .lock()
            .unwrap()
            .get(code.as_str())
            .cloned()
            .unwrap_or(MockOutcome::NotFound);
        self.gates.wait(code.as_str()).await;
        outcome.into_result()
    }

    async fn forward_geocode(
        &self,
        address_text: &str,
    ) -> Result<Option<Coordinate>, ProviderError> {
        self.record(ResolverCall::Geocode(address_text.to_string()));
        let outcome = self
            .geocodes
            .lock()
            .unwrap()
            .get(address_text)
            .cloned()
            .unwrap_or(MockOutcome::NotFound);
        self.gates.wait(address_text).await;
        outcome.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paulista() -> ResolvedAddress {
        ResolvedAddress::new(
            PostalCode::parse("01310100").unwrap(),
            "Avenida Paulista",
            "Bela Vista",
            "São Paulo",
            "SP",
        )
    }

    #[tokio::test]
    async fn test_scripted_resolution() {
        let target = Coordinate::new(-23.5613, -46.6565).unwrap();
        let resolver = MockAddressResolver::new().with_resolution(paulista(), target);
        let code = PostalCode::parse("01310100").unwrap();

        let address = resolver.lookup_postal_code(&code).await.unwrap().unwrap();
        assert_eq!(address.city, "São Paulo");
        let coordinate = resolver
            .forward_geocode(&address.geocoding_query())
            .await
            .unwrap();
        assert_eq!(coordinate, Some(target));
        assert_eq!(
            resolver.get_calls(),
            vec![
                ResolverCall::Lookup("01310100".to_string()),
                ResolverCall::Geocode("Avenida Paulista, Bela Vista, São Paulo - SP".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_unscripted_is_not_found_and_failures_are_errors() {
        let resolver = MockAddressResolver::new()
            .with_lookup("99999999", MockOutcome::Fail("viacep down".to_string()));

        let unknown = PostalCode::parse("00000000").unwrap();
        assert_eq!(resolver.lookup_postal_code(&unknown).await.unwrap(), None);

        let failing = PostalCode::parse("99999999").unwrap();
        assert!(resolver.lookup_postal_code(&failing).await.is_err());
    }
}
