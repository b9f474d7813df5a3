//! Device location abstraction layer
//!
//! Provides trait-based abstraction for permission prompts, device fixes and
//! reverse geocoding so the workflow can run without real hardware.

use super::{Gates, MockOutcome};
use crate::error::ProviderError;
use crate::geo::Coordinate;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Outcome of a permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Granted,
    Denied,
}

/// Trait for device location operations
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Ask for access to the device location; may wait on the user
    async fn request_permission(&self) -> Permission;

    /// Get the current device fix; may wait on hardware
    async fn current_coordinate(&self) -> Result<Coordinate, ProviderError>;

    /// Best-effort human-readable label for a coordinate
    async fn reverse_geocode(
        &self,
        coordinate: &Coordinate,
    ) -> Result<Option<String>, ProviderError>;
}

/// Calls recorded by [`MockLocationProvider`]
#[derive(Debug, Clone, PartialEq)]
pub enum LocationCall {
    RequestPermission,
    CurrentCoordinate,
    ReverseGeocode(Coordinate),
}

/// Mock implementation of LocationProvider for testing
pub struct MockLocationProvider {
    permission: Mutex<Permission>,
    fix: Mutex<MockOutcome<Coordinate>>,
    reverse: Mutex<MockOutcome<String>>,
    gates: Gates,
    /// Track calls for verification
    pub calls: Arc<Mutex<Vec<LocationCall>>>,
}

/// Gate key that holds `current_coordinate` open
pub const FIX_GATE: &str = "fix";

impl MockLocationProvider {
    /// Permission granted, fix at `coordinate`, no reverse-geocoding result
    pub fn granted_at(coordinate: Coordinate) -> Self {
        Self {
            permission: Mutex::new(Permission::Granted),
            fix: Mutex::new(MockOutcome::Found(coordinate)),
            reverse: Mutex::new(MockOutcome::NotFound),
            gates: Gates::default(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Permission denied
    pub fn denied() -> Self {
        Self {
            permission: Mutex::new(Permission::Denied),
            fix: Mutex::new(MockOutcome::Fail("no permission".to_string())),
            reverse: Mutex::new(MockOutcome::NotFound),
            gates: Gates::default(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Permission granted but no fix can be obtained
    pub fn unavailable(reason: &str) -> Self {
        let provider = Self::denied();
        provider.set_permission(Permission::Granted);
        provider.set_fix(MockOutcome::Fail(reason.to_string()));
        provider
    }

    /// Set the reverse-geocoding result
    pub fn with_reverse(self, outcome: MockOutcome<String>) -> Self {
        *self.reverse.lock().unwrap() = outcome;
        self
    }

    pub fn set_permission(&self, permission: Permission) {
        *self.permission.lock().unwrap() = permission;
    }

    pub fn set_fix(&self, outcome: MockOutcome<Coordinate>) {
        *self.fix.lock().unwrap() = outcome;
    }

    /// Hold `current_coordinate` open until [`Self::release_fix`]
    pub fn hold_fix(&self) {
        self.gates.hold(FIX_GATE);
    }

    pub fn release_fix(&self) {
        self.gates.release(FIX_GATE);
    }

    /// Get the list of recorded calls
    pub fn get_calls(&self) -> Vec<LocationCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Wait until `current_coordinate` has been entered `count` times
    pub async fn wait_for_fix_requests(&self, count: usize) {
        loop {
            let seen = self
                .get_calls()
                .iter()
                .filter(|c| matches!(c, LocationCall::CurrentCoordinate))
                .count();
            if seen >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
    }

    fn record(&self, call: LocationCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl LocationProvider for MockLocationProvider {
    async fn request_permission(&self) -> Permission {
        self.record(LocationCall::RequestPermission);
        *self.permission.lock().unwrap()
    }

    async fn current_coordinate(&self) -> Result<Coordinate, ProviderError> {
        self.record(LocationCall::CurrentCoordinate);
        // Snapshot before waiting so a later set_fix applies to the next call
        let outcome = self.fix.lock().unwrap().clone();
        self.gates.wait(FIX_GATE).await;
        match outcome.into_result()? {
            Some(coordinate) => Ok(coordinate),
            None => Err(ProviderError::unavailable("no location fix")),
        }
    }

    async fn reverse_geocode(
        &self,
        coordinate: &Coordinate,
    ) -> Result<Option<String>, ProviderError> {
        self.record(LocationCall::ReverseGeocode(*coordinate));
        let outcome = self.reverse.lock().unwrap().clone();
        outcome.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_granted_mock_returns_fix_and_records_calls() {
        let here = Coordinate::new(-23.5505, -46.6333).unwrap();
        let provider = MockLocationProvider::granted_at(here)
            .with_reverse(MockOutcome::Found("Praça da Sé, São Paulo".to_string()));

        assert_eq!(provider.request_permission().await, Permission::Granted);
        assert_eq!(provider.current_coordinate().await.unwrap(), here);
        assert_eq!(
            provider.reverse_geocode(&here).await.unwrap().as_deref(),
            Some("Praça da Sé, São Paulo")
        );
        assert_eq!(
            provider.get_calls(),
            vec![
                LocationCall::RequestPermission,
                LocationCall::CurrentCoordinate,
                LocationCall::ReverseGeocode(here),
            ]
        );
    }

    #[tokio::test]
    async fn test_unavailable_mock_fails_fix() {
        let provider = MockLocationProvider::unavailable("gps off");
        assert_eq!(provider.request_permission().await, Permission::Granted);
        let err = provider.current_coordinate().await.unwrap_err();
        assert_eq!(err.to_string(), "gps off");
    }
}
