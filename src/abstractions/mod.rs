//! Abstraction layers for external collaborators
//!
//! This module provides trait-based abstractions for the device location
//! service and the address lookup/geocoding services, with mock
//! implementations for testing and dependency injection.

pub mod address;
pub mod location;

pub use address::{AddressResolver, MockAddressResolver, ResolverCall};
pub use location::{LocationCall, LocationProvider, MockLocationProvider, Permission};

use crate::error::ProviderError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Scripted result for a mock collaborator call
#[derive(Debug, Clone, PartialEq)]
pub enum MockOutcome<T> {
    Found(T),
    NotFound,
    Fail(String),
}

impl<T> MockOutcome<T> {
    /// Convert into the collaborator result shape
    pub fn into_result(self) -> Result<Option<T>, ProviderError> {
        match self {
            MockOutcome::Found(value) => Ok(Some(value)),
            MockOutcome::NotFound => Ok(None),
            MockOutcome::Fail(reason) => Err(ProviderError::unavailable(reason)),
        }
    }
}

/// Named gates that hold mock calls open until released
///
/// A held gate is a closed-on-release semaphore with no permits, so every
/// call waiting on it resumes once it is released, including calls that
/// arrive afterwards.
#[derive(Default)]
pub(crate) struct Gates {
    held: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl Gates {
    pub(crate) fn hold(&self, key: &str) {
        self.held
            .lock()
            .unwrap()
            .insert(key.to_string(), Arc::new(Semaphore::new(0)));
    }

    pub(crate) fn release(&self, key: &str) {
        if let Some(gate) = self.held.lock().unwrap().remove(key) {
            gate.close();
        }
    }

    pub(crate) async fn wait(&self, key: &str) {
        let gate = self.held.lock().unwrap().get(key).cloned();
        if let Some(gate) = gate {
            // Err means the gate was closed, which is the release signal
            let _ = gate.acquire().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_mock_outcome_shapes() {
        assert_eq!(MockOutcome::Found(1).into_result().unwrap(), Some(1));
        assert_eq!(MockOutcome::<i32>::NotFound.into_result().unwrap(), None);
        assert!(MockOutcome::<i32>::Fail("down".into()).into_result().is_err());
    }

    #[tokio::test]
    async fn test_gate_holds_until_released() {
        let gates = Arc::new(Gates::default());
        gates.hold("x");

        let waiter = {
            let gates = gates.clone();
            tokio::spawn(async move { gates.wait("x").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        gates.release("x");
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_unheld_gate_passes_through() {
        let gates = Gates::default();
        gates.wait("never-held").await;
    }
}
