//! Session state machine types

use super::NotificationKind;
use crate::address::ResolvedAddress;
use crate::geo::Coordinate;
use crate::postal::PostalCode;
use serde::Serialize;
use std::fmt;

/// Workflow phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing started yet, or just reset
    #[default]
    Idle,
    /// Waiting on permission or a device fix
    LocatingDevice,
    /// Ready for a postal code
    AwaitingPostalCode,
    /// Postal-code lookup in flight
    ResolvingAddress,
    /// Forward geocoding of the resolved address in flight
    GeocodingTarget,
    /// Target geocoded; distance present if the device location is known
    DistanceComputed,
    /// A step failed; the workflow immediately falls back to `AwaitingPostalCode`
    Error { reason: NotificationKind },
}

impl Phase {
    /// Phases in which a collaborator call is outstanding
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Phase::LocatingDevice | Phase::ResolvingAddress | Phase::GeocodingTarget
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Phase::Error { .. })
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::LocatingDevice => write!(f, "locating device"),
            Phase::AwaitingPostalCode => write!(f, "awaiting postal code"),
            Phase::ResolvingAddress => write!(f, "resolving address"),
            Phase::GeocodingTarget => write!(f, "geocoding target"),
            Phase::DistanceComputed => write!(f, "distance computed"),
            Phase::Error { reason } => write!(f, "error ({reason})"),
        }
    }
}

/// The single record of in-progress workflow state
///
/// Callers only ever see clones; every field is written by the workflow.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Session {
    pub(crate) current_location: Option<Coordinate>,
    pub(crate) current_location_address: Option<String>,
    pub(crate) target_postal_code: Option<PostalCode>,
    pub(crate) target_address: Option<ResolvedAddress>,
    pub(crate) distance_km: Option<f64>,
    pub(crate) phase: Phase,
}

impl Session {
    /// Empty session in the `Idle` phase
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_location(&self) -> Option<&Coordinate> {
        self.current_location.as_ref()
    }

    pub fn current_location_address(&self) -> Option<&str> {
        self.current_location_address.as_deref()
    }

    pub fn target_postal_code(&self) -> Option<&PostalCode> {
        self.target_postal_code.as_ref()
    }

    pub fn target_address(&self) -> Option<&ResolvedAddress> {
        self.target_address.as_ref()
    }

    pub fn target_coordinate(&self) -> Option<&Coordinate> {
        self.target_address
            .as_ref()
            .and_then(|address| address.coordinate.as_ref())
    }

    pub fn distance_km(&self) -> Option<f64> {
        self.distance_km
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Check the cross-field invariants
    ///
    /// A distance needs both endpoints, and a target address needs the postal
    /// code it was resolved from.
    pub fn invariants_hold(&self) -> bool {
        let distance_ok = self.distance_km.is_none()
            || (self.current_location.is_some() && self.target_coordinate().is_some());
        let address_ok = match (&self.target_address, &self.target_postal_code) {
            (Some(address), Some(code)) => &address.postal_code == code,
            (Some(_), None) => false,
            (None, _) => true,
        };
        distance_ok && address_ok
    }
}
