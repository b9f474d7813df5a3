//! User-facing notifications and workflow observers

use super::Session;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Kinds of user-facing notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PermissionDenied,
    LocationUnavailable,
    PostalCodeNotFound,
    NetworkFailure,
    AddressNotGeolocatable,
    InvalidPostalCodeFormat,
}

impl NotificationKind {
    /// Default message shown to the user
    ///
    /// Not-found outcomes point at the input, failures point at the connection.
    pub fn default_message(&self) -> &'static str {
        match self {
            NotificationKind::PermissionDenied => {
                "Location permission denied. Enable location access to get a distance."
            }
            NotificationKind::LocationUnavailable => "Could not obtain your current location.",
            NotificationKind::PostalCodeNotFound => {
                "Postal code not found. Check the code and try again."
            }
            NotificationKind::NetworkFailure => {
                "There was a problem looking up the postal code. Check your internet connection."
            }
            NotificationKind::AddressNotGeolocatable => {
                "Could not find the location of the postal code's address."
            }
            NotificationKind::InvalidPostalCodeFormat => {
                "Please enter a valid postal code (exactly 8 digits)."
            }
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NotificationKind::PermissionDenied => "permission denied",
            NotificationKind::LocationUnavailable => "location unavailable",
            NotificationKind::PostalCodeNotFound => "postal code not found",
            NotificationKind::NetworkFailure => "network failure",
            NotificationKind::AddressNotGeolocatable => "address not geolocatable",
            NotificationKind::InvalidPostalCodeFormat => "invalid postal code format",
        };
        f.write_str(name)
    }
}

/// A notification with timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    /// Create a notification with the kind's default message
    pub fn new(kind: NotificationKind) -> Self {
        Self::with_message(kind, kind.default_message())
    }

    pub fn with_message(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Everything the workflow publishes, in order
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    Transition(Session),
    Notification(Notification),
}

/// Observer for workflow output
#[async_trait]
pub trait WorkflowObserver: Send + Sync {
    /// Called with a snapshot after every phase change or field update
    async fn on_transition(&self, session: &Session);

    /// Called for every user-facing notification
    async fn on_notification(&self, notification: &Notification);
}

/// No-op observer implementation
pub struct NoOpObserver;

#[async_trait]
impl WorkflowObserver for NoOpObserver {
    async fn on_transition(&self, _session: &Session) {}

    async fn on_notification(&self, _notification: &Notification) {}
}

/// Writes workflow output to `tracing`
pub struct LoggingObserver;

#[async_trait]
impl WorkflowObserver for LoggingObserver {
    async fn on_transition(&self, session: &Session) {
        debug!(phase = %session.phase(), "session updated");
    }

    async fn on_notification(&self, notification: &Notification) {
        warn!(kind = %notification.kind, "{}", notification.message);
    }
}

/// Forwards workflow output into an unbounded channel
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<WorkflowEvent>,
}

impl ChannelObserver {
    /// Create the observer and the receiving half of its channel
    pub fn new() -> (Self, mpsc::UnboundedReceiver<WorkflowEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl WorkflowObserver for ChannelObserver {
    async fn on_transition(&self, session: &Session) {
        // Receiver gone means nobody is listening any more
        let _ = self.tx.send(WorkflowEvent::Transition(session.clone()));
    }

    async fn on_notification(&self, notification: &Notification) {
        let _ = self
            .tx
            .send(WorkflowEvent::Notification(notification.clone()));
    }
}
