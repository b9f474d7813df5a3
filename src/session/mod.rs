//! Session state and workflow output
//!
//! A [`Session`] is the single record of an interaction's progress. The
//! workflow owns it and publishes snapshots plus [`Notification`]s to
//! registered [`WorkflowObserver`]s.

pub mod events;
pub mod state;

pub use events::{
    ChannelObserver, LoggingObserver, NoOpObserver, Notification, NotificationKind,
    WorkflowEvent, WorkflowObserver,
};
pub use state::{Phase, Session};
