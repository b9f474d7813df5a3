//! Distance workflow state machine
//!
//! Sequences device location, postal-code lookup, forward geocoding and the
//! distance computation over a single [`Session`]. Collaborator failures
//! become notifications; the workflow never aborts and every trigger can be
//! re-issued.
//!
//! Each request kind (locate, postal code) carries a generation number. A
//! newer request of the same kind, or a reset, bumps the generation and any
//! result that comes back for an older generation is dropped.

use crate::abstractions::{AddressResolver, LocationProvider, Permission};
use crate::geo;
use crate::postal::PostalCode;
use crate::session::{Notification, NotificationKind, Phase, Session, WorkflowObserver};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Result of triggering a workflow action
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The action ran to completion; snapshot of the resulting session
    Applied(Session),
    /// Input rejected before any collaborator call; session untouched
    Rejected(Notification),
    /// A newer request or a reset took over; this result was discarded
    Superseded,
}

impl Transition {
    pub fn session(&self) -> Option<&Session> {
        match self {
            Transition::Applied(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Transition::Superseded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ticket {
    Locate(u64),
    Postal(u64),
}

#[derive(Default)]
struct WorkflowState {
    session: Session,
    locate_generation: u64,
    postal_generation: u64,
    /// Bumped on every committed change; orders snapshots for observers
    revision: u64,
}

impl WorkflowState {
    fn commit(&mut self) -> (Session, u64) {
        self.revision += 1;
        (self.session.clone(), self.revision)
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        match ticket {
            Ticket::Locate(generation) => generation == self.locate_generation,
            Ticket::Postal(generation) => generation == self.postal_generation,
        }
    }
}

/// The orchestrating state machine; sole writer of the session
pub struct DistanceWorkflow {
    location: Arc<dyn LocationProvider>,
    resolver: Arc<dyn AddressResolver>,
    state: Mutex<WorkflowState>,
    observers: RwLock<Vec<Arc<dyn WorkflowObserver>>>,
    /// Revision of the last snapshot delivered to observers
    published: Mutex<u64>,
}

impl DistanceWorkflow {
    /// Create a workflow with an empty, idle session
    pub fn new(location: Arc<dyn LocationProvider>, resolver: Arc<dyn AddressResolver>) -> Self {
        Self {
            location,
            resolver,
            state: Mutex::new(WorkflowState::default()),
            observers: RwLock::new(Vec::new()),
            published: Mutex::new(0),
        }
    }

    /// Register an observer before the workflow is shared
    pub fn with_observer(mut self, observer: Arc<dyn WorkflowObserver>) -> Self {
        self.observers.get_mut().push(observer);
        self
    }

    /// Add an observer
    pub async fn add_observer(&self, observer: Arc<dyn WorkflowObserver>) {
        self.observers.write().await.push(observer);
    }

    /// Current session snapshot
    pub async fn snapshot(&self) -> Session {
        self.state.lock().await.session.clone()
    }

    /// Implicit first transition when the application starts
    pub async fn start(&self) -> Transition {
        debug!("Starting distance workflow");
        self.locate().await
    }

    /// Acquire the device location ("locate me")
    ///
    /// Denied permission and missing fixes are reported and leave the
    /// location fields as they were; the user can still enter a postal code.
    pub async fn locate(&self) -> Transition {
        let (ticket, resume) = self.begin_locate().await;

        if self.location.request_permission().await == Permission::Denied {
            warn!("Location permission denied");
            return self
                .fail_locate(ticket, resume, NotificationKind::PermissionDenied)
                .await;
        }
        if !self.is_current(ticket).await {
            return Transition::Superseded;
        }

        let coordinate = match self.location.current_coordinate().await {
            Ok(coordinate) => coordinate,
            Err(e) => {
                warn!(error = %e, "Could not obtain device location");
                return self
                    .fail_locate(ticket, resume, NotificationKind::LocationUnavailable)
                    .await;
            }
        };
        debug!(%coordinate, "Device location acquired");

        let label = match self.location.reverse_geocode(&coordinate).await {
            Ok(label) => label,
            Err(e) => {
                debug!(error = %e, "Reverse geocoding failed, continuing without a label");
                None
            }
        };

        let applied = self
            .apply(ticket, move |session| {
                session.current_location = Some(coordinate);
                session.current_location_address = label;
                session.distance_km = session
                    .target_coordinate()
                    .map(|target| geo::distance_km(&coordinate, target));
                if session.phase == Phase::LocatingDevice {
                    session.phase = if session.distance_km.is_some() {
                        Phase::DistanceComputed
                    } else {
                        Phase::AwaitingPostalCode
                    };
                }
            })
            .await;
        Self::settle(applied)
    }

    /// Submit a raw postal code for resolution
    ///
    /// Malformed input is rejected without contacting the resolver. A valid
    /// code supersedes any lookup still in flight.
    pub async fn submit_postal_code(&self, raw: &str) -> Transition {
        let code = match PostalCode::parse(raw) {
            Ok(code) => code,
            Err(e) => {
                debug!(error = %e, "Rejected postal code");
                let notification = Notification::new(NotificationKind::InvalidPostalCodeFormat);
                self.publish_notification(&notification).await;
                return Transition::Rejected(notification);
            }
        };

        let ticket = self.begin_postal(&code).await;

        let mut address = match self.resolver.lookup_postal_code(&code).await {
            Ok(Some(address)) => address,
            Ok(None) => {
                debug!(postal_code = %code, "Postal code not found");
                return self
                    .fail_postal(ticket, NotificationKind::PostalCodeNotFound)
                    .await;
            }
            Err(e) => {
                warn!(postal_code = %code, error = %e, "Postal code lookup failed");
                return self
                    .fail_postal(ticket, NotificationKind::NetworkFailure)
                    .await;
            }
        };
        address.postal_code = code.clone();
        address.coordinate = None;
        let query = address.geocoding_query();

        let resolved = self
            .apply(ticket, move |session| {
                session.target_postal_code = Some(code);
                session.target_address = Some(address);
                session.distance_km = None;
                session.phase = Phase::GeocodingTarget;
            })
            .await;
        if resolved.is_none() {
            return Transition::Superseded;
        }

        let target = match self.resolver.forward_geocode(&query).await {
            Ok(Some(coordinate)) => coordinate,
            Ok(None) => {
                debug!(%query, "Address has no geocoding match");
                return self
                    .fail_postal(ticket, NotificationKind::AddressNotGeolocatable)
                    .await;
            }
            Err(e) => {
                warn!(%query, error = %e, "Forward geocoding failed");
                return self
                    .fail_postal(ticket, NotificationKind::AddressNotGeolocatable)
                    .await;
            }
        };

        let applied = self
            .apply(ticket, move |session| {
                if let Some(address) = session.target_address.as_mut() {
                    address.coordinate = Some(target);
                }
                session.distance_km = session
                    .current_location
                    .map(|here| geo::distance_km(&here, &target));
                session.phase = Phase::DistanceComputed;
            })
            .await;
        if let Some(session) = &applied {
            match session.distance_km() {
                Some(km) => info!(distance_km = km, "Distance computed"),
                None => info!("Target located; device location unknown, no distance"),
            }
        }
        Self::settle(applied)
    }

    /// Discard the session and return to `Idle`
    ///
    /// Every in-flight request is superseded.
    pub async fn reset(&self) -> Transition {
        let (snapshot, revision) = {
            let mut state = self.state.lock().await;
            state.locate_generation += 1;
            state.postal_generation += 1;
            state.session = Session::new();
            state.commit()
        };
        debug!("Session reset");
        self.publish_transition(&snapshot, revision).await;
        Transition::Applied(snapshot)
    }

    /// Returns the ticket and the phase a failed locate falls back to
    async fn begin_locate(&self) -> (Ticket, Phase) {
        let (ticket, resume, snapshot) = {
            let mut state = self.state.lock().await;
            state.locate_generation += 1;
            let ticket = Ticket::Locate(state.locate_generation);
            let resume = match state.session.phase {
                Phase::DistanceComputed => Phase::DistanceComputed,
                _ => Phase::AwaitingPostalCode,
            };
            // A postal request in flight owns the phase
            let snapshot = if matches!(
                state.session.phase,
                Phase::ResolvingAddress | Phase::GeocodingTarget
            ) {
                None
            } else {
                state.session.phase = Phase::LocatingDevice;
                Some(state.commit())
            };
            (ticket, resume, snapshot)
        };
        debug!(?ticket, "Locating device");
        if let Some((snapshot, revision)) = snapshot {
            self.publish_transition(&snapshot, revision).await;
        }
        (ticket, resume)
    }

    async fn begin_postal(&self, code: &PostalCode) -> Ticket {
        let (ticket, (snapshot, revision)) = {
            let mut state = self.state.lock().await;
            state.postal_generation += 1;
            state.session.phase = Phase::ResolvingAddress;
            (Ticket::Postal(state.postal_generation), state.commit())
        };
        debug!(?ticket, postal_code = %code, "Resolving postal code");
        self.publish_transition(&snapshot, revision).await;
        ticket
    }

    /// Enter `Error`, notify, then fall back to `AwaitingPostalCode`
    async fn fail_postal(&self, ticket: Ticket, kind: NotificationKind) -> Transition {
        let errored = self
            .apply(ticket, move |session| {
                session.phase = Phase::Error { reason: kind };
            })
            .await;
        if errored.is_none() {
            return Transition::Superseded;
        }
        self.publish_notification(&Notification::new(kind)).await;

        let applied = self
            .apply(ticket, |session| {
                session.phase = Phase::AwaitingPostalCode;
            })
            .await;
        Self::settle(applied)
    }

    /// Like [`Self::fail_postal`], but leaves the phase alone when a postal
    /// request took it over in the meantime, and settles back on `resume`
    async fn fail_locate(
        &self,
        ticket: Ticket,
        resume: Phase,
        kind: NotificationKind,
    ) -> Transition {
        let errored = self
            .apply(ticket, move |session| {
                if session.phase == Phase::LocatingDevice {
                    session.phase = Phase::Error { reason: kind };
                }
            })
            .await;
        if errored.is_none() {
            return Transition::Superseded;
        }
        self.publish_notification(&Notification::new(kind)).await;

        let applied = self
            .apply(ticket, move |session| {
                if session.phase == (Phase::Error { reason: kind }) {
                    session.phase = resume;
                }
            })
            .await;
        Self::settle(applied)
    }

    async fn is_current(&self, ticket: Ticket) -> bool {
        self.state.lock().await.is_current(ticket)
    }

    /// Mutate the session if `ticket` is still current and publish the new
    /// snapshot when anything changed. `None` means the ticket is stale.
    async fn apply<F>(&self, ticket: Ticket, mutate: F) -> Option<Session>
    where
        F: FnOnce(&mut Session),
    {
        let (snapshot, revision) = {
            let mut state = self.state.lock().await;
            if !state.is_current(ticket) {
                debug!(?ticket, "Discarding superseded result");
                return None;
            }
            let before = state.session.clone();
            mutate(&mut state.session);
            debug_assert!(
                state.session.invariants_hold(),
                "session invariants violated: {:?}",
                state.session
            );
            if state.session == before {
                (before, None)
            } else {
                let (snapshot, revision) = state.commit();
                (snapshot, Some(revision))
            }
        };
        if let Some(revision) = revision {
            debug!(phase = %snapshot.phase(), "Session transition");
            self.publish_transition(&snapshot, revision).await;
        }
        Some(snapshot)
    }

    fn settle(applied: Option<Session>) -> Transition {
        applied.map_or(Transition::Superseded, Transition::Applied)
    }

    /// Deliver a snapshot unless a newer one already went out
    async fn publish_transition(&self, session: &Session, revision: u64) {
        let mut published = self.published.lock().await;
        if revision <= *published {
            debug!(revision, "Skipping stale snapshot");
            return;
        }
        *published = revision;
        let observers = self.observers.read().await;
        for observer in observers.iter() {
            observer.on_transition(session).await;
        }
    }

    async fn publish_notification(&self, notification: &Notification) {
        // Shares the delivery lock so notifications interleave with
        // snapshots in commit order
        let _published = self.published.lock().await;
        let observers = self.observers.read().await;
        for observer in observers.iter() {
            observer.on_notification(notification).await;
        }
    }
}
