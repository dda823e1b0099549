//! In-memory collaborators for development and tests.
//!
//! All three share a [`CallLog`] so a test can assert the order in which the
//! reducer reached its collaborators.

use crate::api::{
    AuthProvider, CollaboratorError, CollaboratorFuture, Event, EventApi, EventPayload,
    ImageStorage, Registration, RegistrationRequest, UploadLocation,
};
use crate::images::ImageUrl;
use crate::types::{CallerIdentity, EventId};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One recorded collaborator call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    /// `AuthProvider::current_caller`
    CurrentCaller,
    /// `ImageStorage::request_upload_location`
    RequestUpload {
        /// File name
        file_name: String,
    },
    /// `ImageStorage::put_bytes`, recorded when the PUT resolves
    PutBytes {
        /// Public URL the bytes became available at
        url: ImageUrl,
    },
    /// `ImageStorage::delete_image`
    DeleteImage {
        /// Deleted URL
        url: ImageUrl,
    },
    /// `EventApi::create_event`
    CreateEvent,
    /// `EventApi::update_event`
    UpdateEvent {
        /// Updated event
        id: EventId,
    },
    /// `EventApi::delete_event`
    DeleteEvent {
        /// Deleted event
        id: EventId,
    },
    /// `EventApi::fetch_event_for_editing`
    FetchEvent {
        /// Fetched event
        id: EventId,
    },
    /// `EventApi::register_for_event`
    Register {
        /// Event booked
        id: EventId,
    },
}

/// Shared, ordered record of collaborator calls
#[derive(Clone, Debug, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallLog {
    /// Empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: Call) {
        lock(&self.calls).push(call);
    }

    /// Every call so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    /// Number of calls matching `predicate`
    #[must_use]
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        lock(&self.calls).iter().filter(|c| predicate(c)).count()
    }

    /// Position of the first call equal to `call`
    #[must_use]
    pub fn position(&self, call: &Call) -> Option<usize> {
        lock(&self.calls).iter().position(|c| c == call)
    }
}

// ============================================================================
// Auth
// ============================================================================

/// Auth provider returning a fixed caller (or `Unauthorized`)
#[derive(Clone, Debug)]
pub struct StaticAuthProvider {
    caller: Option<CallerIdentity>,
    log: CallLog,
}

impl StaticAuthProvider {
    /// Provider that always resolves to `caller`
    #[must_use]
    pub fn new(caller: CallerIdentity, log: CallLog) -> Self {
        Self {
            caller: Some(caller),
            log,
        }
    }

    /// Provider with nobody signed in
    #[must_use]
    pub const fn signed_out(log: CallLog) -> Self {
        Self { caller: None, log }
    }
}

impl AuthProvider for StaticAuthProvider {
    fn current_caller(&self) -> CollaboratorFuture<CallerIdentity> {
        self.log.record(Call::CurrentCaller);
        let caller = self.caller.clone();
        Box::pin(async move { caller.ok_or(CollaboratorError::Unauthorized) })
    }
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Default)]
struct EventStoreState {
    events: HashMap<EventId, Event>,
    created: Vec<EventPayload>,
    updated: Vec<(EventId, EventPayload)>,
    deleted: Vec<EventId>,
    failing: HashSet<&'static str>,
}

/// Event backend holding everything in memory
#[derive(Clone, Debug, Default)]
pub struct InMemoryEventApi {
    state: Arc<Mutex<EventStoreState>>,
    log: CallLog,
    registrations: Arc<AtomicUsize>,
}

impl InMemoryEventApi {
    /// Empty backend recording into `log`
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Make `event` available to `fetch_event_for_editing`
    #[must_use]
    pub fn with_event(self, event: Event) -> Self {
        lock(&self.state).events.insert(event.id.clone(), event);
        self
    }

    /// Make one operation (`"create"`, `"update"`, `"delete"`, `"fetch"`,
    /// `"register"`) fail with a 500
    #[must_use]
    pub fn failing(self, operation: &'static str) -> Self {
        lock(&self.state).failing.insert(operation);
        self
    }

    /// Payloads passed to `create_event`
    #[must_use]
    pub fn created(&self) -> Vec<EventPayload> {
        lock(&self.state).created.clone()
    }

    /// Payloads passed to `update_event`
    #[must_use]
    pub fn updated(&self) -> Vec<(EventId, EventPayload)> {
        lock(&self.state).updated.clone()
    }

    /// Ids passed to `delete_event`
    #[must_use]
    pub fn deleted(&self) -> Vec<EventId> {
        lock(&self.state).deleted.clone()
    }

    fn check(&self, operation: &str) -> Result<(), CollaboratorError> {
        if lock(&self.state).failing.contains(operation) {
            return Err(CollaboratorError::Status {
                status: 500,
                message: format!("{operation} failed"),
            });
        }
        Ok(())
    }
}

impl EventApi for InMemoryEventApi {
    fn create_event(&self, payload: EventPayload) -> CollaboratorFuture<()> {
        self.log.record(Call::CreateEvent);
        let result = self.check("create").map(|()| {
            lock(&self.state).created.push(payload);
        });
        Box::pin(async move { result })
    }

    fn update_event(&self, id: &EventId, payload: EventPayload) -> CollaboratorFuture<()> {
        self.log.record(Call::UpdateEvent { id: id.clone() });
        let result = self.check("update").map(|()| {
            lock(&self.state).updated.push((id.clone(), payload));
        });
        Box::pin(async move { result })
    }

    fn delete_event(&self, id: &EventId) -> CollaboratorFuture<()> {
        self.log.record(Call::DeleteEvent { id: id.clone() });
        let result = self.check("delete").map(|()| {
            let mut state = lock(&self.state);
            state.events.remove(id);
            state.deleted.push(id.clone());
        });
        Box::pin(async move { result })
    }

    fn fetch_event_for_editing(&self, id: &EventId) -> CollaboratorFuture<Event> {
        self.log.record(Call::FetchEvent { id: id.clone() });
        let result = self.check("fetch").and_then(|()| {
            lock(&self.state)
                .events
                .get(id)
                .cloned()
                .ok_or(CollaboratorError::NotFound)
        });
        Box::pin(async move { result })
    }

    fn register_for_event(
        &self,
        id: &EventId,
        request: RegistrationRequest,
    ) -> CollaboratorFuture<Registration> {
        self.log.record(Call::Register { id: id.clone() });
        let number = self.registrations.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.check("register").map(|()| Registration {
            id: format!("reg_{number}"),
            event_id: id.clone(),
            time_slot_id: request.time_slot_id,
            slot_count: request.slot_count,
            status: "confirmed".to_string(),
        });
        Box::pin(async move { result })
    }
}

// ============================================================================
// Images
// ============================================================================

#[derive(Debug, Default)]
struct StorageState {
    stored: Vec<ImageUrl>,
    failing_uploads: HashSet<String>,
    failing_deletes: HashSet<ImageUrl>,
    delays: HashMap<String, Duration>,
}

/// Image storage holding URLs in memory
///
/// Public URLs look like `https://cdn.test/events/{n}-{file_name}`.
#[derive(Clone, Debug, Default)]
pub struct InMemoryImageStorage {
    state: Arc<Mutex<StorageState>>,
    log: CallLog,
    sequence: Arc<AtomicUsize>,
}

impl InMemoryImageStorage {
    /// Empty storage recording into `log`
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Fail the PUT for `file_name`
    #[must_use]
    pub fn failing_upload(self, file_name: &str) -> Self {
        lock(&self.state).failing_uploads.insert(file_name.to_string());
        self
    }

    /// Fail deletes of `url`
    #[must_use]
    pub fn failing_delete(self, url: ImageUrl) -> Self {
        lock(&self.state).failing_deletes.insert(url);
        self
    }

    /// Hold the PUT for `file_name` for `delay`
    #[must_use]
    pub fn delayed_upload(self, file_name: &str, delay: Duration) -> Self {
        lock(&self.state).delays.insert(file_name.to_string(), delay);
        self
    }

    /// Seed an already-stored image
    #[must_use]
    pub fn with_stored(self, url: ImageUrl) -> Self {
        lock(&self.state).stored.push(url);
        self
    }

    /// URLs currently stored
    #[must_use]
    pub fn stored(&self) -> Vec<ImageUrl> {
        lock(&self.state).stored.clone()
    }
}

impl ImageStorage for InMemoryImageStorage {
    fn request_upload_location(
        &self,
        file_name: &str,
        _content_type: &str,
    ) -> CollaboratorFuture<UploadLocation> {
        self.log.record(Call::RequestUpload {
            file_name: file_name.to_string(),
        });
        let n = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let key = format!("events/{n}-{file_name}");
        let location = UploadLocation {
            upload_url: format!("memory://upload/{key}?file={file_name}"),
            public_url: ImageUrl::new(format!("https://cdn.test/{key}")),
            key,
        };
        Box::pin(async move { Ok(location) })
    }

    fn put_bytes(
        &self,
        location: &UploadLocation,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> CollaboratorFuture<()> {
        let file_name = location
            .upload_url
            .rsplit_once("?file=")
            .map(|(_, name)| name.to_string())
            .unwrap_or_default();
        let (delay, fails) = {
            let state = lock(&self.state);
            (
                state.delays.get(&file_name).copied(),
                state.failing_uploads.contains(&file_name),
            )
        };
        let url = location.public_url.clone();
        let state = Arc::clone(&self.state);
        let log = self.log.clone();
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if fails {
                return Err(CollaboratorError::Status {
                    status: 403,
                    message: "SignatureDoesNotMatch".to_string(),
                });
            }
            lock(&state).stored.push(url.clone());
            log.record(Call::PutBytes { url });
            Ok(())
        })
    }

    fn delete_image(&self, url: &ImageUrl) -> CollaboratorFuture<()> {
        self.log.record(Call::DeleteImage { url: url.clone() });
        let result = {
            let mut state = lock(&self.state);
            if state.failing_deletes.contains(url) {
                Err(CollaboratorError::Status {
                    status: 500,
                    message: "delete failed".to_string(),
                })
            } else {
                state.stored.retain(|stored| stored != url);
                Ok(())
            }
        };
        Box::pin(async move { result })
    }
}
