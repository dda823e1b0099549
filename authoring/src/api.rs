//! Collaborator boundaries and the JSON shapes exchanged with them.
//!
//! The authoring client never talks to the network directly: the reducer
//! calls these traits through its environment. [`crate::http::HttpBackend`]
//! is the REST implementation and [`crate::mocks`] holds in-memory ones.

use crate::form::EventDraft;
use crate::images::{ImageFile, ImageUrl};
use crate::slots::WireTimeSlot;
use crate::types::{CallerIdentity, Category, EventId, EventStatus, SlotId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors reported by collaborators
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    /// Transport failure (connect, timeout, TLS)
    #[error("Request failed: {0}")]
    Request(String),

    /// Non-success status
    #[error("API error (status {status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Body missing fields or not parseable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Resource does not exist
    #[error("Not found")]
    NotFound,

    /// Caller not signed in or token rejected
    #[error("Unauthorized")]
    Unauthorized,
}

/// Collaborator result
pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

/// Boxed future returned by collaborator methods
pub type CollaboratorFuture<T> = Pin<Box<dyn Future<Output = CollaboratorResult<T>> + Send>>;

// ============================================================================
// Traits
// ============================================================================

/// Identity provider
pub trait AuthProvider: Send + Sync {
    /// Identity of the signed-in caller
    ///
    /// # Errors
    ///
    /// [`CollaboratorError::Unauthorized`] when nobody is signed in.
    fn current_caller(&self) -> CollaboratorFuture<CallerIdentity>;
}

/// REST backend for events
pub trait EventApi: Send + Sync {
    /// Create a new event
    ///
    /// # Errors
    ///
    /// Any transport or status failure.
    fn create_event(&self, payload: EventPayload) -> CollaboratorFuture<()>;

    /// Overwrite an existing event
    ///
    /// # Errors
    ///
    /// Any transport or status failure.
    fn update_event(&self, id: &EventId, payload: EventPayload) -> CollaboratorFuture<()>;

    /// Delete an event
    ///
    /// # Errors
    ///
    /// Any transport or status failure.
    fn delete_event(&self, id: &EventId) -> CollaboratorFuture<()>;

    /// Load an event owned by the caller for editing
    ///
    /// # Errors
    ///
    /// [`CollaboratorError::NotFound`] or any transport or status failure.
    fn fetch_event_for_editing(&self, id: &EventId) -> CollaboratorFuture<Event>;

    /// Book seats on one slot of an event
    ///
    /// # Errors
    ///
    /// Any transport or status failure.
    fn register_for_event(
        &self,
        id: &EventId,
        request: RegistrationRequest,
    ) -> CollaboratorFuture<Registration>;
}

/// Image storage behind pre-signed uploads
pub trait ImageStorage: Send + Sync {
    /// Reserve a location for `file_name`
    ///
    /// # Errors
    ///
    /// [`CollaboratorError::InvalidResponse`] if the reply lacks a field.
    fn request_upload_location(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> CollaboratorFuture<UploadLocation>;

    /// PUT raw bytes to a reserved location
    ///
    /// # Errors
    ///
    /// Any transport or status failure.
    fn put_bytes(
        &self,
        location: &UploadLocation,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> CollaboratorFuture<()>;

    /// Delete a stored image by its public URL
    ///
    /// # Errors
    ///
    /// Any transport or status failure.
    fn delete_image(&self, url: &ImageUrl) -> CollaboratorFuture<()>;
}

/// Reserve a location, PUT the bytes, and return the public URL
///
/// # Errors
///
/// The first failing step's error.
pub async fn upload_image(storage: &dyn ImageStorage, file: ImageFile) -> CollaboratorResult<ImageUrl> {
    let location = storage
        .request_upload_location(&file.file_name, &file.content_type)
        .await?;
    storage
        .put_bytes(&location, &file.content_type, file.bytes)
        .await?;
    tracing::debug!(key = %location.key, "Image stored");
    Ok(location.public_url)
}

// ============================================================================
// Wire models
// ============================================================================

/// Create/update body
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    /// Event title
    pub title: String,
    /// Serialized rich-text document
    pub description: String,
    /// Free-text location
    pub location: String,
    /// Category tags
    pub categories: Vec<Category>,
    /// Price per seat
    pub price_per_seat: f64,
    /// Slots in editor order
    pub time_slots: Vec<WireTimeSlot>,
    /// Cover URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<ImageUrl>,
    /// Gallery URLs in display order
    pub gallery_images: Vec<ImageUrl>,
    /// Target status
    pub status: EventStatus,
    /// Organizer id, attached at submission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coach_id: Option<UserId>,
    /// Organizer name, attached at submission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coach_name: Option<String>,
}

impl EventPayload {
    /// Snapshot `draft` with the target status; only uploaded images are included
    #[must_use]
    pub fn from_draft(draft: &EventDraft, status: EventStatus) -> Self {
        Self {
            title: draft.title.clone(),
            description: draft.description.serialize(),
            location: draft.location.clone(),
            categories: draft.categories.clone(),
            price_per_seat: draft.price_per_seat,
            time_slots: draft.time_slots.clone(),
            cover_image: draft.images.cover_url().cloned(),
            gallery_images: draft.images.gallery_urls(),
            status,
            coach_id: None,
            coach_name: None,
        }
    }

    /// Attach the organizer
    #[must_use]
    pub fn stamped(mut self, caller: &CallerIdentity) -> Self {
        self.coach_id = Some(caller.id.clone());
        self.coach_name = Some(caller.display_name.clone());
        self
    }
}

/// Event as returned for editing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event id
    pub id: EventId,
    /// Title
    #[serde(default)]
    pub title: String,
    /// Serialized rich-text document
    #[serde(default)]
    pub description: String,
    /// Location
    #[serde(default)]
    pub location: String,
    /// Raw category tags
    #[serde(default)]
    pub event_types: Vec<String>,
    /// Price per seat
    #[serde(default)]
    pub price_per_seat: f64,
    /// Status
    #[serde(default)]
    pub status: EventStatus,
    /// Cover URL; the backend sends `""` for none
    #[serde(default)]
    pub cover_image: Option<String>,
    /// Gallery URLs
    #[serde(default)]
    pub gallery_images: Option<Vec<ImageUrl>>,
    /// Organizer id
    #[serde(default)]
    pub coach_id: Option<UserId>,
    /// Slots
    #[serde(default)]
    pub time_slots: Vec<ServerTimeSlot>,
    /// IANA zone the organizer entered times in
    #[serde(default)]
    pub timezone: Option<String>,
}

impl Event {
    /// Known categories; unknown tags are dropped
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.event_types
            .iter()
            .filter_map(|tag| {
                let category = Category::from_wire(tag);
                if category.is_none() {
                    tracing::warn!(event_id = %self.id, tag = %tag, "Dropping unknown category");
                }
                category
            })
            .collect()
    }

    /// Cover URL, if any
    #[must_use]
    pub fn cover_url(&self) -> Option<ImageUrl> {
        self.cover_image
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(ImageUrl::new)
    }

    /// Gallery URLs, empty when absent
    #[must_use]
    pub fn gallery_urls(&self) -> Vec<ImageUrl> {
        self.gallery_images.clone().unwrap_or_default()
    }
}

fn default_true() -> bool {
    true
}

/// Slot as stored by the backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerTimeSlot {
    /// Slot id
    pub id: SlotId,
    /// Owning event
    #[serde(default)]
    pub event_id: Option<EventId>,
    /// Start
    pub start_time: DateTime<Utc>,
    /// End
    pub end_time: DateTime<Utc>,
    /// Capacity
    pub total_seats: u32,
    /// Seats not yet booked
    #[serde(default)]
    pub available_seats: u32,
    /// Whether the slot accepts bookings
    #[serde(default = "default_true")]
    pub is_available: bool,
}

/// Reserved upload location
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadLocation {
    /// Pre-signed PUT target
    pub upload_url: String,
    /// Storage key
    pub key: String,
    /// URL the image is served from once stored
    pub public_url: ImageUrl,
}

/// Upload reservation as the backend sends it
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUploadLocation {
    upload_url: Option<String>,
    key: Option<String>,
    url: Option<String>,
}

impl TryFrom<RawUploadLocation> for UploadLocation {
    type Error = CollaboratorError;

    fn try_from(raw: RawUploadLocation) -> Result<Self, Self::Error> {
        let present = |field: Option<String>| field.filter(|v| !v.is_empty());
        match (present(raw.upload_url), present(raw.key), present(raw.url)) {
            (Some(upload_url), Some(key), Some(url)) => Ok(Self {
                upload_url,
                key,
                public_url: ImageUrl::new(url),
            }),
            _ => Err(CollaboratorError::InvalidResponse(
                "Missing required fields".to_string(),
            )),
        }
    }
}

/// `{ success, data, message }` wrapper used by most endpoints
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Absent on some endpoints
    pub success: Option<bool>,
    /// Payload
    pub data: Option<T>,
    /// Error detail
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Payload of a successful reply
    ///
    /// # Errors
    ///
    /// [`CollaboratorError::InvalidResponse`] when `success` is false or
    /// `data` is missing.
    pub fn into_data(self) -> CollaboratorResult<T> {
        match (self.success, self.data) {
            (Some(false), _) | (_, None) => Err(CollaboratorError::InvalidResponse(
                self.message.unwrap_or_else(|| "Missing response data".to_string()),
            )),
            (_, Some(data)) => Ok(data),
        }
    }
}

/// Seat booking body
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    /// Slot to book
    pub time_slot_id: SlotId,
    /// Seats requested
    pub slot_count: u32,
}

/// Confirmed booking
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Registration id
    pub id: String,
    /// Event booked
    pub event_id: EventId,
    /// Slot booked
    pub time_slot_id: SlotId,
    /// Seats booked
    pub slot_count: u32,
    /// Backend status string
    pub status: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::images::ImageAttachments;
    use crate::rich_text::RichText;
    use serde_json::json;

    #[test]
    fn test_payload_is_camel_case_and_stamped() {
        let draft = EventDraft {
            title: "Beach Cleanup Volunteer Day!!".into(),
            description: RichText::paragraphs(["Bring gloves"]),
            location: "Lisbon".into(),
            categories: vec![Category::BeachCleanup],
            price_per_seat: 15.0,
            images: ImageAttachments::from_remote(
                Some(ImageUrl::new("https://cdn.test/c.png")),
                vec![ImageUrl::new("https://cdn.test/g.png")],
            ),
            ..EventDraft::default()
        };
        let payload = EventPayload::from_draft(&draft, EventStatus::Published)
            .stamped(&CallerIdentity::coach("user-1", "Marta"));

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["pricePerSeat"], 15.0);
        assert_eq!(json["categories"], json!(["BEACH_CLEANUP"]));
        assert_eq!(json["coverImage"], "https://cdn.test/c.png");
        assert_eq!(json["galleryImages"], json!(["https://cdn.test/g.png"]));
        assert_eq!(json["status"], "published");
        assert_eq!(json["coachId"], "user-1");
        assert_eq!(json["coachName"], "Marta");
        assert!(json["description"].as_str().unwrap().contains("Bring gloves"));
    }

    #[test]
    fn test_event_tolerates_sparse_payload() {
        let event: Event = serde_json::from_value(json!({
            "id": "evt_1",
            "title": "Dune restoration morning",
            "eventTypes": ["REFORESTATION", "KAYAKING"],
            "coverImage": "",
            "galleryImages": null,
            "timeSlots": [{
                "id": "slot_1",
                "startTime": "2025-06-02T09:00:00.000Z",
                "endTime": "2025-06-02T11:00:00.000Z",
                "totalSeats": 12
            }]
        }))
        .unwrap();

        assert_eq!(event.categories(), vec![Category::Reforestation]);
        assert_eq!(event.cover_url(), None);
        assert!(event.gallery_urls().is_empty());
        assert!(event.time_slots[0].is_available);
        assert_eq!(event.status, EventStatus::Draft);
    }

    #[test]
    fn test_upload_location_requires_every_field() {
        let raw: RawUploadLocation =
            serde_json::from_value(json!({ "uploadUrl": "https://s3.test/put", "key": "k" })).unwrap();
        assert_eq!(
            UploadLocation::try_from(raw),
            Err(CollaboratorError::InvalidResponse("Missing required fields".into()))
        );

        let raw: RawUploadLocation = serde_json::from_value(json!({
            "uploadUrl": "https://s3.test/put", "key": "k", "url": "https://cdn.test/k"
        }))
        .unwrap();
        assert_eq!(UploadLocation::try_from(raw).unwrap().public_url.as_str(), "https://cdn.test/k");
    }

    #[test]
    fn test_envelope_rejects_unsuccessful_reply() {
        let envelope: ApiEnvelope<Event> =
            serde_json::from_value(json!({ "success": false, "message": "nope" })).unwrap();
        assert_eq!(
            envelope.into_data().unwrap_err(),
            CollaboratorError::InvalidResponse("nope".into())
        );
    }

    #[test]
    fn test_envelope_fields_are_optional() {
        let envelope: ApiEnvelope<Registration> = serde_json::from_value(json!({
            "data": {
                "id": "reg_1",
                "eventId": "evt_1",
                "timeSlotId": "slot_1",
                "slotCount": 2,
                "status": "confirmed"
            }
        }))
        .unwrap();
        assert_eq!(envelope.into_data().unwrap().slot_count, 2);

        let empty: ApiEnvelope<Registration> = serde_json::from_value(json!({})).unwrap();
        assert_eq!(
            empty.into_data().unwrap_err(),
            CollaboratorError::InvalidResponse("Missing response data".into())
        );
    }
}
