//! Actions for the authoring session.

use crate::api::{CollaboratorError, Event, EventPayload};
use crate::form::DraftField;
use crate::images::{AttachmentKey, ImageFile, ImageUrl};
use crate::session::types::BatchId;
use crate::types::{Category, EventStatus};
use chrono::{NaiveDate, NaiveTime};

/// Every input to the authoring reducer
///
/// User intents come from the host page; the `…ed` / `…Failed` variants are
/// fed back by effects when a collaborator call resolves.
#[derive(Debug, Clone)]
pub enum AuthoringAction {
    // ------------------------------------------------------------------
    // Edit-mode loading
    // ------------------------------------------------------------------
    /// Fetch the edited event
    LoadEvent,

    /// The edited event arrived
    EventLoaded {
        /// Event as stored
        event: Box<Event>,
    },

    /// The edited event could not be fetched
    LoadFailed {
        /// Cause
        error: CollaboratorError,
    },

    // ------------------------------------------------------------------
    // Fields
    // ------------------------------------------------------------------
    /// Replace one field
    SetField {
        /// Field and value
        field: DraftField,
    },

    /// Add or remove a category
    ToggleCategory {
        /// Category to flip
        category: Category,
    },

    // ------------------------------------------------------------------
    // Time slots
    // ------------------------------------------------------------------
    /// Pick or clear the date for the next slot
    SelectDate {
        /// `None` closes the dialog
        date: Option<NaiveDate>,
    },

    /// Add a slot on the picked date
    AddSlot {
        /// Capacity
        seats: u32,
        /// Wall-clock start
        start: NaiveTime,
        /// Wall-clock end
        end: NaiveTime,
    },

    /// Change an existing slot
    EditSlot {
        /// Slot position
        index: usize,
        /// Capacity
        seats: u32,
        /// Wall-clock start
        start: NaiveTime,
        /// Wall-clock end
        end: NaiveTime,
    },

    /// Open the delete confirmation for a slot
    RequestSlotDelete {
        /// Slot position
        index: usize,
    },

    /// Delete the slot awaiting confirmation
    ConfirmSlotDelete,

    /// Close the delete confirmation
    CancelSlotDelete,

    // ------------------------------------------------------------------
    // Cover image
    // ------------------------------------------------------------------
    /// Replace the cover with a picked file
    UploadCover {
        /// Picked file
        file: ImageFile,
    },

    /// Cover upload confirmed
    CoverUploaded {
        /// Attachment uploaded
        key: AttachmentKey,
        /// Public URL
        url: ImageUrl,
    },

    /// Cover upload failed
    CoverUploadFailed {
        /// Attachment rolled back
        key: AttachmentKey,
        /// Cause
        error: CollaboratorError,
    },

    /// Replaced cover removed from storage
    PreviousCoverDeleted {
        /// Removed URL
        url: ImageUrl,
    },

    /// Replaced cover could not be removed from storage
    PreviousCoverDeleteFailed {
        /// Orphaned URL
        url: ImageUrl,
        /// Cause
        error: CollaboratorError,
    },

    /// Delete the cover
    DeleteCover,

    /// Cover removed from storage
    CoverDeleted {
        /// Removed URL
        url: ImageUrl,
    },

    /// Cover could not be removed
    CoverDeleteFailed {
        /// Cause
        error: CollaboratorError,
    },

    // ------------------------------------------------------------------
    // Gallery
    // ------------------------------------------------------------------
    /// Append picked files to the gallery
    UploadGalleryImages {
        /// Picked files, in selection order
        files: Vec<ImageFile>,
    },

    /// One gallery upload confirmed
    GalleryImageUploaded {
        /// Selection it belongs to
        batch: BatchId,
        /// Attachment uploaded
        key: AttachmentKey,
        /// Public URL
        url: ImageUrl,
    },

    /// One gallery upload failed
    GalleryImageUploadFailed {
        /// Selection it belongs to
        batch: BatchId,
        /// Attachment rolled back
        key: AttachmentKey,
        /// Cause
        error: CollaboratorError,
    },

    /// Delete the gallery image at `index`
    DeleteGalleryImage {
        /// Gallery position
        index: usize,
    },

    /// Gallery image removed from storage
    GalleryImageDeleted {
        /// Attachment removed
        key: AttachmentKey,
    },

    /// Gallery image could not be removed
    GalleryImageDeleteFailed {
        /// Attachment kept
        key: AttachmentKey,
        /// Cause
        error: CollaboratorError,
    },

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------
    /// Validate and persist with the given status
    Submit {
        /// Target status
        status: EventStatus,
    },

    /// Caller identity attached to the snapshot
    CallerResolved {
        /// Stamped snapshot taken at validation time
        payload: Box<EventPayload>,
    },

    /// Caller identity unavailable
    CallerResolutionFailed {
        /// Cause
        error: CollaboratorError,
    },

    /// Create or update confirmed
    EventPersisted {
        /// Status persisted
        status: EventStatus,
    },

    /// Create or update rejected
    PersistFailed {
        /// Cause
        error: CollaboratorError,
    },

    // ------------------------------------------------------------------
    // Event deletion (edit mode)
    // ------------------------------------------------------------------
    /// Open the delete confirmation
    RequestEventDelete,

    /// Close the delete confirmation
    CancelEventDelete,

    /// Delete the event
    ConfirmEventDelete,

    /// Event removed
    EventDeleted,

    /// Event could not be removed
    EventDeleteFailed {
        /// Cause
        error: CollaboratorError,
    },

    /// Clear every notice
    DismissNotices,
}
