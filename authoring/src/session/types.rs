//! State of one authoring session.

use crate::api::CollaboratorError;
use crate::form::EventDraft;
use crate::images::AttachmentKey;
use crate::slots::TimeSlotEditor;
use crate::types::EventId;
use crate::validation::ValidationFailure;
use chrono::{DateTime, FixedOffset, Utc};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Whether the form creates a new event or edits an existing one
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormMode {
    /// New event; submission creates
    Create,
    /// Existing event; submission updates
    Edit {
        /// Event being edited
        event_id: EventId,
    },
}

impl FormMode {
    /// Id of the edited event
    #[must_use]
    pub const fn event_id(&self) -> Option<&EventId> {
        match self {
            Self::Create => None,
            Self::Edit { event_id } => Some(event_id),
        }
    }
}

/// Submission state machine
///
/// ```text
/// Idle → Validating → Submitting → Succeeded
///             ↓            ↓
///           Failed  →    Idle
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmissionPhase {
    /// Waiting for the user
    #[default]
    Idle,
    /// Rules are being checked
    Validating,
    /// Caller resolution or persist in flight
    Submitting,
    /// Persisted; the form is navigating away
    Succeeded,
    /// Rejected; returns to `Idle` immediately
    Failed,
}

impl fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Submitting => "submitting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Why the last submission attempt failed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionFailure {
    /// Rules broken; nothing was sent
    Validation(ValidationFailure),
    /// Caller identity could not be resolved
    AuthResolution(CollaboratorError),
    /// Create or update rejected
    Persist(CollaboratorError),
}

/// Per-operation busy flags; controls are disabled while set
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BusyFlags {
    /// Edit-mode load in flight
    pub loading: bool,
    /// Cover delete in flight
    pub deleting_cover: bool,
    /// Gallery deletes in flight
    pub deleting_gallery: HashSet<AttachmentKey>,
    /// Event delete in flight
    pub deleting_event: bool,
    /// Event delete dialog open
    pub confirm_event_delete: bool,
}

/// Severity of a notice
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Confirmation
    Success,
    /// Failure the user should see
    Error,
}

/// User-facing toast
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Short heading
    pub title: String,
    /// Body text
    pub message: String,
    /// When it was raised
    pub at: DateTime<Utc>,
}

impl Notice {
    pub(crate) fn success(message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: "Success".to_string(),
            message: message.into(),
            at,
        }
    }

    pub(crate) fn error(message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Error".to_string(),
            message: message.into(),
            at,
        }
    }

    pub(crate) fn validation(failure: &ValidationFailure, at: DateTime<Utc>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Validation Error".to_string(),
            message: failure.to_string(),
            at,
        }
    }
}

/// Where the host should navigate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// The organizer's event listing
    MyEvents,
    /// Sign-in page
    Login,
    /// Landing page
    Home,
}

/// Identifies one multi-file gallery selection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BatchId(pub u64);

/// Progress of one gallery selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GalleryBatch {
    /// Uploads not yet resolved
    pub pending: usize,
    /// Uploads confirmed
    pub uploaded: usize,
    /// Uploads rolled back
    pub failed: usize,
}

/// Whole authoring session
#[derive(Clone, Debug)]
pub struct AuthoringState {
    /// Create or edit
    pub mode: FormMode,
    /// Event being authored
    pub draft: EventDraft,
    /// Slot editor
    pub slots: TimeSlotEditor,
    /// Submission state machine
    pub phase: SubmissionPhase,
    /// Why the last submission failed
    pub last_failure: Option<SubmissionFailure>,
    /// Busy flags
    pub busy: BusyFlags,
    /// Toasts raised so far
    pub notices: Vec<Notice>,
    /// Requested navigation, set once
    pub navigation: Option<Route>,
    /// Gallery selections still uploading
    pub batches: HashMap<BatchId, GalleryBatch>,
    next_batch: u64,
}

impl AuthoringState {
    /// Empty session entering slot times in `offset`
    #[must_use]
    pub fn new(mode: FormMode, offset: FixedOffset) -> Self {
        Self {
            mode,
            draft: EventDraft::default(),
            slots: TimeSlotEditor::new(offset),
            phase: SubmissionPhase::Idle,
            last_failure: None,
            busy: BusyFlags::default(),
            notices: Vec::new(),
            navigation: None,
            batches: HashMap::new(),
            next_batch: 0,
        }
    }

    /// Session for a new event
    #[must_use]
    pub fn create(offset: FixedOffset) -> Self {
        Self::new(FormMode::Create, offset)
    }

    /// Session for an existing event, before it is loaded
    #[must_use]
    pub fn edit(event_id: EventId, offset: FixedOffset) -> Self {
        Self::new(FormMode::Edit { event_id }, offset)
    }

    /// Any image upload in flight
    #[must_use]
    pub fn is_uploading(&self) -> bool {
        self.draft.images.is_cover_uploading() || self.draft.images.gallery_uploads_in_flight() > 0
    }

    /// Submission in flight
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.phase == SubmissionPhase::Submitting
    }

    /// Whether dialogs may be closed or the page left
    #[must_use]
    pub fn can_close(&self) -> bool {
        !(self.is_uploading()
            || self.is_submitting()
            || self.busy.loading
            || self.busy.deleting_event
            || self.busy.deleting_cover
            || !self.busy.deleting_gallery.is_empty())
    }

    /// Most recent notice
    #[must_use]
    pub fn last_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }

    pub(crate) fn transition(&mut self, to: SubmissionPhase) {
        tracing::debug!(from = %self.phase, to = %to, "Submission phase");
        self.phase = to;
    }

    pub(crate) fn next_batch_id(&mut self) -> BatchId {
        self.next_batch += 1;
        BatchId(self.next_batch)
    }
}
