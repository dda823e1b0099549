//! Reducer for the authoring session.
//!
//! All business rules of the form live here. Collaborator calls are returned
//! as effects and their outcomes come back as actions, so every state change
//! happens inside `reduce`.

use crate::api::{upload_image, CollaboratorError, Event, EventPayload};
use crate::form::EventDraft;
use crate::images::{ImageAttachments, ImageFile, ImageUrl};
use crate::rich_text::RichText;
use crate::session::{
    AuthoringAction, AuthoringEnvironment, AuthoringState, BatchId, FormMode, GalleryBatch,
    Notice, Route, SubmissionFailure, SubmissionPhase,
};
use crate::slots::{SlotError, TimeSlotDraft, TimeSlotEditor};
use crate::types::EventStatus;
use crate::validation::ensure_valid;
use ecoevents_core::{effect::Effect, reducer::Reducer};
use smallvec::{smallvec, SmallVec};

type Effects = SmallVec<[Effect<AuthoringAction>; 4]>;

const LOAD_FAILED: &str = "Failed to load event data. Please try again.";
const SAVE_FAILED: &str = "Failed to save event. Please try again.";
const COVER_UPLOAD_FAILED: &str = "Failed to upload cover image. Please try again.";
const GALLERY_UPLOAD_FAILED: &str = "Failed to upload gallery images. Please try again.";
const COVER_DELETE_FAILED: &str = "Failed to delete cover image. Please try again.";
const GALLERY_DELETE_FAILED: &str = "Failed to delete gallery image. Please try again.";
const EVENT_DELETE_FAILED: &str = "Failed to delete event. Please try again.";
const COVER_BUSY: &str = "Please wait until the cover image has been deleted.";

/// Reducer for one authoring session
pub struct AuthoringReducer;

impl AuthoringReducer {
    /// Create a new authoring reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for AuthoringReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for AuthoringReducer {
    type State = AuthoringState;
    type Action = AuthoringAction;
    type Environment = AuthoringEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects {
        match action {
            // ========== Loading ==========
            AuthoringAction::LoadEvent => load_event(state, env),

            AuthoringAction::EventLoaded { event } => {
                state.busy.loading = false;
                populate_from_event(state, *event);
                SmallVec::new()
            },

            AuthoringAction::LoadFailed { error } => {
                state.busy.loading = false;
                tracing::warn!(%error, "Failed to load event for editing");
                state.notices.push(Notice::error(LOAD_FAILED, env.clock().now()));
                SmallVec::new()
            },

            // ========== Fields ==========
            AuthoringAction::SetField { field } => {
                tracing::trace!(field = field.name(), "Field updated");
                state.draft.set_field(field);
                SmallVec::new()
            },

            AuthoringAction::ToggleCategory { category } => {
                state.draft.toggle_category(category);
                SmallVec::new()
            },

            // ========== Time slots ==========
            AuthoringAction::SelectDate { date } => {
                state.slots.select_date(date);
                SmallVec::new()
            },

            AuthoringAction::AddSlot { seats, start, end } => {
                let result = state.slots.add_slot(seats, start, end).map(|_| ());
                after_slot_change(state, env, result)
            },

            AuthoringAction::EditSlot {
                index,
                seats,
                start,
                end,
            } => {
                let result = state.slots.edit_slot(index, seats, start, end);
                after_slot_change(state, env, result)
            },

            AuthoringAction::RequestSlotDelete { index } => {
                let result = state.slots.request_delete(index);
                after_slot_change(state, env, result)
            },

            AuthoringAction::ConfirmSlotDelete => {
                let result = state.slots.confirm_delete().map(|_| ());
                after_slot_change(state, env, result)
            },

            AuthoringAction::CancelSlotDelete => {
                state.slots.cancel_delete();
                SmallVec::new()
            },

            // ========== Cover ==========
            AuthoringAction::UploadCover { file } => upload_cover(state, env, file),

            AuthoringAction::CoverUploaded { key, url } => {
                if state.draft.images.cover().map(|c| c.key) != Some(key) {
                    tracing::debug!(%key, "Ignoring completion for a replaced cover");
                    return SmallVec::new();
                }
                let previous = state.draft.images.complete_cover_upload(key, url);
                tracing::info!("Cover image uploaded");
                state
                    .notices
                    .push(Notice::success("Cover image uploaded successfully", env.clock().now()));

                // The old image goes only once the new one is confirmed
                match previous {
                    Some(old) => smallvec![delete_previous_cover(env, old)],
                    None => SmallVec::new(),
                }
            },

            AuthoringAction::CoverUploadFailed { key, error } => {
                tracing::warn!(%error, "Cover upload failed");
                state.draft.images.fail_cover_upload(key);
                state.notices.push(Notice::error(COVER_UPLOAD_FAILED, env.clock().now()));
                SmallVec::new()
            },

            AuthoringAction::PreviousCoverDeleted { url } => {
                tracing::debug!(%url, "Replaced cover removed");
                SmallVec::new()
            },

            AuthoringAction::PreviousCoverDeleteFailed { url, error } => {
                tracing::warn!(%url, %error, "Replaced cover left in storage");
                SmallVec::new()
            },

            AuthoringAction::DeleteCover => delete_cover(state, env),

            AuthoringAction::CoverDeleted { url } => {
                state.busy.deleting_cover = false;
                if !state.draft.images.remove_cover(&url) {
                    tracing::debug!(%url, "Deleted cover was no longer current");
                }
                state
                    .notices
                    .push(Notice::success("Cover image deleted successfully", env.clock().now()));
                SmallVec::new()
            },

            AuthoringAction::CoverDeleteFailed { error } => {
                state.busy.deleting_cover = false;
                tracing::warn!(%error, "Cover delete failed");
                state.notices.push(Notice::error(COVER_DELETE_FAILED, env.clock().now()));
                SmallVec::new()
            },

            // ========== Gallery ==========
            AuthoringAction::UploadGalleryImages { files } => upload_gallery(state, env, files),

            AuthoringAction::GalleryImageUploaded { batch, key, url } => {
                if !state.draft.images.complete_gallery_upload(key, url) {
                    tracing::debug!(%key, "Gallery completion for unknown attachment");
                }
                settle_batch(state, env, batch, true);
                SmallVec::new()
            },

            AuthoringAction::GalleryImageUploadFailed { batch, key, error } => {
                tracing::warn!(%key, %error, "Gallery upload failed");
                state.draft.images.fail_gallery_upload(key);
                settle_batch(state, env, batch, false);
                SmallVec::new()
            },

            AuthoringAction::DeleteGalleryImage { index } => delete_gallery_image(state, env, index),

            AuthoringAction::GalleryImageDeleted { key } => {
                state.busy.deleting_gallery.remove(&key);
                state.draft.images.remove_gallery(key);
                state
                    .notices
                    .push(Notice::success("Gallery image deleted successfully", env.clock().now()));
                SmallVec::new()
            },

            AuthoringAction::GalleryImageDeleteFailed { key, error } => {
                state.busy.deleting_gallery.remove(&key);
                tracing::warn!(%key, %error, "Gallery delete failed");
                state.notices.push(Notice::error(GALLERY_DELETE_FAILED, env.clock().now()));
                SmallVec::new()
            },

            // ========== Submission ==========
            AuthoringAction::Submit { status } => submit(state, env, status),

            AuthoringAction::CallerResolved { payload } => {
                if !state.is_submitting() {
                    return SmallVec::new();
                }
                smallvec![persist(state, env, *payload)]
            },

            AuthoringAction::CallerResolutionFailed { error } => {
                fail_submission(state, env, SubmissionFailure::AuthResolution(error));
                SmallVec::new()
            },

            AuthoringAction::EventPersisted { status } => {
                state.transition(SubmissionPhase::Succeeded);
                state.draft.status = status;
                let message = match status {
                    EventStatus::Draft => "Event draft saved successfully",
                    EventStatus::Published => "Event published successfully",
                };
                tracing::info!(%status, "Event saved");
                state.notices.push(Notice::success(message, env.clock().now()));
                state.navigation = Some(Route::MyEvents);
                SmallVec::new()
            },

            AuthoringAction::PersistFailed { error } => {
                fail_submission(state, env, SubmissionFailure::Persist(error));
                SmallVec::new()
            },

            // ========== Event deletion ==========
            AuthoringAction::RequestEventDelete => {
                if state.mode.event_id().is_none() {
                    tracing::warn!("Event delete requested for an unsaved event");
                    return SmallVec::new();
                }
                state.busy.confirm_event_delete = true;
                SmallVec::new()
            },

            AuthoringAction::CancelEventDelete => {
                if !state.busy.deleting_event {
                    state.busy.confirm_event_delete = false;
                }
                SmallVec::new()
            },

            AuthoringAction::ConfirmEventDelete => delete_event(state, env),

            AuthoringAction::EventDeleted => {
                state.busy.deleting_event = false;
                state.busy.confirm_event_delete = false;
                tracing::info!("Event deleted");
                state
                    .notices
                    .push(Notice::success("Event deleted successfully", env.clock().now()));
                state.navigation = Some(Route::MyEvents);
                SmallVec::new()
            },

            AuthoringAction::EventDeleteFailed { error } => {
                state.busy.deleting_event = false;
                state.busy.confirm_event_delete = false;
                tracing::warn!(%error, "Event delete failed");
                state.notices.push(Notice::error(EVENT_DELETE_FAILED, env.clock().now()));
                SmallVec::new()
            },

            AuthoringAction::DismissNotices => {
                state.notices.clear();
                SmallVec::new()
            },
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

fn load_event(state: &mut AuthoringState, env: &AuthoringEnvironment) -> Effects {
    let FormMode::Edit { event_id } = &state.mode else {
        tracing::warn!("LoadEvent outside edit mode");
        return SmallVec::new();
    };
    if state.busy.loading {
        return SmallVec::new();
    }
    state.busy.loading = true;
    tracing::info!(%event_id, "Loading event for editing");

    let fetch = env.events().fetch_event_for_editing(event_id);
    smallvec![Effect::future(async move {
        Some(match fetch.await {
            Ok(event) => AuthoringAction::EventLoaded {
                event: Box::new(event),
            },
            Err(error) => AuthoringAction::LoadFailed { error },
        })
    })]
}

fn populate_from_event(state: &mut AuthoringState, event: Event) {
    let offset = state.slots.offset();
    let slots = event
        .time_slots
        .iter()
        .map(|slot| {
            TimeSlotDraft::from_server(
                slot.id.clone(),
                slot.total_seats,
                slot.start_time,
                slot.end_time,
                offset,
            )
        })
        .collect();
    state.slots = TimeSlotEditor::with_slots(offset, slots);

    state.draft = EventDraft {
        categories: event.categories(),
        images: ImageAttachments::from_remote(event.cover_url(), event.gallery_urls()),
        description: RichText::parse(&event.description),
        title: event.title,
        location: event.location,
        price_per_seat: event.price_per_seat,
        status: event.status,
        time_slots: Vec::new(),
    };
    state.draft.sync_slots(&state.slots);
    tracing::info!(event_id = %event.id, slots = state.slots.len(), "Event loaded");
}

// ============================================================================
// Slots
// ============================================================================

fn after_slot_change(
    state: &mut AuthoringState,
    env: &AuthoringEnvironment,
    result: Result<(), SlotError>,
) -> Effects {
    match result {
        Ok(()) => state.draft.sync_slots(&state.slots),
        Err(error) => {
            tracing::warn!(%error, "Slot change rejected");
            state.notices.push(Notice::error(error.to_string(), env.clock().now()));
        },
    }
    SmallVec::new()
}

// ============================================================================
// Images
// ============================================================================

fn upload_effect<F>(env: &AuthoringEnvironment, file: ImageFile, on_result: F) -> Effect<AuthoringAction>
where
    F: FnOnce(Result<ImageUrl, CollaboratorError>) -> AuthoringAction + Send + 'static,
{
    let storage = env.images();
    Effect::future(async move { Some(on_result(upload_image(storage.as_ref(), file).await)) })
}

fn upload_cover(state: &mut AuthoringState, env: &AuthoringEnvironment, file: ImageFile) -> Effects {
    if state.busy.deleting_cover {
        tracing::debug!(file = %file.file_name, "Cover upload refused while a delete is in flight");
        state.notices.push(Notice::error(COVER_BUSY, env.clock().now()));
        return SmallVec::new();
    }
    let key = match state.draft.images.begin_cover_upload(&file) {
        Ok(key) => key,
        Err(error) => {
            tracing::warn!(file = %file.file_name, %error, "Cover image rejected");
            state.notices.push(Notice::error(error.to_string(), env.clock().now()));
            return SmallVec::new();
        },
    };
    tracing::info!(file = %file.file_name, size = file.bytes.len(), "Uploading cover image");

    smallvec![upload_effect(env, file, move |result| match result {
        Ok(url) => AuthoringAction::CoverUploaded { key, url },
        Err(error) => AuthoringAction::CoverUploadFailed { key, error },
    })]
}

fn delete_previous_cover(env: &AuthoringEnvironment, url: ImageUrl) -> Effect<AuthoringAction> {
    let delete = env.images().delete_image(&url);
    Effect::future(async move {
        Some(match delete.await {
            Ok(()) => AuthoringAction::PreviousCoverDeleted { url },
            Err(error) => AuthoringAction::PreviousCoverDeleteFailed { url, error },
        })
    })
}

fn delete_cover(state: &mut AuthoringState, env: &AuthoringEnvironment) -> Effects {
    if state.busy.deleting_cover {
        return SmallVec::new();
    }
    let url = match state.draft.images.cover_delete_target() {
        Ok(url) => url,
        Err(error) => {
            state.notices.push(Notice::error(error.to_string(), env.clock().now()));
            return SmallVec::new();
        },
    };
    state.busy.deleting_cover = true;

    let delete = env.images().delete_image(&url);
    smallvec![Effect::future(async move {
        Some(match delete.await {
            Ok(()) => AuthoringAction::CoverDeleted { url },
            Err(error) => AuthoringAction::CoverDeleteFailed { error },
        })
    })]
}

fn upload_gallery(
    state: &mut AuthoringState,
    env: &AuthoringEnvironment,
    files: Vec<ImageFile>,
) -> Effects {
    let batch = state.next_batch_id();
    let mut uploads = Vec::with_capacity(files.len());

    for file in files {
        match state.draft.images.begin_gallery_upload(&file) {
            Ok(key) => {
                uploads.push(upload_effect(env, file, move |result| match result {
                    Ok(url) => AuthoringAction::GalleryImageUploaded { batch, key, url },
                    Err(error) => AuthoringAction::GalleryImageUploadFailed { batch, key, error },
                }));
            },
            Err(error) => {
                tracing::warn!(file = %file.file_name, %error, "Gallery image rejected");
                state.notices.push(Notice::error(error.to_string(), env.clock().now()));
            },
        }
    }

    if uploads.is_empty() {
        return SmallVec::new();
    }
    tracing::info!(count = uploads.len(), "Uploading gallery images");
    state.batches.insert(
        batch,
        GalleryBatch {
            pending: uploads.len(),
            ..GalleryBatch::default()
        },
    );
    smallvec![Effect::merge(uploads)]
}

fn settle_batch(state: &mut AuthoringState, env: &AuthoringEnvironment, batch: BatchId, uploaded: bool) {
    let Some(progress) = state.batches.get_mut(&batch) else {
        return;
    };
    if uploaded {
        progress.uploaded += 1;
    } else {
        progress.failed += 1;
    }
    progress.pending = progress.pending.saturating_sub(1);
    if progress.pending > 0 {
        return;
    }

    let done = *progress;
    state.batches.remove(&batch);
    let now = env.clock().now();
    if done.uploaded > 0 {
        let plural = if done.uploaded > 1 { "s" } else { "" };
        state.notices.push(Notice::success(
            format!("{} image{plural} uploaded successfully", done.uploaded),
            now,
        ));
    }
    if done.failed > 0 {
        state.notices.push(Notice::error(GALLERY_UPLOAD_FAILED, now));
    }
}

fn delete_gallery_image(state: &mut AuthoringState, env: &AuthoringEnvironment, index: usize) -> Effects {
    let (key, url) = match state.draft.images.gallery_delete_target(index) {
        Ok(target) => target,
        Err(error) => {
            state.notices.push(Notice::error(error.to_string(), env.clock().now()));
            return SmallVec::new();
        },
    };
    if !state.busy.deleting_gallery.insert(key) {
        return SmallVec::new();
    }

    let delete = env.images().delete_image(&url);
    smallvec![Effect::future(async move {
        Some(match delete.await {
            Ok(()) => AuthoringAction::GalleryImageDeleted { key },
            Err(error) => AuthoringAction::GalleryImageDeleteFailed { key, error },
        })
    })]
}

// ============================================================================
// Submission
// ============================================================================

fn submit(state: &mut AuthoringState, env: &AuthoringEnvironment, status: EventStatus) -> Effects {
    if matches!(state.phase, SubmissionPhase::Submitting | SubmissionPhase::Succeeded) {
        tracing::debug!(phase = %state.phase, "Submit ignored");
        return SmallVec::new();
    }

    state.transition(SubmissionPhase::Validating);
    state.draft.sync_slots(&state.slots);
    if let Err(failure) = ensure_valid(&state.draft, state.slots.slots()) {
        tracing::warn!(violations = failure.violations.len(), "Submission rejected by validation");
        state.transition(SubmissionPhase::Failed);
        state.notices.push(Notice::validation(&failure, env.clock().now()));
        state.last_failure = Some(SubmissionFailure::Validation(failure));
        state.transition(SubmissionPhase::Idle);
        return SmallVec::new();
    }

    state.transition(SubmissionPhase::Submitting);
    state.last_failure = None;
    tracing::info!(%status, "Submitting event");

    let payload = EventPayload::from_draft(&state.draft, status);
    let resolve = env.auth().current_caller();
    smallvec![Effect::future(async move {
        Some(match resolve.await {
            Ok(caller) => AuthoringAction::CallerResolved {
                payload: Box::new(payload.stamped(&caller)),
            },
            Err(error) => AuthoringAction::CallerResolutionFailed { error },
        })
    })]
}

fn persist(state: &AuthoringState, env: &AuthoringEnvironment, payload: EventPayload) -> Effect<AuthoringAction> {
    let status = payload.status;
    let call = match &state.mode {
        FormMode::Create => env.events().create_event(payload),
        FormMode::Edit { event_id } => env.events().update_event(event_id, payload),
    };
    Effect::future(async move {
        Some(match call.await {
            Ok(()) => AuthoringAction::EventPersisted { status },
            Err(error) => AuthoringAction::PersistFailed { error },
        })
    })
}

fn fail_submission(state: &mut AuthoringState, env: &AuthoringEnvironment, failure: SubmissionFailure) {
    if !state.is_submitting() {
        return;
    }
    state.transition(SubmissionPhase::Failed);
    match &failure {
        SubmissionFailure::AuthResolution(error) => {
            tracing::warn!(%error, "Could not resolve caller for submission");
        },
        SubmissionFailure::Persist(error) => tracing::warn!(%error, "Event save failed"),
        SubmissionFailure::Validation(_) => {},
    }
    state.notices.push(Notice::error(SAVE_FAILED, env.clock().now()));
    state.last_failure = Some(failure);
    state.transition(SubmissionPhase::Idle);
}

// ============================================================================
// Event deletion
// ============================================================================

fn delete_event(state: &mut AuthoringState, env: &AuthoringEnvironment) -> Effects {
    let Some(event_id) = state.mode.event_id() else {
        return SmallVec::new();
    };
    if !state.busy.confirm_event_delete || state.busy.deleting_event {
        tracing::debug!("Event delete needs an open confirmation");
        return SmallVec::new();
    }
    state.busy.deleting_event = true;
    tracing::info!(%event_id, "Deleting event");

    let delete = env.events().delete_event(event_id);
    smallvec![Effect::future(async move {
        Some(match delete.await {
            Ok(()) => AuthoringAction::EventDeleted,
            Err(error) => AuthoringAction::EventDeleteFailed { error },
        })
    })]
}

