//! Tests for the authoring session.

#![allow(clippy::unwrap_used, clippy::panic, clippy::float_cmp)] // Test code

use super::*;
use crate::api::{Event, ServerTimeSlot};
use crate::form::DraftField;
use crate::images::{ImageAttachments, ImageFile, ImageUrl, UploadState};
use crate::mocks::{Call, CallLog, InMemoryEventApi, InMemoryImageStorage, StaticAuthProvider};
use crate::rich_text::RichText;
use crate::types::{CallerIdentity, Category, EventId, EventStatus, SlotId, UserId};
use crate::validation::{validate, ValidationViolation};
use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use ecoevents_testing::{assertions, test_clock, ReducerTest};
use std::sync::Arc;
use std::time::Duration;

const SETTLE: Duration = Duration::from_secs(5);

struct Harness {
    log: CallLog,
    events: InMemoryEventApi,
    images: InMemoryImageStorage,
    auth: StaticAuthProvider,
}

impl Harness {
    fn new() -> Self {
        Self::configured(|events| events, |images| images)
    }

    fn configured(
        events: impl FnOnce(InMemoryEventApi) -> InMemoryEventApi,
        images: impl FnOnce(InMemoryImageStorage) -> InMemoryImageStorage,
    ) -> Self {
        let log = CallLog::new();
        Self {
            events: events(InMemoryEventApi::new(log.clone())),
            images: images(InMemoryImageStorage::new(log.clone())),
            auth: StaticAuthProvider::new(CallerIdentity::coach("coach-1", "Marta"), log.clone()),
            log,
        }
    }

    fn editing_stored_event(images: impl FnOnce(InMemoryImageStorage) -> InMemoryImageStorage) -> Self {
        Self::configured(|events| events.with_event(stored_event()), images)
    }

    fn env(&self) -> AuthoringEnvironment {
        AuthoringEnvironment::new(
            Arc::new(test_clock()),
            Arc::new(self.auth.clone()),
            Arc::new(self.events.clone()),
            Arc::new(self.images.clone()),
        )
    }

    async fn open(&self, mode: FormMode) -> AuthoringForm {
        let session =
            AuthoringSession::open(Some(CallerIdentity::coach("coach-1", "Marta")), mode).unwrap();
        AuthoringForm::open(&session, self.env(), utc()).await.unwrap()
    }
}

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn tomorrow() -> NaiveDate {
    // test_clock() is 2025-06-01
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn png(name: &str) -> ImageFile {
    ImageFile::new(name, "image/png", vec![7_u8; 256])
}

fn description_of(len: usize) -> RichText {
    RichText::paragraphs(["Join us on the shore. ".repeat(10).chars().take(len).collect::<String>()])
}

async fn settle(form: &AuthoringForm, action: AuthoringAction) {
    form.send_and_settle(action, SETTLE).await.unwrap();
}

/// Beach cleanup draft that satisfies every rule
async fn fill_valid_draft(form: &AuthoringForm, price: f64) {
    for field in [
        DraftField::Title("Beach Cleanup Volunteer Day!!".into()),
        DraftField::Description(description_of(120)),
        DraftField::Location("Lisbon".into()),
        DraftField::Categories(vec![Category::BeachCleanup]),
        DraftField::PricePerSeat(price),
    ] {
        settle(form, AuthoringAction::SetField { field }).await;
    }
    settle(form, AuthoringAction::SelectDate { date: Some(tomorrow()) }).await;
    settle(form, AuthoringAction::AddSlot { seats: 20, start: at(10, 0), end: at(12, 0) }).await;
    settle(form, AuthoringAction::UploadGalleryImages { files: vec![png("shore.png")] }).await;
    settle(form, AuthoringAction::UploadCover { file: png("cover.png") }).await;
}

fn old_cover() -> ImageUrl {
    ImageUrl::new("https://cdn.test/events/old-cover.png")
}

/// Create-mode state holding an uploaded cover and one uploaded gallery image
fn state_with_images() -> AuthoringState {
    let mut state = AuthoringState::create(utc());
    state.draft.images = ImageAttachments::from_remote(
        Some(old_cover()),
        vec![ImageUrl::new("https://cdn.test/events/g1.png")],
    );
    state
}

fn stored_event() -> Event {
    Event {
        id: EventId::new("evt_9"),
        title: "Mangrove planting weekend".into(),
        description: description_of(150).serialize(),
        location: "Setúbal".into(),
        event_types: vec!["REFORESTATION".into()],
        price_per_seat: 12.5,
        status: EventStatus::Published,
        cover_image: Some("https://cdn.test/events/old-cover.png".into()),
        gallery_images: Some(vec![ImageUrl::new("https://cdn.test/events/g1.png")]),
        coach_id: Some(UserId::new("coach-1")),
        time_slots: vec![ServerTimeSlot {
            id: SlotId::new("slot_a"),
            event_id: Some(EventId::new("evt_9")),
            start_time: Utc.with_ymd_and_hms(2025, 6, 7, 8, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 6, 7, 11, 0, 0).unwrap(),
            total_seats: 15,
            available_seats: 15,
            is_available: true,
        }],
        timezone: Some("Europe/Lisbon".into()),
    }
}

// ============================================================================
// Reducer
// ============================================================================

#[test]
fn test_add_slot_syncs_wire_list() {
    let harness = Harness::new();
    ReducerTest::new(AuthoringReducer::new())
        .with_env(harness.env())
        .given_state(AuthoringState::create(utc()))
        .given_action(AuthoringAction::SelectDate { date: Some(tomorrow()) })
        .when_action(AuthoringAction::AddSlot { seats: 20, start: at(10, 0), end: at(12, 0) })
        .then_state(|state| {
            assert_eq!(state.slots.len(), 1);
            assert!(!state.slots.is_dialog_open());
            assert_eq!(state.draft.time_slots.len(), 1);
            assert_eq!(state.draft.time_slots[0].start_time, "2025-06-02T10:00:00.000Z");
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn test_out_of_range_slot_edit_raises_notice() {
    let harness = Harness::new();
    ReducerTest::new(AuthoringReducer::new())
        .with_env(harness.env())
        .given_state(AuthoringState::create(utc()))
        .when_action(AuthoringAction::EditSlot { index: 4, seats: 1, start: at(9, 0), end: at(10, 0) })
        .then_state(|state| {
            let notice = state.last_notice().unwrap();
            assert_eq!(notice.level, NoticeLevel::Error);
            assert_eq!(notice.message, "Time slot index 4 is out of range (have 0)");
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn test_slot_delete_waits_for_confirmation() {
    let harness = Harness::new();
    ReducerTest::new(AuthoringReducer::new())
        .with_env(harness.env())
        .given_state(AuthoringState::create(utc()))
        .given_action(AuthoringAction::SelectDate { date: Some(tomorrow()) })
        .given_action(AuthoringAction::AddSlot { seats: 20, start: at(10, 0), end: at(12, 0) })
        .when_action(AuthoringAction::RequestSlotDelete { index: 0 })
        .then_state(|state| {
            assert_eq!(state.slots.pending_delete(), Some(0));
            assert_eq!(state.slots.len(), 1);
        })
        .run();

    ReducerTest::new(AuthoringReducer::new())
        .with_env(harness.env())
        .given_state(AuthoringState::create(utc()))
        .given_action(AuthoringAction::SelectDate { date: Some(tomorrow()) })
        .given_action(AuthoringAction::AddSlot { seats: 20, start: at(10, 0), end: at(12, 0) })
        .given_action(AuthoringAction::RequestSlotDelete { index: 0 })
        .when_action(AuthoringAction::ConfirmSlotDelete)
        .then_state(|state| {
            assert!(state.slots.is_empty());
            assert!(state.draft.time_slots.is_empty());
        })
        .run();
}

#[test]
fn test_invalid_submit_never_reaches_network() {
    let harness = Harness::new();
    ReducerTest::new(AuthoringReducer::new())
        .with_env(harness.env())
        .given_state(AuthoringState::create(utc()))
        .when_action(AuthoringAction::Submit { status: EventStatus::Published })
        .then_state(|state| {
            assert_eq!(state.phase, SubmissionPhase::Idle);
            let Some(SubmissionFailure::Validation(failure)) = &state.last_failure else {
                panic!("expected a validation failure");
            };
            assert_eq!(failure.violations.len(), 8);
            let notice = state.last_notice().unwrap();
            assert_eq!(notice.title, "Validation Error");
            assert!(notice.message.starts_with("Title must be at least 20 characters long\n"));
        })
        .then_effects(assertions::assert_no_effects)
        .run();
    assert!(harness.log.calls().is_empty());
}

#[test]
fn test_submit_is_ignored_while_submitting() {
    let harness = Harness::new();
    let mut state = AuthoringState::create(utc());
    state.phase = SubmissionPhase::Submitting;

    ReducerTest::new(AuthoringReducer::new())
        .with_env(harness.env())
        .given_state(state)
        .when_action(AuthoringAction::Submit { status: EventStatus::Draft })
        .then_state(|state| assert_eq!(state.phase, SubmissionPhase::Submitting))
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn test_rejected_cover_file_is_not_uploaded() {
    let harness = Harness::new();
    ReducerTest::new(AuthoringReducer::new())
        .with_env(harness.env())
        .given_state(AuthoringState::create(utc()))
        .when_action(AuthoringAction::UploadCover {
            file: ImageFile::new("anim.gif", "image/gif", vec![1, 2, 3]),
        })
        .then_state(|state| {
            assert!(state.draft.images.cover().is_none());
            assert_eq!(
                state.last_notice().unwrap().message,
                "Invalid file type. Please upload a JPEG, PNG, or WebP image."
            );
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn test_gallery_batch_uploads_in_parallel() {
    let harness = Harness::new();
    ReducerTest::new(AuthoringReducer::new())
        .with_env(harness.env())
        .given_state(AuthoringState::create(utc()))
        .when_action(AuthoringAction::UploadGalleryImages {
            files: vec![
                png("a.png"),
                ImageFile::new("huge.jpg", "image/jpeg", vec![0; crate::images::MAX_IMAGE_BYTES + 1]),
                png("b.png"),
            ],
        })
        .then_state(|state| {
            assert_eq!(state.draft.images.gallery().len(), 2);
            assert!(state.is_uploading());
            assert!(!state.can_close());
            assert_eq!(
                state.last_notice().unwrap().message,
                "File is too large. Maximum size is 5MB."
            );
        })
        .then_effects(|effects| {
            assertions::assert_effects_count(effects, 1);
            assertions::assert_future_count(effects, 2);
        })
        .run();
}

#[test]
fn test_cover_upload_waits_for_running_delete() {
    let harness = Harness::new();
    ReducerTest::new(AuthoringReducer::new())
        .with_env(harness.env())
        .given_state(state_with_images())
        .given_action(AuthoringAction::DeleteCover)
        .when_action(AuthoringAction::UploadCover { file: png("new-cover.png") })
        .then_state(|state| {
            assert!(state.busy.deleting_cover);
            assert!(!state.draft.images.is_cover_uploading());
            assert_eq!(state.draft.images.cover_url(), Some(&old_cover()));
            assert_eq!(
                state.last_notice().unwrap().message,
                "Please wait until the cover image has been deleted."
            );
        })
        .then_effects(assertions::assert_no_effects)
        .run();
    assert_eq!(harness.log.count(|c| matches!(c, Call::RequestUpload { .. })), 0);
}

#[test]
fn test_deleted_cover_never_comes_back() {
    let harness = Harness::new();
    ReducerTest::new(AuthoringReducer::new())
        .with_env(harness.env())
        .given_state(state_with_images())
        .given_action(AuthoringAction::DeleteCover)
        .given_action(AuthoringAction::UploadCover { file: png("new-cover.png") })
        .given_action(AuthoringAction::CoverDeleted { url: old_cover() })
        .when_action(AuthoringAction::UploadCover { file: png("new-cover.png") })
        .then_state(|state| {
            assert!(!state.busy.deleting_cover);
            assert!(state.draft.images.is_cover_uploading());
            // Nothing durable until the new upload lands
            assert_eq!(state.draft.images.cover_url(), None);
        })
        .then_effects(assertions::assert_has_future_effect)
        .run();
}

#[test]
fn test_second_cover_delete_is_ignored_while_first_runs() {
    let harness = Harness::new();
    ReducerTest::new(AuthoringReducer::new())
        .with_env(harness.env())
        .given_state(state_with_images())
        .given_action(AuthoringAction::DeleteCover)
        .when_action(AuthoringAction::DeleteCover)
        .then_state(|state| {
            assert!(state.busy.deleting_cover);
            assert_eq!(state.draft.images.cover_url(), Some(&old_cover()));
        })
        .then_effects(assertions::assert_no_effects)
        .run();
    assert_eq!(harness.log.count(|c| matches!(c, Call::DeleteImage { .. })), 1);
}

#[test]
fn test_second_gallery_delete_is_ignored_while_first_runs() {
    let harness = Harness::new();
    ReducerTest::new(AuthoringReducer::new())
        .with_env(harness.env())
        .given_state(state_with_images())
        .given_action(AuthoringAction::DeleteGalleryImage { index: 0 })
        .when_action(AuthoringAction::DeleteGalleryImage { index: 0 })
        .then_state(|state| {
            assert_eq!(state.busy.deleting_gallery.len(), 1);
            assert_eq!(state.draft.images.gallery().len(), 1);
            assert!(!state.can_close());
        })
        .then_effects(assertions::assert_no_effects)
        .run();
    assert_eq!(harness.log.count(|c| matches!(c, Call::DeleteImage { .. })), 1);
}

#[test]
fn test_event_delete_needs_confirmation() {
    let harness = Harness::new();
    ReducerTest::new(AuthoringReducer::new())
        .with_env(harness.env())
        .given_state(AuthoringState::edit(EventId::new("evt_9"), utc()))
        .when_action(AuthoringAction::ConfirmEventDelete)
        .then_state(|state| assert!(!state.busy.deleting_event))
        .then_effects(assertions::assert_no_effects)
        .run();

    ReducerTest::new(AuthoringReducer::new())
        .with_env(harness.env())
        .given_state(AuthoringState::edit(EventId::new("evt_9"), utc()))
        .given_action(AuthoringAction::RequestEventDelete)
        .when_action(AuthoringAction::ConfirmEventDelete)
        .then_state(|state| assert!(state.busy.deleting_event))
        .then_effects(assertions::assert_has_future_effect)
        .run();
}

// ============================================================================
// Store scenarios
// ============================================================================

#[tokio::test]
async fn test_publish_beach_cleanup_end_to_end() {
    let harness = Harness::new();
    let form = harness.open(FormMode::Create).await;
    fill_valid_draft(&form, 15.0).await;

    let violations = form.state(|s| validate(&s.draft, s.slots.slots())).await;
    assert!(violations.is_empty(), "{violations:?}");

    settle(&form, AuthoringAction::Submit { status: EventStatus::Published }).await;

    let created = harness.events.created();
    assert_eq!(created.len(), 1);
    let payload = &created[0];
    assert_eq!(payload.status, EventStatus::Published);
    assert_eq!(payload.coach_id, Some(UserId::new("coach-1")));
    assert_eq!(payload.coach_name.as_deref(), Some("Marta"));
    assert_eq!(payload.title, "Beach Cleanup Volunteer Day!!");
    assert_eq!(payload.categories, vec![Category::BeachCleanup]);
    assert_eq!(payload.time_slots.len(), 1);
    assert_eq!(payload.time_slots[0].seats, 20);
    assert_eq!(payload.gallery_images.len(), 1);
    assert!(payload.cover_image.is_some());
    assert_eq!(harness.log.count(|c| matches!(c, Call::CreateEvent)), 1);

    let state = form.snapshot().await;
    assert_eq!(state.phase, SubmissionPhase::Succeeded);
    assert_eq!(state.navigation, Some(Route::MyEvents));
    assert_eq!(state.last_notice().unwrap().message, "Event published successfully");
}

#[tokio::test]
async fn test_zero_price_blocks_create() {
    let harness = Harness::new();
    let form = harness.open(FormMode::Create).await;
    fill_valid_draft(&form, 0.0).await;

    let violations = form.state(|s| validate(&s.draft, s.slots.slots())).await;
    assert_eq!(violations, vec![ValidationViolation::NonPositivePrice]);

    settle(&form, AuthoringAction::Submit { status: EventStatus::Published }).await;

    assert!(harness.events.created().is_empty());
    assert_eq!(harness.log.count(|c| matches!(c, Call::CreateEvent | Call::CurrentCaller)), 0);
    let state = form.snapshot().await;
    assert_eq!(state.phase, SubmissionPhase::Idle);
    assert_eq!(state.last_notice().unwrap().message, "Price per seat must be greater than 0");
}

#[tokio::test]
async fn test_draft_save_uses_same_rules() {
    let harness = Harness::new();
    let form = harness.open(FormMode::Create).await;
    fill_valid_draft(&form, 15.0).await;

    settle(&form, AuthoringAction::Submit { status: EventStatus::Draft }).await;

    assert_eq!(harness.events.created()[0].status, EventStatus::Draft);
    let state = form.snapshot().await;
    assert_eq!(state.last_notice().unwrap().message, "Event draft saved successfully");
}

#[tokio::test]
async fn test_edit_mode_loads_and_updates_in_place() {
    let harness = Harness::editing_stored_event(|images| images);
    let form = harness.open(FormMode::Edit { event_id: EventId::new("evt_9") }).await;

    let state = form.snapshot().await;
    assert!(!state.busy.loading);
    assert_eq!(state.draft.title, "Mangrove planting weekend");
    assert_eq!(state.draft.categories, vec![Category::Reforestation]);
    assert_eq!(state.slots.slots()[0].id, Some(SlotId::new("slot_a")));
    assert_eq!(state.slots.slots()[0].seats, 15);
    assert_eq!(state.slots.slots()[0].date, NaiveDate::from_ymd_opt(2025, 6, 7).unwrap());

    settle(&form, AuthoringAction::EditSlot { index: 0, seats: 18, start: at(9, 0), end: at(12, 0) }).await;
    settle(&form, AuthoringAction::SetField { field: DraftField::Title("Mangrove planting weekend, day two".into()) }).await;
    settle(&form, AuthoringAction::Submit { status: EventStatus::Published }).await;

    let updated = harness.events.updated();
    assert_eq!(updated.len(), 1);
    let (id, payload) = &updated[0];
    assert_eq!(id, &EventId::new("evt_9"));
    assert_eq!(payload.time_slots[0].id, Some(SlotId::new("slot_a")));
    assert_eq!(payload.time_slots[0].seats, 18);
    assert_eq!(payload.time_slots[0].start_time, "2025-06-07T09:00:00.000Z");
    assert!(harness.events.created().is_empty());
}

#[tokio::test]
async fn test_failed_load_leaves_empty_form() {
    let harness = Harness::new();
    let form = harness.open(FormMode::Edit { event_id: EventId::new("missing") }).await;

    let state = form.snapshot().await;
    assert!(!state.busy.loading);
    assert!(state.draft.title.is_empty());
    assert_eq!(
        state.last_notice().unwrap().message,
        "Failed to load event data. Please try again."
    );
}

#[tokio::test]
async fn test_cover_replacement_deletes_old_after_new_upload() {
    let harness = Harness::editing_stored_event(|images| images);
    let form = harness.open(FormMode::Edit { event_id: EventId::new("evt_9") }).await;

    settle(&form, AuthoringAction::UploadCover { file: png("new-cover.png") }).await;

    let old = ImageUrl::new("https://cdn.test/events/old-cover.png");
    let new = ImageUrl::new("https://cdn.test/events/1-new-cover.png");
    let put = harness.log.position(&Call::PutBytes { url: new.clone() }).unwrap();
    let delete = harness.log.position(&Call::DeleteImage { url: old }).unwrap();
    assert!(put < delete, "old cover deleted before the new one was stored");

    let state = form.snapshot().await;
    assert_eq!(state.draft.images.cover_url(), Some(&new));
    assert_eq!(state.last_notice().unwrap().message, "Cover image uploaded successfully");
}

#[tokio::test]
async fn test_failed_cover_upload_keeps_old_cover() {
    let harness = Harness::editing_stored_event(|images| images.failing_upload("new-cover.png"));
    let form = harness.open(FormMode::Edit { event_id: EventId::new("evt_9") }).await;

    settle(&form, AuthoringAction::UploadCover { file: png("new-cover.png") }).await;

    assert_eq!(harness.log.count(|c| matches!(c, Call::DeleteImage { .. })), 0);
    let state = form.snapshot().await;
    assert_eq!(
        state.draft.images.cover_url(),
        Some(&ImageUrl::new("https://cdn.test/events/old-cover.png"))
    );
    assert!(!state.draft.images.is_cover_uploading());
    assert_eq!(
        state.last_notice().unwrap().message,
        "Failed to upload cover image. Please try again."
    );
}

#[tokio::test]
async fn test_gallery_failure_rolls_back_only_failed_file() {
    let harness = Harness::configured(|events| events, |images| images.failing_upload("b.png"));
    let form = harness.open(FormMode::Create).await;

    settle(
        &form,
        AuthoringAction::UploadGalleryImages { files: vec![png("a.png"), png("b.png"), png("c.png")] },
    )
    .await;

    let state = form.snapshot().await;
    assert_eq!(state.draft.images.gallery().len(), 2);
    assert_eq!(state.draft.images.gallery_urls().len(), 2);
    assert!(state.batches.is_empty());
    let messages: Vec<_> = state.notices.iter().map(|n| n.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "2 images uploaded successfully",
            "Failed to upload gallery images. Please try again."
        ]
    );
}

#[tokio::test]
async fn test_gallery_previews_show_before_uploads_resolve() {
    let harness = Harness::configured(
        |events| events,
        |images| {
            images
                .delayed_upload("slow.png", Duration::from_millis(200))
                .delayed_upload("slower.png", Duration::from_millis(300))
        },
    );
    let form = harness.open(FormMode::Create).await;

    let mut handle = form
        .send(AuthoringAction::UploadGalleryImages { files: vec![png("slow.png"), png("slower.png")] })
        .await
        .unwrap();

    let pending = form
        .state(|s| s.draft.images.gallery().iter().filter(|a| matches!(a.state, UploadState::Pending(_))).count())
        .await;
    assert_eq!(pending, 2);
    assert!(!form.state(AuthoringState::can_close).await);

    handle.wait_with_timeout(SETTLE).await.unwrap();
    assert_eq!(form.state(|s| s.draft.images.gallery_urls().len()).await, 2);
    assert!(form.state(AuthoringState::can_close).await);
}

#[tokio::test]
async fn test_deleting_pending_gallery_image_skips_storage() {
    let harness = Harness::configured(
        |events| events,
        |images| images.delayed_upload("slow.png", Duration::from_millis(200)),
    );
    let form = harness.open(FormMode::Create).await;

    let mut upload = form
        .send(AuthoringAction::UploadGalleryImages { files: vec![png("slow.png")] })
        .await
        .unwrap();
    settle(&form, AuthoringAction::DeleteGalleryImage { index: 0 }).await;
    assert_eq!(harness.log.count(|c| matches!(c, Call::DeleteImage { .. })), 0);
    assert_eq!(
        form.state(|s| s.last_notice().map(|n| n.message.clone())).await.as_deref(),
        Some("The image is still uploading")
    );

    upload.wait_with_timeout(SETTLE).await.unwrap();
    settle(&form, AuthoringAction::DeleteGalleryImage { index: 0 }).await;
    assert_eq!(harness.log.count(|c| matches!(c, Call::DeleteImage { .. })), 1);
    let state = form.snapshot().await;
    assert!(state.draft.images.gallery().is_empty());
    assert_eq!(state.last_notice().unwrap().message, "Gallery image deleted successfully");
}

#[tokio::test]
async fn test_failed_delete_keeps_image() {
    let harness = Harness::editing_stored_event(|images| {
        images.failing_delete(ImageUrl::new("https://cdn.test/events/old-cover.png"))
    });
    let form = harness.open(FormMode::Edit { event_id: EventId::new("evt_9") }).await;

    settle(&form, AuthoringAction::DeleteCover).await;

    let state = form.snapshot().await;
    assert!(state.draft.images.cover_url().is_some());
    assert!(!state.busy.deleting_cover);
    assert_eq!(
        state.last_notice().unwrap().message,
        "Failed to delete cover image. Please try again."
    );
}

#[tokio::test]
async fn test_persist_failure_keeps_draft_for_retry() {
    let harness = Harness::configured(|events| events.failing("create"), |images| images);
    let form = harness.open(FormMode::Create).await;
    fill_valid_draft(&form, 15.0).await;

    settle(&form, AuthoringAction::Submit { status: EventStatus::Published }).await;

    let state = form.snapshot().await;
    assert_eq!(state.phase, SubmissionPhase::Idle);
    assert!(matches!(state.last_failure, Some(SubmissionFailure::Persist(_))));
    assert_eq!(state.navigation, None);
    assert_eq!(state.draft.title, "Beach Cleanup Volunteer Day!!");
    assert_eq!(state.slots.len(), 1);
    assert_eq!(
        state.last_notice().unwrap().message,
        "Failed to save event. Please try again."
    );

    settle(&form, AuthoringAction::Submit { status: EventStatus::Published }).await;
    assert_eq!(harness.log.count(|c| matches!(c, Call::CreateEvent)), 2);
}

#[tokio::test]
async fn test_signed_out_caller_aborts_submission() {
    let log = CallLog::new();
    let harness = Harness {
        auth: StaticAuthProvider::signed_out(log.clone()),
        events: InMemoryEventApi::new(log.clone()),
        images: InMemoryImageStorage::new(log.clone()),
        log,
    };
    let form = harness.open(FormMode::Create).await;
    fill_valid_draft(&form, 15.0).await;

    settle(&form, AuthoringAction::Submit { status: EventStatus::Published }).await;

    assert_eq!(harness.log.count(|c| matches!(c, Call::CreateEvent)), 0);
    let state = form.snapshot().await;
    assert!(matches!(state.last_failure, Some(SubmissionFailure::AuthResolution(_))));
    assert_eq!(state.phase, SubmissionPhase::Idle);
}

#[tokio::test]
async fn test_confirmed_event_delete_navigates_away() {
    let harness = Harness::editing_stored_event(|images| images);
    let form = harness.open(FormMode::Edit { event_id: EventId::new("evt_9") }).await;

    settle(&form, AuthoringAction::RequestEventDelete).await;
    settle(&form, AuthoringAction::ConfirmEventDelete).await;

    assert_eq!(harness.events.deleted(), vec![EventId::new("evt_9")]);
    let state = form.snapshot().await;
    assert_eq!(state.navigation, Some(Route::MyEvents));
    assert_eq!(state.last_notice().unwrap().message, "Event deleted successfully");
}

#[tokio::test]
async fn test_failed_event_delete_stays_on_page() {
    let harness = Harness::configured(
        |events| events.with_event(stored_event()).failing("delete"),
        |images| images,
    );
    let form = harness.open(FormMode::Edit { event_id: EventId::new("evt_9") }).await;

    settle(&form, AuthoringAction::RequestEventDelete).await;
    settle(&form, AuthoringAction::ConfirmEventDelete).await;

    let state = form.snapshot().await;
    assert_eq!(state.navigation, None);
    assert_eq!(state.draft.title, "Mangrove planting weekend");
    assert_eq!(
        state.last_notice().unwrap().message,
        "Failed to delete event. Please try again."
    );
}
