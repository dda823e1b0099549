//! # EcoEvents Authoring
//!
//! Client-side authoring of marketplace events: an organizer fills in a
//! draft, schedules time slots, attaches a cover and gallery, and submits it
//! for saving or publication.
//!
//! ## Modules
//!
//! - [`form`]: draft fields and `set_field`
//! - [`slots`]: time-slot editor and its wire format
//! - [`images`]: cover and gallery attachments with optimistic previews
//! - [`validation`]: the submission rules
//! - [`session`]: reducer, state machine and store facade tying it together
//! - [`api`], [`http`], [`mocks`]: collaborator traits and implementations
//!
//! ## Example
//!
//! ```ignore
//! use ecoevents_authoring::{session::*, types::EventStatus};
//!
//! let session = AuthoringSession::open(Some(identity), FormMode::Create)?;
//! let form = AuthoringForm::open(&session, env, config.editor.offset()).await?;
//!
//! form.send(AuthoringAction::SetField { field: DraftField::Title(title) }).await?;
//! form.send_and_settle(AuthoringAction::Submit { status: EventStatus::Published }, timeout).await?;
//! ```

pub mod api;
pub mod booking;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod images;
pub mod mocks;
pub mod rich_text;
pub mod session;
pub mod slots;
pub mod types;
pub mod validation;

pub use config::AuthoringConfig;
pub use error::{AuthoringError, Result};
pub use form::{filter_locations, DraftField, EventDraft};
pub use session::{AuthoringAction, AuthoringForm, AuthoringSession, AuthoringState};
