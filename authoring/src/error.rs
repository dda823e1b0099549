//! Error type for the authoring facade.

use crate::api::CollaboratorError;
use crate::booking::BookingError;
use crate::images::ImageError;
use crate::session::AccessError;
use crate::slots::SlotError;
use crate::validation::ValidationFailure;
use ecoevents_runtime::StoreError;
use thiserror::Error;

/// Any error surfaced by the authoring client
#[derive(Debug, Error)]
pub enum AuthoringError {
    /// Caller may not open the form
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Runtime refused or timed out
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Slot editor rejected a change
    #[error(transparent)]
    Slot(#[from] SlotError),

    /// Attachment manager rejected a change
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Draft breaks submission rules
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// Collaborator call failed
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    /// Booking refused
    #[error(transparent)]
    Booking(#[from] BookingError),
}

/// Result alias for the authoring facade
pub type Result<T> = std::result::Result<T, AuthoringError>;
