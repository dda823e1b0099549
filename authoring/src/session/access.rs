//! Role gate in front of the authoring form.
//!
//! The resolved identity is passed in explicitly; nothing here reads ambient
//! session state.

use super::types::{FormMode, Route};
use crate::types::{CallerIdentity, UserRole};
use thiserror::Error;

/// Why a caller may not open the form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Nobody is signed in
    #[error("Sign in to manage events")]
    NotAuthenticated,

    /// Signed in without the organizer role
    #[error("Only organizers can manage events (role: {role:?})")]
    WrongRole {
        /// Role the caller has
        role: UserRole,
    },
}

impl AccessError {
    /// Where the host should send the caller instead
    #[must_use]
    pub const fn redirect(&self) -> Route {
        match self {
            Self::NotAuthenticated => Route::Login,
            Self::WrongRole { .. } => Route::Home,
        }
    }
}

/// Proof that an organizer opened the form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthoringSession {
    caller: CallerIdentity,
    mode: FormMode,
}

impl AuthoringSession {
    /// Admit `identity` to the form in `mode`
    ///
    /// # Errors
    ///
    /// [`AccessError::NotAuthenticated`] without an identity,
    /// [`AccessError::WrongRole`] for non-organizers.
    pub fn open(identity: Option<CallerIdentity>, mode: FormMode) -> Result<Self, AccessError> {
        let caller = identity.ok_or(AccessError::NotAuthenticated)?;
        if caller.role != UserRole::Coach {
            tracing::info!(user_id = %caller.id, role = ?caller.role, "Authoring form refused");
            return Err(AccessError::WrongRole { role: caller.role });
        }
        Ok(Self { caller, mode })
    }

    /// Admitted caller
    #[must_use]
    pub const fn caller(&self) -> &CallerIdentity {
        &self.caller
    }

    /// Create or edit
    #[must_use]
    pub const fn mode(&self) -> &FormMode {
        &self.mode
    }
}
