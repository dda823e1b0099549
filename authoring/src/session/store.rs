//! Store facade for the authoring form.

use crate::error::AuthoringError;
use crate::session::{
    AuthoringAction, AuthoringEnvironment, AuthoringReducer, AuthoringSession, AuthoringState,
};
use chrono::FixedOffset;
use ecoevents_runtime::{EffectHandle, Store};
use std::time::Duration;

type AuthoringStore = Store<AuthoringState, AuthoringAction, AuthoringEnvironment, AuthoringReducer>;

/// A running authoring form
///
/// Wraps the runtime [`Store`]: actions are applied one at a time and
/// collaborator calls run as effects in the background.
#[derive(Clone)]
pub struct AuthoringForm {
    store: AuthoringStore,
}

impl AuthoringForm {
    /// Open the form for an admitted session
    ///
    /// In edit mode the event is fetched before this returns; a failed fetch
    /// leaves an empty form with an error notice.
    ///
    /// # Errors
    ///
    /// Returns [`AuthoringError::Store`] if the load cannot be dispatched.
    pub async fn open(
        session: &AuthoringSession,
        env: AuthoringEnvironment,
        offset: FixedOffset,
    ) -> Result<Self, AuthoringError> {
        let state = AuthoringState::new(session.mode().clone(), offset);
        let editing = session.mode().event_id().is_some();
        let form = Self {
            store: Store::new(state, AuthoringReducer::new(), env),
        };
        tracing::info!(user_id = %session.caller().id, editing, "Authoring form opened");

        if editing {
            form.store.send(AuthoringAction::LoadEvent).await?.wait().await;
        }
        Ok(form)
    }

    /// Dispatch an action without waiting for its effects
    ///
    /// # Errors
    ///
    /// Returns [`AuthoringError::Store`] once the form is shutting down.
    pub async fn send(&self, action: AuthoringAction) -> Result<EffectHandle, AuthoringError> {
        Ok(self.store.send(action).await?)
    }

    /// Dispatch an action and wait until it and every follow-up has settled
    ///
    /// # Errors
    ///
    /// Returns [`AuthoringError::Store`] on shutdown or when `timeout` elapses.
    pub async fn send_and_settle(
        &self,
        action: AuthoringAction,
        timeout: Duration,
    ) -> Result<(), AuthoringError> {
        let mut handle = self.store.send(action).await?;
        handle.wait_with_timeout(timeout).await?;
        Ok(())
    }

    /// Read state through a closure
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&AuthoringState) -> T,
    {
        self.store.state(f).await
    }

    /// Copy of the whole state
    pub async fn snapshot(&self) -> AuthoringState {
        self.store.state(AuthoringState::clone).await
    }

    /// Stop accepting actions and wait for running uploads and saves
    ///
    /// # Errors
    ///
    /// Returns [`AuthoringError::Store`] if effects outlive `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), AuthoringError> {
        Ok(self.store.shutdown(timeout).await?)
    }
}
