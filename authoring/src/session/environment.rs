//! Collaborators injected into the authoring reducer.

use crate::api::{AuthProvider, CollaboratorResult, EventApi, ImageStorage};
use crate::config::ApiConfig;
use crate::http::HttpBackend;
use ecoevents_core::environment::{Clock, SystemClock};
use std::sync::Arc;

/// Environment of the authoring reducer
#[derive(Clone)]
pub struct AuthoringEnvironment {
    clock: Arc<dyn Clock>,
    auth: Arc<dyn AuthProvider>,
    events: Arc<dyn EventApi>,
    images: Arc<dyn ImageStorage>,
}

impl AuthoringEnvironment {
    /// Assemble an environment from explicit collaborators
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        auth: Arc<dyn AuthProvider>,
        events: Arc<dyn EventApi>,
        images: Arc<dyn ImageStorage>,
    ) -> Self {
        Self {
            clock,
            auth,
            events,
            images,
        }
    }

    /// Production environment: system clock and the REST backend for events and images
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn production(config: &ApiConfig, auth: Arc<dyn AuthProvider>) -> CollaboratorResult<Self> {
        let backend = Arc::new(HttpBackend::new(config)?);
        let events: Arc<dyn EventApi> = backend.clone();
        Ok(Self::new(Arc::new(SystemClock), auth, events, backend))
    }

    /// Clock for notice timestamps
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Identity provider
    #[must_use]
    pub fn auth(&self) -> &dyn AuthProvider {
        self.auth.as_ref()
    }

    /// Event backend
    #[must_use]
    pub fn events(&self) -> &dyn EventApi {
        self.events.as_ref()
    }

    /// Image storage, shared into upload effects
    #[must_use]
    pub fn images(&self) -> Arc<dyn ImageStorage> {
        Arc::clone(&self.images)
    }
}

impl std::fmt::Debug for AuthoringEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthoringEnvironment").finish_non_exhaustive()
    }
}
