//! REST implementation of the event and image collaborators.

use crate::api::{
    ApiEnvelope, CollaboratorError, CollaboratorFuture, CollaboratorResult, Event, EventApi,
    EventPayload, ImageStorage, RawUploadLocation, Registration, RegistrationRequest,
    UploadLocation,
};
use crate::config::ApiConfig;
use crate::images::ImageUrl;
use crate::types::EventId;
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;

/// Backend client
///
/// Cloning is cheap; every method clones the client into its future.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.auth_token.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadRequest {
    file_name: String,
    content_type: String,
}

impl HttpBackend {
    /// Build a client from configuration
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError::Request`] if the TLS backend cannot be initialised.
    pub fn new(config: &ApiConfig) -> CollaboratorResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CollaboratorError::Request(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> CollaboratorResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| CollaboratorError::Request(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => Err(CollaboratorError::Unauthorized),
            StatusCode::NOT_FOUND => Err(CollaboratorError::NotFound),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(CollaboratorError::Status {
                    status: status.as_u16(),
                    message: body,
                })
            },
        }
    }

    async fn json<T: serde::de::DeserializeOwned>(response: Response) -> CollaboratorResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))
    }
}

impl EventApi for HttpBackend {
    fn create_event(&self, payload: EventPayload) -> CollaboratorFuture<()> {
        let request = self.authorized(self.client.post(self.url("/api/events")).json(&payload));
        Box::pin(async move {
            Self::send(request).await?;
            tracing::info!("Event created");
            Ok(())
        })
    }

    fn update_event(&self, id: &EventId, payload: EventPayload) -> CollaboratorFuture<()> {
        let request = self.authorized(
            self.client
                .put(self.url(&format!("/api/events/{id}")))
                .json(&payload),
        );
        let id = id.clone();
        Box::pin(async move {
            Self::send(request).await?;
            tracing::info!(event_id = %id, "Event updated");
            Ok(())
        })
    }

    fn delete_event(&self, id: &EventId) -> CollaboratorFuture<()> {
        let request = self.authorized(self.client.delete(self.url(&format!("/api/events/{id}"))));
        Box::pin(async move {
            Self::send(request).await?;
            Ok(())
        })
    }

    fn fetch_event_for_editing(&self, id: &EventId) -> CollaboratorFuture<Event> {
        let request =
            self.authorized(self.client.get(self.url(&format!("/api/coach/events/{id}"))));
        Box::pin(async move {
            let response = Self::send(request).await?;
            Self::json::<ApiEnvelope<Event>>(response).await?.into_data()
        })
    }

    fn register_for_event(
        &self,
        id: &EventId,
        request: RegistrationRequest,
    ) -> CollaboratorFuture<Registration> {
        let request = self.authorized(
            self.client
                .post(self.url(&format!("/api/events/{id}/register")))
                .json(&request),
        );
        Box::pin(async move {
            let response = Self::send(request).await?;
            Self::json::<ApiEnvelope<Registration>>(response).await?.into_data()
        })
    }
}

impl ImageStorage for HttpBackend {
    fn request_upload_location(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> CollaboratorFuture<UploadLocation> {
        let body = UploadRequest {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
        };
        let request = self.authorized(
            self.client
                .post(self.url("/api/upload/event-image"))
                .json(&body),
        );
        Box::pin(async move {
            let response = Self::send(request).await?;
            let envelope = Self::json::<ApiEnvelope<RawUploadLocation>>(response).await?;
            UploadLocation::try_from(envelope.data.unwrap_or_default())
        })
    }

    fn put_bytes(
        &self,
        location: &UploadLocation,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> CollaboratorFuture<()> {
        // Pre-signed: carries its own credentials in the URL
        let request = self
            .client
            .put(location.upload_url.as_str())
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        Box::pin(async move {
            Self::send(request).await?;
            Ok(())
        })
    }

    fn delete_image(&self, url: &ImageUrl) -> CollaboratorFuture<()> {
        let request = self.authorized(
            self.client
                .delete(self.url("/api/upload/event-image"))
                .query(&[("cloudFrontUrl", url.as_str())]),
        );
        Box::pin(async move {
            Self::send(request).await?;
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalised() {
        let backend = HttpBackend::new(&ApiConfig {
            base_url: "https://api.ecoevents.test/".into(),
            auth_token: Some("secret".into()),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(backend.url("/api/events"), "https://api.ecoevents.test/api/events");
        assert!(!format!("{backend:?}").contains("secret"));
    }
}
