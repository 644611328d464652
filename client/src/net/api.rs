//! REST API client for the pin-sharing backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every outbound call goes through [`ApiClient::execute`], which attaches the
//! session's bearer token and watches the response status. A 401 on any call
//! clears the session and emits [`AuthEvent::Unauthorized`]; the app
//! controller observes the event and owns the redirect to `/login`.
//!
//! ERROR HANDLING
//! ==============
//! Non-success statuses map onto [`ClientError`]: 401 → `Auth`, 400/422 →
//! `Validation` carrying the backend's `detail`/`message`, anything else →
//! `Status` carrying the same text when the body had any. No call is retried.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::mpsc;

use super::transport::{ApiRequest, ApiResponse, HttpTransport, Method, MultipartField, RequestBody, ReqwestTransport};
use super::types::{Comment, NewPin, Pin, TokenResponse, User};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::state::session::SessionStore;
use crate::state::storage::TokenStorage;

/// Why the session was torn down by the HTTP layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    /// The backend answered 401.
    Unauthorized { path: String },
    /// The held token lapsed before a call could be sent.
    TokenExpired,
    /// A call that needs credentials was attempted while signed out.
    MissingToken,
}

/// Receiving end of the auth event channel, held by the app controller.
#[derive(Debug)]
pub struct AuthEvents {
    rx: mpsc::UnboundedReceiver<AuthEvent>,
}

impl AuthEvents {
    /// Take every event emitted since the last drain.
    pub fn drain(&mut self) -> Vec<AuthEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

/// How a call is credentialed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Credential {
    /// Never attach a token (credential exchange, registration).
    Anonymous,
    /// Attach when signed in, proceed anonymously otherwise.
    Optional,
    /// Refuse to send without a valid token.
    Required,
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    session: SessionStore,
    config: Arc<ClientConfig>,
    events: mpsc::UnboundedSender<AuthEvent>,
}

impl ApiClient {
    #[must_use]
    pub fn new(config: ClientConfig, transport: Arc<dyn HttpTransport>, session: SessionStore) -> (Self, AuthEvents) {
        let (events, rx) = mpsc::unbounded_channel();
        let client = Self { transport, session, config: Arc::new(config), events };
        (client, AuthEvents { rx })
    }

    /// Production wiring: reqwest transport plus a session restored from `storage`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the HTTP client cannot be built.
    pub fn connect(config: ClientConfig, storage: Arc<dyn TokenStorage>) -> Result<(Self, AuthEvents), ClientError> {
        let transport = Arc::new(ReqwestTransport::new(&config.api_url, config.timeouts)?);
        let session = SessionStore::new(storage);
        Ok(Self::new(config, transport, session))
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn emit(&self, event: AuthEvent) {
        tracing::warn!(?event, "forcing logout");
        self.session.logout();
        // The receiver lives as long as the app; a closed channel only means
        // nobody is left to redirect.
        let _ = self.events.send(event);
    }

    fn credential(&self, credential: Credential) -> Result<Option<String>, ClientError> {
        if credential == Credential::Anonymous {
            return Ok(None);
        }
        match self.session.bearer() {
            Ok(Some(token)) => Ok(Some(token)),
            Ok(None) if credential == Credential::Required => {
                self.emit(AuthEvent::MissingToken);
                Err(ClientError::Auth("sign in required".into()))
            }
            Ok(None) => Ok(None),
            Err(err) => {
                self.emit(AuthEvent::TokenExpired);
                if credential == Credential::Required {
                    Err(ClientError::Auth(err.to_string()))
                } else {
                    Ok(None)
                }
            }
        }
    }

    async fn execute(&self, request: ApiRequest, credential: Credential) -> Result<ApiResponse, ClientError> {
        let bearer = self.credential(credential)?;
        let path = request.path.clone();
        tracing::debug!(method = request.method.as_str(), %path, authed = bearer.is_some(), "api request");
        let response = self.transport.send(request.bearer(bearer)).await?;

        match response.status {
            200..=299 => Ok(response),
            401 => {
                self.emit(AuthEvent::Unauthorized { path });
                let message = backend_message(&response.body).unwrap_or_else(|| "unauthorized".into());
                Err(ClientError::Auth(message))
            }
            400 | 422 => Err(ClientError::Validation(
                backend_message(&response.body).unwrap_or_else(|| "request rejected".into()),
            )),
            status => Err(ClientError::Status { status, message: backend_message(&response.body) }),
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest, credential: Credential) -> Result<T, ClientError> {
        let response = self.execute(request, credential).await?;
        Ok(serde_json::from_str(&response.body)?)
    }

    // =========================================================================
    // SESSION LIFECYCLE
    // =========================================================================

    /// Exchange credentials for a token, store it, and load the profile.
    ///
    /// # Errors
    ///
    /// [`ClientError::Auth`] when the backend rejects the credentials or
    /// hands back an unusable token; any profile fetch failure tears the new
    /// session down and is returned as-is.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, ClientError> {
        let form = vec![("username".to_owned(), username.to_owned()), ("password".to_owned(), password.to_owned())];
        let request = ApiRequest::new(Method::Post, "/token").body(RequestBody::Form(form));
        let TokenResponse { access_token, .. } = self.fetch(request, Credential::Anonymous).await?;

        self.session
            .set_token(access_token)
            .map_err(|e| ClientError::Auth(e.to_string()))?;

        match self.current_user().await {
            Ok(user) => {
                if !self.session.set_user(user.clone()) {
                    return Err(ClientError::Auth("session expired during login".into()));
                }
                tracing::info!(username = %user.username, "logged in");
                Ok(user)
            }
            Err(err) => {
                tracing::warn!(error = %err, "profile fetch failed; clearing session");
                self.session.logout();
                Err(err)
            }
        }
    }

    /// Create an account, then log in with the same credentials.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] with the backend's message when the input
    /// is rejected; otherwise as [`ApiClient::login`].
    pub async fn register(&self, email: &str, username: &str, password: &str) -> Result<User, ClientError> {
        let body = serde_json::json!({ "email": email, "username": username, "password": password });
        let request = ApiRequest::new(Method::Post, "/register").body(RequestBody::Json(body));
        self.execute(request, Credential::Anonymous).await?;
        tracing::info!(%username, "account registered");
        self.login(username, password).await
    }

    /// Clear the session. Never touches the network; idempotent.
    pub fn logout(&self) {
        self.session.logout();
    }

    /// Fetch the profile for the held token when it is not loaded yet.
    ///
    /// # Errors
    ///
    /// Propagates fetch failures after clearing the session.
    pub async fn refresh_user(&self) -> Result<Option<User>, ClientError> {
        if !self.session.is_signed_in() {
            return Ok(None);
        }
        if let Some(user) = self.session.user() {
            return Ok(Some(user));
        }
        match self.current_user().await {
            Ok(user) => Ok(self.session.set_user(user.clone()).then_some(user)),
            Err(err) => {
                self.session.logout();
                Err(err)
            }
        }
    }

    // =========================================================================
    // ENDPOINTS
    // =========================================================================

    /// `GET /users/me`
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the call.
    pub async fn current_user(&self) -> Result<User, ClientError> {
        self.fetch(ApiRequest::new(Method::Get, "/users/me"), Credential::Required).await
    }

    /// `GET /pins/`: the feed; credentials are optional.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the call.
    pub async fn list_pins(&self) -> Result<Vec<Pin>, ClientError> {
        self.fetch(ApiRequest::new(Method::Get, "/pins/"), Credential::Optional).await
    }

    /// `GET /pins/{id}`
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the call.
    pub async fn get_pin(&self, pin_id: i64) -> Result<Pin, ClientError> {
        self.fetch(ApiRequest::new(Method::Get, format!("/pins/{pin_id}")), Credential::Required).await
    }

    /// `POST /pins/` as multipart.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] with the backend's joined messages when the
    /// pin is rejected.
    pub async fn create_pin(&self, pin: &NewPin) -> Result<Pin, ClientError> {
        let request = ApiRequest::new(Method::Post, "/pins/").body(RequestBody::Multipart(new_pin_fields(pin)));
        self.fetch(request, Credential::Required).await
    }

    /// `POST /pins/{id}/save`
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the call.
    pub async fn save_pin(&self, pin_id: i64) -> Result<(), ClientError> {
        let request = ApiRequest::new(Method::Post, format!("/pins/{pin_id}/save"));
        self.execute(request, Credential::Required).await.map(drop)
    }

    /// `DELETE /pins/{id}/save`
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the call.
    pub async fn unsave_pin(&self, pin_id: i64) -> Result<(), ClientError> {
        let request = ApiRequest::new(Method::Delete, format!("/pins/{pin_id}/save"));
        self.execute(request, Credential::Required).await.map(drop)
    }

    /// Save when `saved` is true, unsave otherwise.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the call.
    pub async fn set_saved(&self, pin_id: i64, saved: bool) -> Result<(), ClientError> {
        if saved { self.save_pin(pin_id).await } else { self.unsave_pin(pin_id).await }
    }

    /// `GET /pins/saved`
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the call.
    pub async fn saved_pins(&self) -> Result<Vec<Pin>, ClientError> {
        self.fetch(ApiRequest::new(Method::Get, "/pins/saved"), Credential::Required).await
    }

    /// `GET /pins/tag/{tagName}`
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the call.
    pub async fn pins_by_tag(&self, tag_name: &str) -> Result<Vec<Pin>, ClientError> {
        let path = format!("/pins/tag/{}", urlencoding::encode(tag_name));
        self.fetch(ApiRequest::new(Method::Get, path), Credential::Required).await
    }

    /// `GET /pins/{id}/comments`, oldest first.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the call.
    pub async fn comments(&self, pin_id: i64) -> Result<Vec<Comment>, ClientError> {
        let request = ApiRequest::new(Method::Get, format!("/pins/{pin_id}/comments"));
        self.fetch(request, Credential::Required).await
    }

    /// `POST /pins/{id}/comments`
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the call.
    pub async fn post_comment(&self, pin_id: i64, content: &str) -> Result<Comment, ClientError> {
        let request = ApiRequest::new(Method::Post, format!("/pins/{pin_id}/comments"))
            .body(RequestBody::Json(serde_json::json!({ "content": content })));
        self.fetch(request, Credential::Required).await
    }

    /// `GET /users/me/pins`: pins owned by the caller.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the call.
    pub async fn my_pins(&self) -> Result<Vec<Pin>, ClientError> {
        self.fetch(ApiRequest::new(Method::Get, "/users/me/pins"), Credential::Required).await
    }
}

/// Multipart fields for a new pin: title, description?, image, tags?.
fn new_pin_fields(pin: &NewPin) -> Vec<MultipartField> {
    let mut fields = vec![MultipartField::Text { name: "title".into(), value: pin.title.clone() }];
    if let Some(description) = pin.description.as_ref().filter(|d| !d.is_empty()) {
        fields.push(MultipartField::Text { name: "description".into(), value: description.clone() });
    }
    fields.push(MultipartField::File {
        name: "image".into(),
        file_name: pin.image.file_name.clone(),
        content_type: pin.image.content_type.clone(),
        bytes: pin.image.bytes.clone(),
    });
    if !pin.tags.is_empty() {
        fields.push(MultipartField::Text { name: "tags".into(), value: pin.tags.join(",") });
    }
    fields
}

/// Human-readable message from a backend error body.
///
/// Understands `{"detail": [{"msg": ..}, ..]}` (joined with ", "),
/// `{"detail": ".."}` and `{"message": ".."}`.
pub(crate) fn backend_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = match value.get("detail") {
        Some(Value::Array(items)) => {
            let parts: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str).or_else(|| item.as_str()))
                .collect();
            parts.join(", ")
        }
        Some(Value::String(detail)) => detail.clone(),
        _ => value.get("message").and_then(Value::as_str)?.to_owned(),
    };
    (!message.trim().is_empty()).then_some(message)
}
