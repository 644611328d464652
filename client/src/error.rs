//! Client error taxonomy.
//!
//! ERROR HANDLING
//! ==============
//! Auth failures are handled globally by the app controller (forced logout +
//! redirect), so page controllers check [`ClientError::is_auth`] and skip their
//! own notices. Everything else surfaces as a one-shot notice on the page that
//! issued the call; nothing here is fatal.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Bad credentials, or an expired, invalid or missing token.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Input rejected client-side or by the backend.
    #[error("{0}")]
    Validation(String),

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The platform has no native share capability.
    #[error("sharing is not supported on this platform")]
    ShareUnsupported,

    /// Any other non-success status. `message` is the backend's own
    /// `detail`/`message` text, when the body carried one.
    #[error("request failed with status {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Status { status: u16, message: Option<String> },

    /// The response body did not match the expected schema.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// Durable token storage could not be read or written.
    #[error("token storage failed: {0}")]
    Storage(String),

    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    Config(String),
}

impl ClientError {
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
