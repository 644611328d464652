//! Native share capability.
//!
//! A shell that can hand a link to the platform's share sheet implements
//! [`ShareTarget`]; one that cannot uses [`NoShare`], which reports
//! [`ClientError::ShareUnsupported`].

use crate::error::ClientError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// The user backed out; not an error and not reported.
    Cancelled,
}

pub trait ShareTarget: Send + Sync {
    /// Hand `payload` to the platform.
    ///
    /// # Errors
    ///
    /// [`ClientError::ShareUnsupported`] when there is no share capability;
    /// any other error when the platform share fails.
    fn share(&self, payload: &SharePayload) -> Result<ShareOutcome, ClientError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoShare;

impl ShareTarget for NoShare {
    fn share(&self, _payload: &SharePayload) -> Result<ShareOutcome, ClientError> {
        Err(ClientError::ShareUnsupported)
    }
}
