//! Page controllers for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns its route-scoped state (loaded data, loading flag, one
//! notice slot) and exposes explicit async `load` and mutation operations
//! that take the shared [`ApiClient`]. Nothing here renders; a shell reads
//! the public fields and draws them.
//!
//! ERROR HANDLING
//! ==============
//! Auth failures are swallowed here because the app controller already
//! observed the matching [`crate::net::api::AuthEvent`]. Everything else
//! becomes an error notice on the page.

pub mod create_pin;
pub mod home;
pub mod login;
pub mod pin_detail;
pub mod profile;
pub mod saved_pins;
pub mod tag_pins;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::net::api::ApiClient;
use crate::net::types::Pin;
use crate::state::notice::NoticeSlot;
use crate::util::share::{ShareOutcome, SharePayload, ShareTarget};

pub(crate) const SHARE_UNSUPPORTED: &str = "Sharing is not supported on this platform";

/// Put `err` on `notice`, unless the app controller owns it.
///
/// Validation errors carry a message meant for the user and are shown
/// verbatim; anything else shows `fallback`.
pub(crate) fn report(notice: &mut NoticeSlot, err: &ClientError, fallback: &str) {
    match err {
        ClientError::Auth(_) => tracing::debug!(error = %err, "auth failure left to app"),
        ClientError::Validation(message) => notice.error(message.clone()),
        _ => {
            tracing::warn!(error = %err, fallback, "page operation failed");
            notice.error(fallback);
        }
    }
}

/// Like [`report`], but also shows the backend's own text on any other
/// failed status, falling back only when the body carried none.
pub(crate) fn report_detailed(notice: &mut NoticeSlot, err: &ClientError, fallback: &str) {
    match err {
        ClientError::Status { message: Some(message), .. } => notice.error(message.clone()),
        _ => report(notice, err, fallback),
    }
}

/// Save or unsave `pin_id`, noting the outcome. Returns whether the call
/// succeeded.
pub(crate) async fn apply_saved(api: &ApiClient, notice: &mut NoticeSlot, pin_id: i64, saved: bool) -> bool {
    match api.set_saved(pin_id, saved).await {
        Ok(()) => {
            notice.success(if saved { "Pin saved" } else { "Pin unsaved" });
            true
        }
        Err(err) => {
            report(notice, &err, "Error saving pin");
            false
        }
    }
}

pub(crate) fn share_pin(target: &dyn ShareTarget, config: &ClientConfig, notice: &mut NoticeSlot, pin: &Pin) {
    let payload = SharePayload {
        title: pin.title.clone(),
        text: pin.description_or_empty().to_owned(),
        url: config.pin_share_url(pin.id),
    };
    match target.share(&payload) {
        Ok(ShareOutcome::Shared) => notice.success("Link shared"),
        Ok(ShareOutcome::Cancelled) => {}
        Err(ClientError::ShareUnsupported) => notice.error(SHARE_UNSUPPORTED),
        Err(err) => report(notice, &err, "Error sharing pin"),
    }
}
