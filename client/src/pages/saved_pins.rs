//! Pins the signed-in user has saved.

#[cfg(test)]
#[path = "saved_pins_test.rs"]
mod saved_pins_test;

use super::{apply_saved, report};
use crate::net::api::ApiClient;
use crate::net::types::Pin;
use crate::state::notice::NoticeSlot;
use crate::util::route::Route;

#[derive(Clone, Debug, Default)]
pub struct SavedPinsPage {
    pub pins: Vec<Pin>,
    pub loading: bool,
    pub notice: NoticeSlot,
}

impl SavedPinsPage {
    /// Fetch saved pins. Without a session, nothing is sent and the login
    /// route is returned.
    pub async fn load(&mut self, api: &ApiClient) -> Option<Route> {
        if !api.session().is_signed_in() {
            self.notice.error("Please login to view saved pins");
            return Some(Route::Login);
        }
        self.loading = true;
        match api.saved_pins().await {
            Ok(pins) => self.pins = pins,
            Err(err) => report(&mut self.notice, &err, "Error loading saved pins"),
        }
        self.loading = false;
        None
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.loading && self.pins.is_empty()
    }

    /// Unsave a listed pin and drop it from the list after re-fetching.
    pub async fn unsave(&mut self, api: &ApiClient, pin_id: i64) {
        if apply_saved(api, &mut self.notice, pin_id, false).await {
            self.load(api).await;
        }
    }
}
