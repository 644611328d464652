//! Feed of every pin.

#[cfg(test)]
#[path = "home_test.rs"]
mod home_test;

use super::{apply_saved, report};
use crate::net::api::ApiClient;
use crate::net::types::Pin;
use crate::state::notice::NoticeSlot;

#[derive(Clone, Debug, Default)]
pub struct FeedPage {
    pub pins: Vec<Pin>,
    pub loading: bool,
    pub notice: NoticeSlot,
}

impl FeedPage {
    pub async fn load(&mut self, api: &ApiClient) {
        self.loading = true;
        match api.list_pins().await {
            Ok(pins) => self.pins = pins,
            Err(err) => report(&mut self.notice, &err, "Error loading pins"),
        }
        self.loading = false;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.loading && self.pins.is_empty()
    }

    /// Flip the save state of a listed pin, then re-fetch the feed.
    pub async fn toggle_save(&mut self, api: &ApiClient, pin_id: i64) {
        let Some(saved) = self.pins.iter().find(|p| p.id == pin_id).map(|p| p.is_saved) else {
            return;
        };
        if apply_saved(api, &mut self.notice, pin_id, !saved).await {
            self.load(api).await;
        }
    }
}
