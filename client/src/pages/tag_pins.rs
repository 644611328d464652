//! Pins filtered by one tag.

#[cfg(test)]
#[path = "tag_pins_test.rs"]
mod tag_pins_test;

use super::{apply_saved, report};
use crate::net::api::ApiClient;
use crate::net::types::Pin;
use crate::state::notice::NoticeSlot;

pub const EMPTY_MESSAGE: &str = "No pins found with this tag.";

#[derive(Clone, Debug)]
pub struct TagPinsPage {
    pub tag: String,
    pub pins: Vec<Pin>,
    pub loading: bool,
    pub notice: NoticeSlot,
}

impl TagPinsPage {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into(), pins: Vec::new(), loading: false, notice: NoticeSlot::default() }
    }

    pub async fn load(&mut self, api: &ApiClient) {
        self.loading = true;
        match api.pins_by_tag(&self.tag).await {
            Ok(pins) => self.pins = pins,
            Err(err) => report(&mut self.notice, &err, "Error loading pins"),
        }
        self.loading = false;
    }

    /// Text for the empty state, once loading has finished.
    #[must_use]
    pub fn empty_message(&self) -> Option<&'static str> {
        (!self.loading && self.pins.is_empty()).then_some(EMPTY_MESSAGE)
    }

    pub async fn toggle_save(&mut self, api: &ApiClient, pin_id: i64) {
        let Some(saved) = self.pins.iter().find(|p| p.id == pin_id).map(|p| p.is_saved) else {
            return;
        };
        if apply_saved(api, &mut self.notice, pin_id, !saved).await {
            self.load(api).await;
        }
    }
}
