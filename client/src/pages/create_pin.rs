//! New pin form with a tag editor.
//!
//! DESIGN
//! ======
//! `submit` validates the form locally before anything goes over the wire:
//! a missing image or a blank title never reaches the backend. Backend
//! messages (`detail` or `message`, on any failed status) are shown verbatim;
//! only failures without one get a generic retry hint.

#[cfg(test)]
#[path = "create_pin_test.rs"]
mod create_pin_test;

use super::report_detailed;
use crate::net::api::ApiClient;
use crate::net::types::{ImageUpload, NewPin};
use crate::state::notice::NoticeSlot;
use crate::util::route::Route;

#[derive(Clone, Debug, Default)]
pub struct CreatePinPage {
    pub title: String,
    pub description: String,
    pub image: Option<ImageUpload>,
    pub tag_input: String,
    tags: Vec<String>,
    pub submitting: bool,
    pub notice: NoticeSlot,
}

impl CreatePinPage {
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Add a tag, trimmed. Blank and duplicate tags are ignored.
    pub fn add_tag(&mut self, raw: &str) -> bool {
        let tag = raw.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_owned());
        true
    }

    /// Move whatever is in the tag input box into the tag list.
    pub fn commit_tag_input(&mut self) -> bool {
        let raw = std::mem::take(&mut self.tag_input);
        self.add_tag(&raw)
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    pub fn set_image(&mut self, image: ImageUpload) {
        self.image = Some(image);
    }

    fn validate(&self, api: &ApiClient) -> Result<NewPin, &'static str> {
        let Some(image) = self.image.clone() else {
            return Err("Please select an image");
        };
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Please enter a title");
        }
        if !api.session().is_signed_in() {
            return Err("You must be logged in to create a pin");
        }
        let description = Some(self.description.trim().to_owned()).filter(|d| !d.is_empty());
        Ok(NewPin { title: title.to_owned(), description, image, tags: self.tags.clone() })
    }

    /// Send the pin. Returns the route to show next on success.
    pub async fn submit(&mut self, api: &ApiClient) -> Option<Route> {
        let pin = match self.validate(api) {
            Ok(pin) => pin,
            Err(message) => {
                self.notice.error(message);
                return None;
            }
        };
        self.submitting = true;
        let result = api.create_pin(&pin).await;
        self.submitting = false;
        match result {
            Ok(created) => {
                tracing::info!(pin_id = created.id, "pin created");
                Some(Route::Home)
            }
            Err(err) => {
                report_detailed(&mut self.notice, &err, "Failed to create pin. Please try again.");
                None
            }
        }
    }
}
