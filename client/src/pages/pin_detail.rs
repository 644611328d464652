//! Single pin with its comment thread.
//!
//! DESIGN
//! ======
//! The pin and its comments are fetched separately so a comment failure
//! still leaves the pin visible. Every mutation re-fetches what it touched;
//! the backend is the source of truth for `is_saved`.

#[cfg(test)]
#[path = "pin_detail_test.rs"]
mod pin_detail_test;

use super::{apply_saved, report, share_pin};
use crate::net::api::ApiClient;
use crate::net::types::{Comment, Pin};
use crate::state::notice::NoticeSlot;
use crate::util::share::ShareTarget;

#[derive(Clone, Debug)]
pub struct PinDetailPage {
    pub pin_id: i64,
    pub pin: Option<Pin>,
    pub comments: Vec<Comment>,
    pub loading: bool,
    pub loading_comments: bool,
    pub comment_draft: String,
    pub notice: NoticeSlot,
}

impl PinDetailPage {
    #[must_use]
    pub fn new(pin_id: i64) -> Self {
        Self {
            pin_id,
            pin: None,
            comments: Vec::new(),
            loading: false,
            loading_comments: false,
            comment_draft: String::new(),
            notice: NoticeSlot::default(),
        }
    }

    pub async fn load(&mut self, api: &ApiClient) {
        self.load_pin(api).await;
        self.load_comments(api).await;
    }

    async fn load_pin(&mut self, api: &ApiClient) {
        self.loading = true;
        match api.get_pin(self.pin_id).await {
            Ok(pin) => self.pin = Some(pin),
            Err(err) => report(&mut self.notice, &err, "Error loading pin"),
        }
        self.loading = false;
    }

    async fn load_comments(&mut self, api: &ApiClient) {
        self.loading_comments = true;
        match api.comments(self.pin_id).await {
            Ok(comments) => self.comments = comments,
            Err(err) => report(&mut self.notice, &err, "Error loading comments"),
        }
        self.loading_comments = false;
    }

    /// Image URL for the loaded pin.
    #[must_use]
    pub fn image_url(&self, api: &ApiClient) -> Option<String> {
        self.pin.as_ref().map(|p| api.config().asset_url(&p.image_ref))
    }

    pub async fn toggle_save(&mut self, api: &ApiClient) {
        let Some(saved) = self.pin.as_ref().map(|p| p.is_saved) else {
            return;
        };
        if apply_saved(api, &mut self.notice, self.pin_id, !saved).await {
            self.load_pin(api).await;
        }
    }

    /// Post the current draft. Returns whether the comment was accepted.
    pub async fn post_comment(&mut self, api: &ApiClient) -> bool {
        if !api.session().is_signed_in() {
            self.notice.error("Please login to comment");
            return false;
        }
        let content = self.comment_draft.trim().to_owned();
        if content.is_empty() {
            self.notice.error("Comment cannot be empty");
            return false;
        }
        match api.post_comment(self.pin_id, &content).await {
            Ok(_) => {
                self.comment_draft.clear();
                self.load_comments(api).await;
                self.notice.success("Comment posted");
                true
            }
            Err(err) => {
                report(&mut self.notice, &err, "Error posting comment");
                false
            }
        }
    }

    pub fn share(&mut self, api: &ApiClient, target: &dyn ShareTarget) {
        if let Some(pin) = &self.pin {
            share_pin(target, api.config(), &mut self.notice, pin);
        }
    }
}
