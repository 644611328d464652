use super::*;
use crate::error::ClientError;
use crate::net::transport::Method;
use crate::state::notice::Severity;
use crate::test_helpers::{harness, signed_in};
use crate::util::share::{NoShare, ShareOutcome, SharePayload};

struct Recorder(std::sync::Mutex<Vec<SharePayload>>, ShareOutcome);

impl ShareTarget for Recorder {
    fn share(&self, payload: &SharePayload) -> Result<ShareOutcome, ClientError> {
        self.0.lock().unwrap().push(payload.clone());
        Ok(self.1)
    }
}

#[tokio::test]
async fn load_fetches_pin_and_comments() {
    let h = signed_in("alice").await;
    h.api.post_comment(2, "lovely").await.unwrap();
    let mut page = PinDetailPage::new(2);
    page.load(&h.api).await;
    assert_eq!(page.pin.as_ref().unwrap().title, "Forest");
    assert_eq!(page.comments.len(), 1);
    assert!(!page.loading && !page.loading_comments);
    assert_eq!(page.image_url(&h.api).unwrap(), "http://localhost:8000/uploads/2.jpg");
}

#[tokio::test]
async fn missing_pin_reports_error() {
    let h = signed_in("alice").await;
    let mut page = PinDetailPage::new(404);
    page.load(&h.api).await;
    assert!(page.pin.is_none());
    assert_eq!(page.notice.current().unwrap().severity, Severity::Error);
}

#[tokio::test]
async fn comment_failure_keeps_pin() {
    let h = signed_in("alice").await;
    h.backend.script(Method::Get, "/pins/1/comments", 500, serde_json::json!({}));
    let mut page = PinDetailPage::new(1);
    page.load(&h.api).await;
    assert!(page.pin.is_some());
    assert_eq!(page.notice.current().unwrap().message, "Error loading comments");
}

#[tokio::test]
async fn double_toggle_converges_to_original_state() {
    let h = signed_in("alice").await;
    let mut page = PinDetailPage::new(2);
    page.load(&h.api).await;
    assert!(!page.pin.as_ref().unwrap().is_saved);

    page.toggle_save(&h.api).await;
    assert!(page.pin.as_ref().unwrap().is_saved);
    assert_eq!(page.notice.current().unwrap().message, "Pin saved");

    page.toggle_save(&h.api).await;
    assert!(!page.pin.as_ref().unwrap().is_saved);
    assert_eq!(page.notice.current().unwrap().message, "Pin unsaved");
    assert!(!h.backend.is_saved(1, 2));
}

#[tokio::test]
async fn save_failure_notifies() {
    let h = signed_in("alice").await;
    h.backend.script(Method::Post, "/pins/2/save", 500, serde_json::json!({}));
    let mut page = PinDetailPage::new(2);
    page.load(&h.api).await;
    page.toggle_save(&h.api).await;
    assert_eq!(page.notice.current().unwrap().message, "Error saving pin");
    assert!(!page.pin.as_ref().unwrap().is_saved);
}

#[tokio::test]
async fn post_comment_clears_draft_and_reloads() {
    let h = signed_in("bob").await;
    let mut page = PinDetailPage::new(1);
    page.load(&h.api).await;
    page.comment_draft = "  nice shot  ".into();
    assert!(page.post_comment(&h.api).await);
    assert!(page.comment_draft.is_empty());
    assert_eq!(page.comments[0].content, "nice shot");
    assert_eq!(page.notice.current().unwrap().message, "Comment posted");
}

#[tokio::test]
async fn blank_comment_is_not_sent() {
    let h = signed_in("bob").await;
    let mut page = PinDetailPage::new(1);
    page.comment_draft = "   ".into();
    assert!(!page.post_comment(&h.api).await);
    assert_eq!(h.backend.count(Method::Post, "/pins/1/comments"), 0);
}

#[tokio::test]
async fn comment_requires_session() {
    let h = harness();
    let mut page = PinDetailPage::new(1);
    page.comment_draft = "hi".into();
    assert!(!page.post_comment(&h.api).await);
    assert_eq!(page.notice.current().unwrap().message, "Please login to comment");
    assert!(h.backend.requests().is_empty());
}

#[tokio::test]
async fn share_builds_pin_link() {
    let h = signed_in("alice").await;
    let mut page = PinDetailPage::new(1);
    page.load(&h.api).await;

    let target = Recorder(std::sync::Mutex::default(), ShareOutcome::Shared);
    page.share(&h.api, &target);
    let shared = target.0.lock().unwrap().clone();
    assert_eq!(shared[0].url, "http://localhost:3000/pin/1");
    assert_eq!(shared[0].title, "Sunset");
    assert_eq!(page.notice.current().unwrap().severity, Severity::Success);
}

#[tokio::test]
async fn cancelled_share_is_silent() {
    let h = signed_in("alice").await;
    let mut page = PinDetailPage::new(1);
    page.load(&h.api).await;
    page.notice.dismiss();
    page.share(&h.api, &Recorder(std::sync::Mutex::default(), ShareOutcome::Cancelled));
    assert!(page.notice.current().is_none());
}

#[tokio::test]
async fn unsupported_share_notifies() {
    let h = signed_in("alice").await;
    let mut page = PinDetailPage::new(1);
    page.load(&h.api).await;
    page.share(&h.api, &NoShare);
    assert_eq!(page.notice.current().unwrap().message, "Sharing is not supported on this platform");
}
