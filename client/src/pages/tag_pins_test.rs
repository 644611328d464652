use super::*;
use crate::net::transport::Method;
use crate::test_helpers::signed_in;

#[tokio::test]
async fn load_filters_by_tag() {
    let h = signed_in("bob").await;
    let mut page = TagPinsPage::new("trees");
    page.load(&h.api).await;
    assert_eq!(page.pins.iter().map(|p| p.title.as_str()).collect::<Vec<_>>(), ["Forest"]);
    assert_eq!(page.empty_message(), None);
}

#[tokio::test]
async fn unknown_tag_shows_empty_state() {
    let h = signed_in("bob").await;
    let mut page = TagPinsPage::new("street art");
    page.load(&h.api).await;
    assert_eq!(page.empty_message(), Some(EMPTY_MESSAGE));
    assert_eq!(h.backend.count(Method::Get, "/pins/tag/street%20art"), 1);
}

#[tokio::test]
async fn failure_notifies() {
    let h = signed_in("bob").await;
    h.backend.script(Method::Get, "/pins/tag/sky", 503, serde_json::json!({}));
    let mut page = TagPinsPage::new("sky");
    page.load(&h.api).await;
    assert_eq!(page.notice.current().unwrap().message, "Error loading pins");
}

#[tokio::test]
async fn toggle_save_refreshes_list() {
    let h = signed_in("bob").await;
    let mut page = TagPinsPage::new("sky");
    page.load(&h.api).await;
    page.toggle_save(&h.api, 1).await;
    assert!(page.pins.iter().find(|p| p.id == 1).unwrap().is_saved);
}
