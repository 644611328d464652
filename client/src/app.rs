//! Top-level controller: owns the current route and the mounted page.
//!
//! SYSTEM CONTEXT
//! ==============
//! The shell forwards navigation and user actions here. Every navigation
//! runs the route guard, mounts a fresh page controller and calls its `load`.
//! After anything that may touch the network, pending [`AuthEvent`]s are
//! drained; if there are any while a protected screen is showing, the app
//! mounts the login screen exactly once for the whole batch.
//!
//! ```text
//!  navigate(path) ─► Route::parse ─► guard ─► mount View ─► View::load
//!                                      │                        │
//!                                      └── redirect /login ◄────┴── AuthEvent
//! ```

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use crate::net::api::{ApiClient, AuthEvent, AuthEvents};
use crate::net::types::ImageUpload;
use crate::pages::create_pin::CreatePinPage;
use crate::pages::home::FeedPage;
use crate::pages::login::{LoginForm, RegisterForm};
use crate::pages::pin_detail::PinDetailPage;
use crate::pages::profile::ProfilePage;
use crate::pages::saved_pins::SavedPinsPage;
use crate::pages::tag_pins::TagPinsPage;
use crate::state::notice::NoticeSlot;
use crate::util::guard::{self, GuardDecision};
use crate::util::route::Route;
use crate::util::share::ShareTarget;

/// Page redirects can chain (page → login); anything longer is a loop.
const MAX_HOPS: usize = 4;

/// The mounted page controller.
#[derive(Clone, Debug)]
pub enum View {
    Feed(FeedPage),
    Login(LoginForm),
    Register(RegisterForm),
    PinDetail(PinDetailPage),
    TagPins(TagPinsPage),
    Saved(SavedPinsPage),
    Profile(ProfilePage),
    Create(CreatePinPage),
}

impl View {
    /// Fresh, unloaded controller for `route`.
    #[must_use]
    pub fn for_route(route: &Route) -> Self {
        match route {
            Route::Home => Self::Feed(FeedPage::default()),
            Route::Login => Self::Login(LoginForm::default()),
            Route::Register => Self::Register(RegisterForm::default()),
            Route::PinDetail(id) => Self::PinDetail(PinDetailPage::new(*id)),
            Route::TagPins(tag) => Self::TagPins(TagPinsPage::new(tag.clone())),
            Route::Saved => Self::Saved(SavedPinsPage::default()),
            Route::Profile => Self::Profile(ProfilePage::default()),
            Route::Create => Self::Create(CreatePinPage::default()),
        }
    }

    /// Run the page's initial fetch. Returns a redirect when the page asks
    /// for one.
    pub async fn load(&mut self, api: &ApiClient) -> Option<Route> {
        match self {
            Self::Feed(page) => page.load(api).await,
            Self::PinDetail(page) => page.load(api).await,
            Self::TagPins(page) => page.load(api).await,
            Self::Saved(page) => return page.load(api).await,
            Self::Profile(page) => return page.load(api).await,
            Self::Login(_) | Self::Register(_) | Self::Create(_) => {}
        }
        None
    }

    /// The page's notice slot, if it has one.
    #[must_use]
    pub fn notice(&self) -> Option<&NoticeSlot> {
        match self {
            Self::Feed(page) => Some(&page.notice),
            Self::PinDetail(page) => Some(&page.notice),
            Self::TagPins(page) => Some(&page.notice),
            Self::Saved(page) => Some(&page.notice),
            Self::Profile(page) => Some(&page.notice),
            Self::Create(page) => Some(&page.notice),
            Self::Login(_) | Self::Register(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavItem {
    Link { label: &'static str, route: Route },
    Logout,
}

pub struct App {
    api: ApiClient,
    events: AuthEvents,
    share: Arc<dyn ShareTarget>,
    route: Route,
    view: View,
    /// App-level notices (forced logout); pages keep their own.
    pub notice: NoticeSlot,
}

impl App {
    /// Nothing is mounted until [`App::start`] or [`App::navigate`] runs.
    #[must_use]
    pub fn new(api: ApiClient, events: AuthEvents, share: Arc<dyn ShareTarget>) -> Self {
        Self { api, events, share, route: Route::Login, view: View::Login(LoginForm::default()), notice: NoticeSlot::default() }
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn route(&self) -> &Route {
        &self.route
    }

    #[must_use]
    pub fn view(&self) -> &View {
        &self.view
    }

    /// Load the profile for a restored session, then show `path`.
    pub async fn start(&mut self, path: &str) {
        if let Err(err) = self.api.refresh_user().await {
            tracing::warn!(error = %err, "restored session rejected");
        }
        self.process_auth_events();
        self.navigate(path).await;
    }

    pub async fn navigate(&mut self, path: &str) {
        self.navigate_to(Route::parse(path)).await;
    }

    pub async fn navigate_to(&mut self, route: Route) {
        let mut target = route;
        for _ in 0..MAX_HOPS {
            if let GuardDecision::Redirect { to, reason } = guard::check(self.api.session(), &target) {
                tracing::info!(from = %target, to = %to, ?reason, "guard redirect");
                target = to;
            }
            self.mount(target);
            let redirect = self.view.load(&self.api).await;
            if self.process_auth_events() {
                return;
            }
            match redirect {
                Some(next) if next != self.route => target = next,
                _ => return,
            }
        }
        tracing::warn!(route = %self.route, "redirect limit reached");
    }

    fn mount(&mut self, route: Route) {
        tracing::debug!(%route, "mount");
        self.view = View::for_route(&route);
        self.route = route;
    }

    /// Drain auth events; on a protected screen, fall back to login once.
    /// Returns whether a redirect happened.
    pub fn process_auth_events(&mut self) -> bool {
        let events = self.events.drain();
        if events.is_empty() {
            return false;
        }
        tracing::info!(count = events.len(), route = %self.route, "auth events drained");
        if !self.route.is_protected() {
            return false;
        }
        let expired = events.iter().any(|e| matches!(e, AuthEvent::TokenExpired | AuthEvent::Unauthorized { .. }));
        self.notice.error(if expired { "Session expired. Please login again." } else { "Please login to continue" });
        self.mount(Route::Login);
        true
    }

    /// Links for the navigation bar, keyed on whether a profile is loaded.
    #[must_use]
    pub fn nav_items(&self) -> Vec<NavItem> {
        if self.api.session().user().is_some() {
            vec![
                NavItem::Link { label: "Create", route: Route::Create },
                NavItem::Link { label: "Saved", route: Route::Saved },
                NavItem::Link { label: "Profile", route: Route::Profile },
                NavItem::Logout,
            ]
        } else {
            vec![
                NavItem::Link { label: "Login", route: Route::Login },
                NavItem::Link { label: "Sign Up", route: Route::Register },
            ]
        }
    }

    pub fn logout(&mut self) {
        self.api.logout();
        self.events.drain();
        tracing::info!("logged out");
        self.mount(Route::Login);
    }

    // =========================================================================
    // ACTIONS
    //
    // Each returns false when the mounted page does not support it.
    // =========================================================================

    pub async fn login(&mut self, username: &str, password: &str) -> bool {
        let View::Login(form) = &mut self.view else { return false };
        form.username = username.to_owned();
        form.password = password.to_owned();
        let next = form.submit(&self.api).await;
        self.settle(next).await;
        true
    }

    pub async fn register(&mut self, email: &str, username: &str, password: &str) -> bool {
        let View::Register(form) = &mut self.view else { return false };
        form.email = email.to_owned();
        form.username = username.to_owned();
        form.password = password.to_owned();
        let next = form.submit(&self.api).await;
        self.settle(next).await;
        true
    }

    /// Flip the save state of `pin_id` on whichever list is showing.
    pub async fn toggle_save(&mut self, pin_id: i64) -> bool {
        let api = &self.api;
        match &mut self.view {
            View::Feed(page) => page.toggle_save(api, pin_id).await,
            View::TagPins(page) => page.toggle_save(api, pin_id).await,
            View::Profile(page) => page.toggle_save(api, pin_id).await,
            View::Saved(page) => page.unsave(api, pin_id).await,
            View::PinDetail(page) if page.pin_id == pin_id => page.toggle_save(api).await,
            _ => return false,
        }
        self.process_auth_events();
        true
    }

    pub async fn post_comment(&mut self, content: &str) -> bool {
        let View::PinDetail(page) = &mut self.view else { return false };
        page.comment_draft = content.to_owned();
        page.post_comment(&self.api).await;
        self.process_auth_events();
        true
    }

    pub fn share(&mut self, pin_id: i64) -> bool {
        match &mut self.view {
            View::PinDetail(page) if page.pin_id == pin_id => page.share(&self.api, self.share.as_ref()),
            View::Profile(page) => page.share(&self.api, self.share.as_ref(), pin_id),
            _ => return false,
        }
        true
    }

    pub async fn create_pin(
        &mut self,
        title: &str,
        description: &str,
        image: Option<ImageUpload>,
        tags: &[String],
    ) -> bool {
        let View::Create(page) = &mut self.view else { return false };
        page.title = title.to_owned();
        page.description = description.to_owned();
        page.image = image;
        for tag in tags {
            page.add_tag(tag);
        }
        let next = page.submit(&self.api).await;
        self.settle(next).await;
        true
    }

    async fn settle(&mut self, next: Option<Route>) {
        if self.process_auth_events() {
            return;
        }
        if let Some(route) = next {
            self.navigate_to(route).await;
        }
    }
}
