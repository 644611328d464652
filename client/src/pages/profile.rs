//! Profile screen: the user's own pins and their saved pins, in two tabs.
//!
//! DESIGN
//! ======
//! The saved list is authoritative for save toggles on this screen: a pin
//! is treated as saved when it appears in `saved`, whichever tab it was
//! clicked from.

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;

use super::{apply_saved, report, share_pin};
use crate::net::api::ApiClient;
use crate::net::types::{Pin, User};
use crate::state::notice::NoticeSlot;
use crate::util::route::Route;
use crate::util::share::ShareTarget;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProfileTab {
    #[default]
    Created,
    Saved,
}

#[derive(Clone, Debug, Default)]
pub struct ProfilePage {
    pub tab: ProfileTab,
    pub user: Option<User>,
    pub created: Vec<Pin>,
    pub saved: Vec<Pin>,
    pub loading: bool,
    pub notice: NoticeSlot,
}

impl ProfilePage {
    pub async fn load(&mut self, api: &ApiClient) -> Option<Route> {
        if !api.session().is_signed_in() {
            self.notice.error("Please login to view profile");
            return Some(Route::Login);
        }
        self.loading = true;
        match api.refresh_user().await {
            Ok(user) => self.user = user,
            Err(err) => report(&mut self.notice, &err, "Error loading profile"),
        }
        match api.my_pins().await {
            Ok(pins) => self.created = pins,
            Err(err) => report(&mut self.notice, &err, "Error loading your pins"),
        }
        self.load_saved(api).await;
        self.loading = false;
        None
    }

    async fn load_saved(&mut self, api: &ApiClient) {
        match api.saved_pins().await {
            Ok(pins) => self.saved = pins,
            Err(err) => report(&mut self.notice, &err, "Error loading saved pins"),
        }
    }

    pub fn select_tab(&mut self, tab: ProfileTab) {
        self.tab = tab;
    }

    /// Pins for the active tab.
    #[must_use]
    pub fn visible(&self) -> &[Pin] {
        match self.tab {
            ProfileTab::Created => &self.created,
            ProfileTab::Saved => &self.saved,
        }
    }

    #[must_use]
    pub fn is_saved(&self, pin_id: i64) -> bool {
        self.saved.iter().any(|p| p.id == pin_id)
    }

    pub async fn toggle_save(&mut self, api: &ApiClient, pin_id: i64) {
        let saved = self.is_saved(pin_id);
        if apply_saved(api, &mut self.notice, pin_id, !saved).await {
            self.load_saved(api).await;
        }
    }

    pub fn share(&mut self, api: &ApiClient, target: &dyn ShareTarget, pin_id: i64) {
        let pin = self.created.iter().chain(&self.saved).find(|p| p.id == pin_id).cloned();
        if let Some(pin) = pin {
            share_pin(target, api.config(), &mut self.notice, &pin);
        }
    }
}
