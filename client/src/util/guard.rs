//! Route guard for protected screens.
//!
//! SYSTEM CONTEXT
//! ==============
//! Evaluated synchronously on every navigation to a protected route, before
//! the page controller is built or any request is sent. Nothing is cached
//! between navigations.
//!
//! ```text
//!   no token ──────────────► redirect /login
//!   token, decode fails ───► logout, redirect /login
//!   token, exp <= now ─────► logout, redirect /login
//!   otherwise ─────────────► allow
//! ```
//!
//! `SessionStore` already refuses tokens that fail to decode, so the second
//! branch only fires if a held token was corrupted after acceptance.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::state::session::SessionStore;
use crate::util::route::Route;
use crate::util::token::{self, TokenError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    NoToken,
    InvalidToken,
    Expired,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect { to: Route, reason: DenyReason },
}

/// Decide whether `route` may render for the current session.
pub fn check(session: &SessionStore, route: &Route) -> GuardDecision {
    check_at(session, route, token::now_unix())
}

pub(crate) fn check_at(session: &SessionStore, route: &Route, now: i64) -> GuardDecision {
    if !route.is_protected() {
        return GuardDecision::Allow;
    }
    let Some(raw) = session.token() else {
        return deny(DenyReason::NoToken);
    };
    match token::validate(&raw, now) {
        Ok(_) => GuardDecision::Allow,
        Err(err) => {
            tracing::info!(error = %err, %route, "guard forcing logout");
            session.logout();
            deny(match err {
                TokenError::Malformed(_) => DenyReason::InvalidToken,
                TokenError::Expired { .. } => DenyReason::Expired,
            })
        }
    }
}

fn deny(reason: DenyReason) -> GuardDecision {
    GuardDecision::Redirect { to: Route::Login, reason }
}
