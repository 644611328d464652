//! Session store: current bearer token, its decoded expiry, and the user.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `SessionStore` is created at startup and cloned into the API client,
//! the route guard and every page controller. Clones share state.
//!
//! INVARIANTS
//! ==========
//! - `user` is only populated while a token is present and unexpired.
//! - A token whose expiry is at or before "now", or that fails to decode, is
//!   never kept: accepting it tears the session down instead.
//! - Whenever a valid token is held it is also persisted; whenever no token is
//!   held the persisted entry is removed.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::net::types::User;
use crate::state::storage::TokenStorage;
use crate::util::token::{self, TokenClaims, TokenError};

/// Point-in-time copy of the session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub claims: Option<TokenClaims>,
    pub user: Option<User>,
}

impl Session {
    /// True when a token is held and its expiry is after `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: i64) -> bool {
        self.token.is_some() && self.claims.as_ref().is_some_and(|c| c.exp > now)
    }
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<Session>>,
    storage: Arc<dyn TokenStorage>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.lock();
        f.debug_struct("SessionStore")
            .field("has_token", &session.token.is_some())
            .field("user", &session.user.as_ref().map(|u| u.username.as_str()))
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Initialize from durable storage, applying the usual validity check.
    #[must_use]
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self::restore_at(storage, token::now_unix())
    }

    pub(crate) fn restore_at(storage: Arc<dyn TokenStorage>, now: i64) -> Self {
        let store = Self { inner: Arc::new(Mutex::new(Session::default())), storage };
        match store.storage.load() {
            Ok(Some(raw)) => {
                if let Err(err) = store.set_token_at(raw, now) {
                    tracing::info!(error = %err, "discarded persisted token");
                }
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "could not read persisted token"),
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Tear the session down if the held token has lapsed by `now`.
    /// Returns whether a live session remains.
    fn ensure_live_at(&self, now: i64) -> bool {
        let lapsed = {
            let session = self.lock();
            if session.token.is_none() {
                return false;
            }
            !session.is_valid_at(now)
        };
        if lapsed {
            tracing::warn!("held token expired");
            self.logout();
        }
        !lapsed
    }

    /// Copy of the session after the expiry check.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.snapshot_at(token::now_unix())
    }

    pub(crate) fn snapshot_at(&self, now: i64) -> Session {
        self.ensure_live_at(now);
        self.lock().clone()
    }

    /// Raw token as held, without re-checking expiry. The route guard
    /// classifies it itself.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.user_at(token::now_unix())
    }

    pub(crate) fn user_at(&self, now: i64) -> Option<User> {
        if self.ensure_live_at(now) { self.lock().user.clone() } else { None }
    }

    /// True while an unexpired token is held; a lapsed one is torn down here.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.is_signed_in_at(token::now_unix())
    }

    pub(crate) fn is_signed_in_at(&self, now: i64) -> bool {
        self.ensure_live_at(now)
    }

    /// Hold `raw` without decoding it, as a corrupted store would.
    #[cfg(test)]
    pub(crate) fn seed_raw_token(&self, raw: &str) {
        self.lock().token = Some(raw.to_owned());
    }

    /// Accept a new token.
    ///
    /// # Errors
    ///
    /// Returns the decode/expiry failure after tearing the session down.
    pub fn set_token(&self, raw: String) -> Result<TokenClaims, TokenError> {
        self.set_token_at(raw, token::now_unix())
    }

    pub(crate) fn set_token_at(&self, raw: String, now: i64) -> Result<TokenClaims, TokenError> {
        let claims = match token::validate(&raw, now) {
            Ok(claims) => claims,
            Err(err) => {
                tracing::warn!(error = %err, "rejecting token");
                self.logout();
                return Err(err);
            }
        };

        {
            let mut session = self.lock();
            if session.token.as_deref() != Some(raw.as_str()) {
                session.user = None;
            }
            session.token = Some(raw.clone());
            session.claims = Some(claims.clone());
        }
        if let Err(err) = self.storage.store(&raw) {
            tracing::warn!(error = %err, "could not persist token");
        }
        tracing::info!(exp = claims.exp, "session token accepted");
        Ok(claims)
    }

    /// Token to present on an outbound call, if one is held and still valid.
    ///
    /// An expired token found here tears the session down; the caller sees
    /// `Err` so it can report the forced logout.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Expired`] when the held token has lapsed.
    pub fn bearer(&self) -> Result<Option<String>, TokenError> {
        self.bearer_at(token::now_unix())
    }

    pub(crate) fn bearer_at(&self, now: i64) -> Result<Option<String>, TokenError> {
        let (token, exp) = {
            let session = self.lock();
            match (&session.token, &session.claims) {
                (Some(token), Some(claims)) => (token.clone(), claims.exp),
                _ => return Ok(None),
            }
        };
        if exp <= now {
            tracing::warn!(exp, "held token expired");
            self.logout();
            return Err(TokenError::Expired { exp });
        }
        Ok(Some(token))
    }

    /// Attach the profile fetched for the current token.
    ///
    /// Returns `false` (and leaves no user behind) when no valid token is held.
    pub fn set_user(&self, user: User) -> bool {
        self.set_user_at(user, token::now_unix())
    }

    pub(crate) fn set_user_at(&self, user: User, now: i64) -> bool {
        let mut session = self.lock();
        if session.is_valid_at(now) {
            session.user = Some(user);
            true
        } else {
            session.user = None;
            false
        }
    }

    /// Clear token, claims, user and persisted storage. Idempotent.
    pub fn logout(&self) {
        let had_token = {
            let mut session = self.lock();
            let had = session.token.is_some();
            *session = Session::default();
            had
        };
        if let Err(err) = self.storage.clear() {
            tracing::warn!(error = %err, "could not clear persisted token");
        }
        if had_token {
            tracing::info!("session cleared");
        }
    }
}
