//! Client-side state containers.
//!
//! DESIGN
//! ======
//! `session` is the only state shared across screens; page-local state lives
//! on each controller in `pages`. `storage` abstracts where the token is
//! persisted and `notice` holds per-page notifications.

pub mod notice;
pub mod session;
pub mod storage;
