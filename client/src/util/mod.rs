//! Helpers shared across page controllers.
//!
//! SYSTEM CONTEXT
//! ==============
//! `token` and `guard` implement the session validity rules, `route` is the
//! navigation table, and `share` abstracts the platform share capability.

pub mod guard;
pub mod route;
pub mod share;
pub mod token;
