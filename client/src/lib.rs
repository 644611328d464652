//! Pinboard client library.
//!
//! SYSTEM CONTEXT
//! ==============
//! Everything a front end needs to talk to the pin-sharing backend: a session
//! store with durable token persistence, an authenticated API client that
//! reports unauthorized responses as events, a route guard, and one controller
//! per screen with explicit `load` operations. Rendering is left to the shell
//! (the `pinboard` CLI ships in this workspace).
//!
//! ```text
//!  App ──navigate──► guard ──allow──► pages::* ──load/mutate──► ApiClient
//!   ▲                                                             │
//!   └──────────── AuthEvent::Unauthorized ◄── 401 interception ───┘
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use app::{App, View};
pub use config::ClientConfig;
pub use error::ClientError;
pub use net::api::{ApiClient, AuthEvent};
pub use net::transport::{HttpTransport, ReqwestTransport};
pub use state::session::SessionStore;
pub use state::storage::{FileStorage, MemoryStorage, TokenStorage};
