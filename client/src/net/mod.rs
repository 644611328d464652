//! Networking modules for the backend REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` moves bytes (reqwest in production, scripted mocks in tests),
//! `api` owns endpoint paths, bearer injection and unauthorized interception,
//! and `types` defines the wire schema.

pub mod api;
pub mod transport;
pub mod types;
