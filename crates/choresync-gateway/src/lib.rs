//! HTTP/REST gateway for ChoreSync.
//!
//! Exposes liveness, the document-created trigger endpoints, and a manual
//! reminder scan.

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
