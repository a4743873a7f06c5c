//! HTTP layer for Banter.
//!
//! Axum router serving the chat page and the two JSON endpoints, a cookie
//! based session extractor, and the `{"error": ...}` failure shape.

pub mod error;
pub mod handlers;
pub mod router;
pub mod session;
