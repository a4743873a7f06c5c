//! Shared domain types for Banter.
//!
//! Chat turns, role-tagged completion messages, configuration, and the error
//! taxonomy shared by every layer.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod error;
pub mod llm;
pub mod turn;
