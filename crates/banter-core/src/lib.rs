//! Business logic and capability trait definitions for Banter.
//!
//! This crate defines the "ports" (Message Store, session state, completion
//! gateway) that the infrastructure layer implements, plus the conversation
//! flow built on top of them. It depends only on `banter-types` -- never on
//! `banter-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
pub mod session;
pub mod turn;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
