//! Infrastructure layer for Banter.
//!
//! Contains implementations of the capability traits defined in `banter-core`:
//! the SQLite Message Store, the OpenAI-compatible completion gateway, the
//! SQLite session store, and configuration loading.

pub mod config;
pub mod llm;
pub mod sqlite;
