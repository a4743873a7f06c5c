//! Conversation flow: context assembly and the send/history/clear service.

pub mod context;
pub mod service;
