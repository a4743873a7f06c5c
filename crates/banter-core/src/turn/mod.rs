//! Chat turn persistence abstractions.
//!
//! Defines the `TurnRepository` trait (the Message Store port) that the
//! infrastructure layer implements.

pub mod repository;
