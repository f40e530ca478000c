//! Taskdeck server library.
//!
//! Exposes the task ordering store and HTTP API for use in tests and
//! embedding. The store owns all position-assignment and ordering logic;
//! the API layer maps routes 1:1 onto store operations.

pub mod api;
pub mod config;
pub mod snapshot;
pub mod store;
