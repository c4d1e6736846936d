//! HTTP endpoint handlers for the SA Commerce API.

pub mod orders;
pub mod tickets;
