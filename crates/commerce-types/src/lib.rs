//! Common types module for the SA Commerce service.
//!
//! This module defines the core data types and structures shared across
//! the service. It provides a centralized location for domain types,
//! API payloads, and configuration validation to ensure consistency
//! across all components.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Order types including line items, shipping details, and tracking history.
pub mod order;
/// Registry trait for self-registering backend implementations.
pub mod registry;
/// Support ticket types for the customer help desk.
pub mod ticket;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;

// Re-export all types for convenient access
pub use api::*;
pub use order::*;
pub use registry::*;
pub use ticket::*;
pub use validation::*;
