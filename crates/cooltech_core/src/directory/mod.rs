//! User directory access.
//!
//! # Responsibility
//! - Define the request contract the edit session consumes.
//! - Provide a snapshot-backed implementation for local hosts and tests.
//!
//! # Invariants
//! - Backends report unauthorized responses as `TransportError::Unauthorized`
//!   so redirect policy stays in one place.

pub mod backend;
pub mod memory;
