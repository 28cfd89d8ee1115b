//! Selection synchronization for division checkboxes.
//!
//! # Responsibility
//! - Apply one division toggle to a membership and re-derive its OU.
//!
//! # Invariants
//! - Toggling is a pure function of (membership, index, division, ou).
//! - After a toggle, E1 holds for the toggled OU.

mod synchronizer;

pub use synchronizer::{toggle, SelectionError};
