//! Domain model for the user membership editor.
//!
//! # Responsibility
//! - Define the wire shapes read from and written to the user directory.
//! - Define the editable user and its membership sets.
//!
//! # Invariants
//! - Identifiers compare by canonical string form.
//! - E1 (OU listed iff one of its divisions is selected) is owned by
//!   `membership`.

pub mod ids;
pub mod membership;
pub mod record;
pub mod role;
pub mod user;
