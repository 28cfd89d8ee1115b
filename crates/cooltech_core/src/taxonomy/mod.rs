//! Division taxonomy reference data.
//!
//! # Responsibility
//! - Group the flat division list by owning organizational unit.
//! - Serve read-only lookups for selection and rendering.
//!
//! # Invariants
//! - The index is built once per session and never mutated afterwards.
//! - OUs are never stored separately; they are derived from divisions.

mod index;

pub use index::{Division, DivisionGroup, OrgUnit, TaxonomyError, TaxonomyIndex};
