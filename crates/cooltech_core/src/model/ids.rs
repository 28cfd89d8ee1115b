//! Record identifiers as they travel over the wire.
//!
//! # Responsibility
//! - Accept identifiers encoded as JSON strings or JSON integers.
//! - Provide one canonical string form used for comparison and submission.
//!
//! # Invariants
//! - Two identifiers are equal iff their canonical forms are equal, so
//!   `42` and `"42"` name the same record.
//! - `Hash` agrees with `Eq` (both operate on the canonical form).

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// Opaque record identifier.
///
/// The backing store emits string ids, but fixtures and older payloads may
/// carry bare integers. Both shapes are preserved until submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Text(String),
    Number(i64),
}

/// Identifier of the user record being edited.
pub type UserId = RecordId;
/// Identifier of one division (leaf item).
pub type DivisionId = RecordId;
/// Identifier of one organizational unit (parent group).
pub type OuId = RecordId;

impl RecordId {
    /// Returns the canonical string form.
    pub fn canonical(&self) -> Cow<'_, str> {
        match self {
            Self::Text(value) => Cow::Borrowed(value.as_str()),
            Self::Number(value) => Cow::Owned(value.to_string()),
        }
    }

    /// Returns a string-typed copy of this identifier.
    pub fn to_canonical(&self) -> RecordId {
        Self::Text(self.canonical().into_owned())
    }
}

impl PartialEq for RecordId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(left), Self::Text(right)) => left == right,
            (Self::Number(left), Self::Number(right)) => left == right,
            _ => self.canonical() == other.canonical(),
        }
    }
}

impl Eq for RecordId {}

impl Hash for RecordId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().as_ref().hash(state);
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.canonical().as_ref())
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for RecordId {
    fn from(value: i32) -> Self {
        Self::Number(i64::from(value))
    }
}
