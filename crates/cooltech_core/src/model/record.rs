//! Wire shapes exchanged with the user directory backend.
//!
//! # Responsibility
//! - Mirror the persisted (denormalized) representation returned by reads.
//! - Define the flat submission body accepted by the update endpoint.
//!
//! # Invariants
//! - Read shapes keep nested references; only `model::user` flattens them.
//! - `divisions` in a submission body are always canonical strings.
//! - Unknown fields in read payloads are ignored.

use crate::model::ids::{DivisionId, OuId, RecordId, UserId};
use crate::model::role::Role;
use serde::{Deserialize, Serialize};

/// Nested reference to a division or organizational unit inside a user read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl MemberRef {
    pub fn new(id: impl Into<RecordId>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            name,
        }
    }
}

/// Organizational unit as embedded in a division record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OuRecord {
    #[serde(rename = "_id")]
    pub id: OuId,
    pub name: String,
}

/// Division as returned by the taxonomy endpoint.
///
/// `ou` is optional on the wire so a missing parent reference surfaces as a
/// taxonomy precondition violation naming the division, not a decode error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionRecord {
    #[serde(rename = "_id")]
    pub id: DivisionId,
    pub name: String,
    #[serde(default)]
    pub ou: Option<OuRecord>,
}

impl DivisionRecord {
    pub fn new(id: impl Into<DivisionId>, name: impl Into<String>, ou: OuRecord) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ou: Some(ou),
        }
    }
}

/// Persisted user record with populated division/OU references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub username: String,
    /// Stored credential, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: Role,
    pub divisions: Vec<MemberRef>,
    pub ous: Vec<MemberRef>,
    #[serde(rename = "__v", default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<i64>,
}

/// Flat update body sent to the update endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdatePayload {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: Role,
    pub divisions: Vec<String>,
    pub ous: Vec<OuId>,
    #[serde(rename = "__v")]
    pub revision: i64,
}
