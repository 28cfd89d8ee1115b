//! Editable user model and its wire projections.
//!
//! # Responsibility
//! - Flatten a persisted user read into the editable shape.
//! - Serialize the editable shape into the update body.
//!
//! # Invariants
//! - Nested division/OU references are reduced to bare identifiers.
//! - The revision marker is replaced by the configured baseline on load;
//!   the server-assigned marker is never resubmitted.
//! - Submitted division ids are canonical strings.

use crate::model::ids::UserId;
use crate::model::membership::Membership;
use crate::model::record::{UserRecord, UserUpdatePayload};
use crate::model::role::Role;

/// In-memory editable copy of one user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableUser {
    pub id: UserId,
    pub username: String,
    /// Opaque stored credential. Never inspected or logged.
    pub password: Option<String>,
    pub role: Role,
    pub membership: Membership,
    pub revision: i64,
}

impl EditableUser {
    /// Projects a persisted read into the editable shape.
    ///
    /// `baseline_revision` replaces whatever marker the server returned.
    pub fn from_record(record: UserRecord, baseline_revision: i64) -> Self {
        let divisions = record.divisions.into_iter().map(|item| item.id).collect();
        let ous = record.ous.into_iter().map(|item| item.id).collect();
        Self {
            id: record.id,
            username: record.username,
            password: record.password,
            role: record.role,
            membership: Membership::new(divisions, ous),
            revision: baseline_revision,
        }
    }

    /// Builds the update body.
    ///
    /// Division ids are normalized to their canonical string form; every
    /// other field passes through unchanged.
    pub fn to_payload(&self) -> UserUpdatePayload {
        let (divisions, ous) = self.membership.clone().into_parts();
        UserUpdatePayload {
            id: self.id.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            role: self.role,
            divisions: divisions
                .iter()
                .map(|id| id.canonical().into_owned())
                .collect(),
            ous,
            revision: self.revision,
        }
    }
}
