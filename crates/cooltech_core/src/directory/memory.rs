//! In-process user directory over a JSON snapshot.
//!
//! # Responsibility
//! - Serve the three directory requests from an owned snapshot.
//! - Re-denormalize submitted identifiers into nested references on update.
//!
//! # Invariants
//! - Updates referencing unknown divisions or OUs are rejected with 400 and
//!   leave the snapshot unchanged.
//! - Every accepted update bumps the stored revision by one.

use crate::config::{read_file, ConfigError};
use crate::directory::backend::{DirectoryBackend, TransportError, TransportResult};
use crate::model::ids::{RecordId, UserId};
use crate::model::record::{DivisionRecord, MemberRef, UserRecord, UserUpdatePayload};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Users and divisions as stored by the directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub divisions: Vec<DivisionRecord>,
}

impl DirectorySnapshot {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(Into::into)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = read_file(path.as_ref())?;
        Self::from_json_str(raw.as_str())
    }

    pub fn user(&self, id: &UserId) -> Option<&UserRecord> {
        self.users.iter().find(|user| &user.id == id)
    }
}

/// Snapshot-backed directory implementing [`DirectoryBackend`].
#[derive(Debug)]
pub struct InMemoryDirectory {
    state: Mutex<DirectorySnapshot>,
    authorized: AtomicBool,
}

impl InMemoryDirectory {
    pub fn new(snapshot: DirectorySnapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
            authorized: AtomicBool::new(true),
        }
    }

    /// Makes every later request answer unauthorized (or serve again).
    pub fn set_authorized(&self, authorized: bool) {
        self.authorized.store(authorized, Ordering::SeqCst);
    }

    /// Returns a copy of the current stored state.
    pub fn snapshot(&self) -> TransportResult<DirectorySnapshot> {
        self.with_state(|state| Ok(state.clone()))
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut DirectorySnapshot) -> TransportResult<T>,
    ) -> TransportResult<T> {
        if !self.authorized.load(Ordering::SeqCst) {
            return Err(TransportError::Unauthorized);
        }
        let mut guard = self
            .state
            .lock()
            .map_err(|_| TransportError::Network("directory state lock poisoned".to_string()))?;
        f(&mut *guard)
    }
}

impl DirectoryBackend for InMemoryDirectory {
    fn fetch_user(&self, id: &UserId) -> TransportResult<UserRecord> {
        self.with_state(|state| state.user(id).cloned().ok_or(TransportError::Status(404)))
    }

    fn fetch_divisions(&self) -> TransportResult<Vec<DivisionRecord>> {
        self.with_state(|state| Ok(state.divisions.clone()))
    }

    fn update_user(
        &self,
        id: &UserId,
        payload: &UserUpdatePayload,
    ) -> TransportResult<UserRecord> {
        self.with_state(|state| {
            let divisions = payload
                .divisions
                .iter()
                .map(|raw| resolve_division(&state.divisions, &RecordId::from(raw.as_str())))
                .collect::<TransportResult<Vec<_>>>()?;
            let ous = payload
                .ous
                .iter()
                .map(|ou| resolve_ou(&state.divisions, ou))
                .collect::<TransportResult<Vec<_>>>()?;

            let user = state
                .users
                .iter_mut()
                .find(|user| &user.id == id)
                .ok_or(TransportError::Status(404))?;
            let next_revision = user.revision.unwrap_or(0) + 1;
            debug!(
                "event=directory_update module=directory status=ok user={} submitted_revision={} stored_revision={}",
                id, payload.revision, next_revision
            );

            user.username = payload.username.clone();
            if payload.password.is_some() {
                user.password = payload.password.clone();
            }
            user.role = payload.role;
            user.divisions = divisions;
            user.ous = ous;
            user.revision = Some(next_revision);
            Ok(user.clone())
        })
    }
}

fn resolve_division(divisions: &[DivisionRecord], id: &RecordId) -> TransportResult<MemberRef> {
    divisions
        .iter()
        .find(|division| &division.id == id)
        .map(|division| MemberRef::new(division.id.clone(), Some(division.name.clone())))
        .ok_or_else(|| {
            warn!("event=directory_update module=directory status=rejected unknown_division={id}");
            TransportError::Status(400)
        })
}

fn resolve_ou(divisions: &[DivisionRecord], id: &RecordId) -> TransportResult<MemberRef> {
    divisions
        .iter()
        .filter_map(|division| division.ou.as_ref())
        .find(|ou| &ou.id == id)
        .map(|ou| MemberRef::new(ou.id.clone(), Some(ou.name.clone())))
        .ok_or_else(|| {
            warn!("event=directory_update module=directory status=rejected unknown_ou={id}");
            TransportError::Status(400)
        })
}

#[cfg(test)]
mod tests {
    use super::{DirectorySnapshot, InMemoryDirectory};
    use crate::directory::backend::{DirectoryBackend, TransportError};
    use crate::model::ids::RecordId;
    use crate::model::record::UserUpdatePayload;
    use crate::model::role::Role;

    const SNAPSHOT: &str = r#"{
        "users": [
            {"_id": "u1", "username": "ann", "password": "hash", "role": "Normal",
             "divisions": [], "ous": [], "__v": 4}
        ],
        "divisions": [
            {"_id": "d1", "name": "Finance", "ou": {"_id": "A", "name": "News management"}},
            {"_id": 7, "name": "IT", "ou": {"_id": "A", "name": "News management"}}
        ]
    }"#;

    fn payload(divisions: &[&str], ous: &[&str]) -> UserUpdatePayload {
        UserUpdatePayload {
            id: "u1".into(),
            username: "ann".to_string(),
            password: None,
            role: Role::Management,
            divisions: divisions.iter().map(|value| value.to_string()).collect(),
            ous: ous.iter().map(|value| RecordId::from(*value)).collect(),
            revision: 0,
        }
    }

    #[test]
    fn update_denormalizes_ids_and_bumps_revision() {
        let directory = InMemoryDirectory::new(DirectorySnapshot::from_json_str(SNAPSHOT).unwrap());

        let stored = directory
            .update_user(&"u1".into(), &payload(&["d1", "7"], &["A"]))
            .unwrap();
        assert_eq!(stored.role, Role::Management);
        assert_eq!(stored.divisions.len(), 2);
        assert_eq!(stored.divisions[1].name.as_deref(), Some("IT"));
        assert_eq!(stored.ous[0].name.as_deref(), Some("News management"));
        assert_eq!(stored.revision, Some(5));
        assert_eq!(stored.password.as_deref(), Some("hash"));
    }

    #[test]
    fn update_with_unknown_division_is_rejected_without_change() {
        let directory = InMemoryDirectory::new(DirectorySnapshot::from_json_str(SNAPSHOT).unwrap());

        let err = directory
            .update_user(&"u1".into(), &payload(&["d9"], &[]))
            .unwrap_err();
        assert_eq!(err, TransportError::Status(400));
        let snapshot = directory.snapshot().unwrap();
        assert_eq!(snapshot.users[0].role, Role::Normal);
    }

    #[test]
    fn unauthorized_mode_rejects_every_request() {
        let directory = InMemoryDirectory::new(DirectorySnapshot::default());
        directory.set_authorized(false);

        assert_eq!(
            directory.fetch_divisions().unwrap_err(),
            TransportError::Unauthorized
        );
        assert_eq!(
            directory.fetch_user(&"u1".into()).unwrap_err(),
            TransportError::Unauthorized
        );
    }

    #[test]
    fn missing_user_is_not_found() {
        let directory = InMemoryDirectory::new(DirectorySnapshot::from_json_str(SNAPSHOT).unwrap());
        assert_eq!(
            directory.fetch_user(&"nobody".into()).unwrap_err(),
            TransportError::Status(404)
        );
    }
}
