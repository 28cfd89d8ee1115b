//! Host-side collaborators shared with the edit session.
//!
//! # Responsibility
//! - Define the caller's active-session identity store.
//! - Define navigation requested by the edit session (redirects).
//!
//! # Invariants
//! - The edit session only calls `SessionStore::replace` after a successful
//!   self-edit submission.

use crate::model::record::UserRecord;
use std::sync::Mutex;

/// Caller's active-session identity, shared with the hosting application.
pub trait SessionStore {
    /// Returns the signed-in caller's record, `None` when signed out.
    fn get(&self) -> Option<UserRecord>;
    /// Replaces the signed-in caller's record.
    fn replace(&self, record: UserRecord);
}

/// Navigation requested by the edit session.
pub trait Navigator {
    fn navigate(&self, route: &str);
}

impl<T: SessionStore + ?Sized> SessionStore for &T {
    fn get(&self) -> Option<UserRecord> {
        (**self).get()
    }

    fn replace(&self, record: UserRecord) {
        (**self).replace(record)
    }
}

impl<T: Navigator + ?Sized> Navigator for &T {
    fn navigate(&self, route: &str) {
        (**self).navigate(route)
    }
}

/// Process-local identity store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    active: Mutex<Option<UserRecord>>,
}

impl InMemorySessionStore {
    pub fn new(active: Option<UserRecord>) -> Self {
        Self {
            active: Mutex::new(active),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self) -> Option<UserRecord> {
        self.active
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn replace(&self, record: UserRecord) {
        let mut guard = self
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(record);
    }
}

/// Navigator that records requested routes instead of moving anywhere.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes requested so far, oldest first.
    pub fn routes(&self) -> Vec<String> {
        self.routes
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn last_route(&self) -> Option<String> {
        self.routes().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(route.to_string());
    }
}
