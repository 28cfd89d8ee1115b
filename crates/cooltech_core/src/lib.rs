//! Core domain logic for the CoolTech user membership editor.
//! This crate is the single source of truth for membership invariants.

pub mod config;
pub mod directory;
pub mod logging;
pub mod model;
pub mod selection;
pub mod service;
pub mod session;
pub mod taxonomy;

pub use config::{ConfigError, SessionConfig};
pub use directory::backend::{decode_body, DirectoryBackend, TransportError, TransportResult};
pub use directory::memory::{DirectorySnapshot, InMemoryDirectory};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::ids::{DivisionId, OuId, RecordId, UserId};
pub use model::membership::{Membership, MembershipViolation, OuRepair};
pub use model::record::{DivisionRecord, MemberRef, OuRecord, UserRecord, UserUpdatePayload};
pub use model::role::{Role, RoleParseError};
pub use model::user::EditableUser;
pub use selection::{toggle, SelectionError};
pub use service::edit_session::{
    EditSession, Notice, RequestKind, RequestTicket, SessionError, SessionPhase, SessionResult,
    SubmitOutcome,
};
pub use service::form_view::{CheckboxView, FormView, GroupView, RoleOption};
pub use session::{InMemorySessionStore, Navigator, RecordingNavigator, SessionStore};
pub use taxonomy::{Division, DivisionGroup, OrgUnit, TaxonomyError, TaxonomyIndex};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
