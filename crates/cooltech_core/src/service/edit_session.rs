//! User edit session controller.
//!
//! # Responsibility
//! - Own the editable user copy and the taxonomy index for one session.
//! - Drive the `Loading -> Ready -> Submitting -> (Ready | SubmittedOk)`
//!   lifecycle and route backend failures to the right outcome.
//! - Propagate a successful self-edit into the caller's session store.
//!
//! # Invariants
//! - The caller's role is checked once, at `start`. Non-admin callers never
//!   reach `Ready`.
//! - Unauthorized responses from any request redirect and discard all work.
//! - A failed response never overwrites the last good snapshot.
//! - Responses are applied only when their ticket carries the current epoch;
//!   redirect and close bump the epoch.
//! - E1 holds for the draft once it is `Ready`: the OU set is re-derived
//!   from the selected divisions on load and again before submission.
//! - The draft id is always the session target.

use crate::config::SessionConfig;
use crate::directory::backend::{DirectoryBackend, TransportError, TransportResult};
use crate::model::ids::{DivisionId, OuId, UserId};
use crate::model::record::{DivisionRecord, UserRecord, UserUpdatePayload};
use crate::model::role::Role;
use crate::model::user::EditableUser;
use crate::selection::{toggle, SelectionError};
use crate::service::form_view::FormView;
use crate::session::{Navigator, SessionStore};
use crate::taxonomy::{TaxonomyError, TaxonomyIndex};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use uuid::Uuid;

pub type SessionResult<T> = Result<T, SessionError>;

/// Lifecycle phase of an edit session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for the user snapshot and/or the taxonomy.
    Loading,
    /// Editable.
    Ready,
    /// A submission is outstanding.
    Submitting,
    /// Last submission succeeded; terminal.
    SubmittedOk,
    /// Session navigated away to the given route; terminal.
    Redirected(String),
    /// Host tore the session down; terminal.
    Closed,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Submitting => "submitting",
            Self::SubmittedOk => "submitted_ok",
            Self::Redirected(_) => "redirected",
            Self::Closed => "closed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::SubmittedOk | Self::Redirected(_) | Self::Closed)
    }
}

/// Kind of backend request a ticket was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Entity,
    Taxonomy,
    Submit,
}

impl RequestKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Taxonomy => "taxonomy",
            Self::Submit => "submit",
        }
    }
}

/// Handle tying a backend response to the session epoch it was issued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    epoch: u64,
    kind: RequestKind,
}

impl RequestTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}

/// Transient confirmation shown after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub duration: Duration,
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Record returned by the backend.
    pub record: UserRecord,
    /// `true` when the record replaced the caller's session identity.
    pub identity_refreshed: bool,
    pub notice: Notice,
}

/// Edit session errors.
#[derive(Debug)]
pub enum SessionError {
    /// Operation is not allowed in the current phase.
    NotReady { phase: &'static str },
    /// Session navigated away; all in-progress work was discarded.
    Redirected { route: String },
    /// Response arrived for a superseded request and was ignored.
    StaleResponse { kind: RequestKind },
    /// Backend request failed; session state is unchanged.
    Transport(TransportError),
    /// Taxonomy response violated its preconditions.
    Taxonomy(TaxonomyError),
    /// Toggle did not match the taxonomy.
    Selection(SelectionError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotReady { phase } => write!(f, "edit session is not ready (phase: {phase})"),
            Self::Redirected { route } => write!(f, "edit session redirected to {route}"),
            Self::StaleResponse { kind } => {
                write!(f, "discarded stale {} response", kind.as_str())
            }
            Self::Transport(err) => write!(f, "{err}"),
            Self::Taxonomy(err) => write!(f, "{err}"),
            Self::Selection(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Taxonomy(err) => Some(err),
            Self::Selection(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaxonomyError> for SessionError {
    fn from(value: TaxonomyError) -> Self {
        Self::Taxonomy(value)
    }
}

impl From<SelectionError> for SessionError {
    fn from(value: SelectionError) -> Self {
        Self::Selection(value)
    }
}

/// Controller for editing one user's role and division membership.
pub struct EditSession<B: DirectoryBackend, S: SessionStore, N: Navigator> {
    backend: B,
    store: S,
    navigator: N,
    config: SessionConfig,
    target: UserId,
    session_id: Uuid,
    epoch: u64,
    phase: SessionPhase,
    draft: Option<EditableUser>,
    taxonomy: Option<TaxonomyIndex>,
}

impl<B: DirectoryBackend, S: SessionStore, N: Navigator> EditSession<B, S, N> {
    /// Opens a session for `target` and runs the advisory role check.
    ///
    /// A non-admin caller is redirected to `config.non_admin_route`; a
    /// signed-out caller to `config.unauthenticated_route`. Either way the
    /// session is terminal before any user data is requested.
    pub fn start(
        backend: B,
        store: S,
        navigator: N,
        config: SessionConfig,
        target: UserId,
    ) -> Self {
        let mut session = Self {
            backend,
            store,
            navigator,
            config,
            target,
            session_id: Uuid::new_v4(),
            epoch: 0,
            phase: SessionPhase::Loading,
            draft: None,
            taxonomy: None,
        };

        match session.store.get() {
            Some(caller) if caller.role.is_admin() => {
                info!(
                    "event=session_start module=edit_session status=ok session={} target={} caller={}",
                    session.session_id, session.target, caller.id
                );
            }
            Some(caller) => {
                warn!(
                    "event=session_start module=edit_session status=denied session={} target={} caller={} caller_role={}",
                    session.session_id, session.target, caller.id, caller.role
                );
                let route = session.config.non_admin_route.clone();
                session.redirect(route);
            }
            None => {
                warn!(
                    "event=session_start module=edit_session status=signed_out session={} target={}",
                    session.session_id, session.target
                );
                let route = session.config.unauthenticated_route.clone();
                session.redirect(route);
            }
        }
        session
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn target(&self) -> &UserId {
        &self.target
    }

    /// Correlation id used in log events.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn draft(&self) -> Option<&EditableUser> {
        self.draft.as_ref()
    }

    pub fn taxonomy(&self) -> Option<&TaxonomyIndex> {
        self.taxonomy.as_ref()
    }

    /// Fetches both the user snapshot and the taxonomy.
    ///
    /// Both requests are issued even if the first one fails, unless it
    /// redirected the session. A redirect wins over any other error;
    /// otherwise the first error is returned.
    pub fn load(&mut self) -> SessionResult<()> {
        let entity = self.load_entity();
        if matches!(entity, Err(SessionError::Redirected { .. })) {
            return entity;
        }
        let taxonomy = self.load_taxonomy();
        if matches!(taxonomy, Err(SessionError::Redirected { .. })) {
            return taxonomy;
        }
        entity.and(taxonomy)
    }

    /// Fetches and applies the user snapshot.
    pub fn load_entity(&mut self) -> SessionResult<()> {
        let ticket = self.entity_ticket()?;
        let response = self.backend.fetch_user(&self.target);
        self.apply_entity_response(ticket, response)
    }

    /// Fetches the division list and builds the taxonomy index.
    pub fn load_taxonomy(&mut self) -> SessionResult<()> {
        let ticket = self.taxonomy_ticket()?;
        let response = self.backend.fetch_divisions();
        self.apply_taxonomy_response(ticket, response)
    }

    /// Issues a ticket for a user snapshot request made by the host.
    pub fn entity_ticket(&self) -> SessionResult<RequestTicket> {
        self.load_ticket(RequestKind::Entity)
    }

    /// Issues a ticket for a taxonomy request made by the host.
    pub fn taxonomy_ticket(&self) -> SessionResult<RequestTicket> {
        self.load_ticket(RequestKind::Taxonomy)
    }

    /// Applies a user snapshot response.
    ///
    /// On success the record is flattened and its revision marker replaced
    /// by `config.baseline_revision`. A record carrying another id is still
    /// applied, but the draft keeps the target id.
    pub fn apply_entity_response(
        &mut self,
        ticket: RequestTicket,
        response: TransportResult<UserRecord>,
    ) -> SessionResult<()> {
        self.accept(ticket, RequestKind::Entity)?;
        let record = response.map_err(|err| self.fail_request(RequestKind::Entity, err))?;

        if record.id != self.target {
            warn!(
                "event=entity_loaded module=edit_session status=id_mismatch session={} target={} returned={}",
                self.session_id, self.target, record.id
            );
        }
        let mut user = EditableUser::from_record(record, self.config.baseline_revision);
        user.id = self.target.clone();
        debug!(
            "event=entity_loaded module=edit_session status=ok session={} divisions={} ous={}",
            self.session_id,
            user.membership.divisions().len(),
            user.membership.ous().len()
        );
        self.draft = Some(user);
        self.promote_if_loaded();
        Ok(())
    }

    /// Applies a taxonomy response.
    ///
    /// A division without an OU reference fails the whole build; the session
    /// then stays in `Loading`.
    pub fn apply_taxonomy_response(
        &mut self,
        ticket: RequestTicket,
        response: TransportResult<Vec<DivisionRecord>>,
    ) -> SessionResult<()> {
        self.accept(ticket, RequestKind::Taxonomy)?;
        let items = response.map_err(|err| self.fail_request(RequestKind::Taxonomy, err))?;

        let index = TaxonomyIndex::build(items).map_err(|err| {
            error!(
                "event=taxonomy_build module=edit_session status=error session={} error={}",
                self.session_id, err
            );
            SessionError::from(err)
        })?;
        debug!(
            "event=taxonomy_build module=edit_session status=ok session={} ous={} divisions={}",
            self.session_id,
            index.len(),
            index.division_count()
        );
        self.taxonomy = Some(index);
        self.promote_if_loaded();
        Ok(())
    }

    /// Replaces the role of the edited user.
    pub fn set_role(&mut self, role: Role) -> SessionResult<()> {
        self.ensure_ready()?;
        let draft = self.draft.as_mut().ok_or(SessionError::NotReady {
            phase: self.phase.as_str(),
        })?;
        draft.role = role;
        debug!(
            "event=role_changed module=edit_session status=ok session={} role={}",
            self.session_id, role
        );
        Ok(())
    }

    /// Toggles one division checkbox and re-derives its OU membership.
    ///
    /// A rejected toggle leaves the membership unchanged.
    pub fn toggle_division(&mut self, division: &DivisionId, ou: &OuId) -> SessionResult<()> {
        self.ensure_ready()?;
        let phase = self.phase.as_str();
        let (Some(draft), Some(index)) = (self.draft.as_mut(), self.taxonomy.as_ref()) else {
            return Err(SessionError::NotReady { phase });
        };

        draft.membership = toggle(&draft.membership, index, division, ou)?;
        debug!(
            "event=division_toggled module=edit_session status=ok session={} division={} ou={} selected={} ou_listed={}",
            self.session_id,
            division,
            ou,
            draft.membership.has_division(division),
            draft.membership.has_ou(ou)
        );
        Ok(())
    }

    /// Moves to `Submitting` and returns the update body to transmit.
    ///
    /// The OU set is re-derived from the selected divisions first, so the
    /// body always satisfies E1.
    ///
    /// # Errors
    /// - `NotReady` outside `Ready`.
    pub fn begin_submit(&mut self) -> SessionResult<(RequestTicket, UserUpdatePayload)> {
        self.ensure_ready()?;
        self.reconcile_ous("submit_start");
        let Some(draft) = self.draft.as_ref() else {
            return Err(SessionError::NotReady {
                phase: self.phase.as_str(),
            });
        };
        let payload = draft.to_payload();

        self.phase = SessionPhase::Submitting;
        info!(
            "event=submit_start module=edit_session status=ok session={} target={} divisions={} ous={}",
            self.session_id,
            self.target,
            payload.divisions.len(),
            payload.ous.len()
        );
        Ok((
            RequestTicket {
                epoch: self.epoch,
                kind: RequestKind::Submit,
            },
            payload,
        ))
    }

    /// Applies the update response.
    ///
    /// On success the session becomes `SubmittedOk`; when the edited user is
    /// the caller, the returned record replaces the caller's identity. On
    /// failure the session returns to `Ready` with edits intact (or
    /// redirects on unauthorized) and the epoch moves on, so a duplicate of
    /// the failed response is discarded.
    pub fn finish_submit(
        &mut self,
        ticket: RequestTicket,
        response: TransportResult<UserRecord>,
    ) -> SessionResult<SubmitOutcome> {
        self.accept(ticket, RequestKind::Submit)?;
        let record = match response {
            Ok(record) => record,
            Err(err) => {
                self.epoch += 1;
                self.phase = SessionPhase::Ready;
                return Err(self.fail_request(RequestKind::Submit, err));
            }
        };

        let identity_refreshed = match self.store.get() {
            Some(active) if active.id == self.target => {
                self.store.replace(record.clone());
                true
            }
            _ => false,
        };
        self.phase = SessionPhase::SubmittedOk;
        self.draft = None;
        info!(
            "event=submit_finish module=edit_session status=ok session={} target={} identity_refreshed={}",
            self.session_id, self.target, identity_refreshed
        );

        Ok(SubmitOutcome {
            record,
            identity_refreshed,
            notice: Notice {
                message: self.config.notice_message.clone(),
                duration: self.config.notice_duration(),
            },
        })
    }

    /// Serializes, transmits, and applies the result in one step.
    pub fn submit(&mut self) -> SessionResult<SubmitOutcome> {
        let (ticket, payload) = self.begin_submit()?;
        let response = self.backend.update_user(&self.target, &payload);
        self.finish_submit(ticket, response)
    }

    /// Render model while the form is on screen, `None` while loading or
    /// after the session ended.
    pub fn view(&self) -> Option<FormView> {
        let submit_enabled = match self.phase {
            SessionPhase::Ready => true,
            SessionPhase::Submitting => false,
            _ => return None,
        };
        let draft = self.draft.as_ref()?;
        let index = self.taxonomy.as_ref()?;
        Some(FormView::build(draft, index, submit_enabled))
    }

    /// Tears the session down on navigation away.
    ///
    /// Responses to requests issued before this call are discarded.
    pub fn close(&mut self) {
        if self.phase.is_terminal() && self.phase != SessionPhase::SubmittedOk {
            return;
        }
        self.discard();
        self.phase = SessionPhase::Closed;
        info!(
            "event=session_close module=edit_session status=ok session={}",
            self.session_id
        );
    }

    fn load_ticket(&self, kind: RequestKind) -> SessionResult<RequestTicket> {
        if let SessionPhase::Redirected(route) = &self.phase {
            return Err(SessionError::Redirected {
                route: route.clone(),
            });
        }
        if self.phase != SessionPhase::Loading {
            return Err(SessionError::NotReady {
                phase: self.phase.as_str(),
            });
        }
        Ok(RequestTicket {
            epoch: self.epoch,
            kind,
        })
    }

    fn accept(&self, ticket: RequestTicket, kind: RequestKind) -> SessionResult<()> {
        let expected_phase = match kind {
            RequestKind::Entity | RequestKind::Taxonomy => SessionPhase::Loading,
            RequestKind::Submit => SessionPhase::Submitting,
        };
        if ticket.epoch != self.epoch || ticket.kind != kind || self.phase != expected_phase {
            debug!(
                "event=response_discarded module=edit_session status=stale session={} kind={} ticket_epoch={} epoch={} phase={}",
                self.session_id,
                kind.as_str(),
                ticket.epoch,
                self.epoch,
                self.phase.as_str()
            );
            return Err(SessionError::StaleResponse { kind });
        }
        Ok(())
    }

    fn ensure_ready(&self) -> SessionResult<()> {
        if self.phase != SessionPhase::Ready {
            return Err(SessionError::NotReady {
                phase: self.phase.as_str(),
            });
        }
        Ok(())
    }

    fn promote_if_loaded(&mut self) {
        if self.phase == SessionPhase::Loading && self.draft.is_some() && self.taxonomy.is_some()
        {
            self.reconcile_ous("session_ready");
            self.phase = SessionPhase::Ready;
            info!(
                "event=session_ready module=edit_session status=ok session={}",
                self.session_id
            );
        }
    }

    fn reconcile_ous(&mut self, event: &str) {
        let (Some(draft), Some(index)) = (self.draft.as_mut(), self.taxonomy.as_ref()) else {
            return;
        };
        let repair = draft.membership.reconcile(index);
        if !repair.is_empty() {
            warn!(
                "event={} module=edit_session status=ous_repaired session={} added={:?} dropped={:?}",
                event,
                self.session_id,
                repair.added.iter().map(ToString::to_string).collect::<Vec<_>>(),
                repair.dropped.iter().map(ToString::to_string).collect::<Vec<_>>()
            );
        }
    }

    fn fail_request(&mut self, kind: RequestKind, err: TransportError) -> SessionError {
        if err == TransportError::Unauthorized {
            let route = self.config.unauthenticated_route.clone();
            warn!(
                "event=request_failed module=edit_session status=unauthorized session={} kind={} route={}",
                self.session_id,
                kind.as_str(),
                route
            );
            self.redirect(route.clone());
            return SessionError::Redirected { route };
        }
        warn!(
            "event=request_failed module=edit_session status=error session={} kind={} error={}",
            self.session_id,
            kind.as_str(),
            err
        );
        SessionError::Transport(err)
    }

    fn redirect(&mut self, route: String) {
        self.discard();
        self.navigator.navigate(route.as_str());
        self.phase = SessionPhase::Redirected(route);
    }

    fn discard(&mut self) {
        self.epoch += 1;
        self.draft = None;
        self.taxonomy = None;
    }
}
