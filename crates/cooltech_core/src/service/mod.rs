//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate directory requests, taxonomy and selection into the user
//!   edit use-case.
//! - Keep hosts decoupled from transport and rendering details.

pub mod edit_session;
pub mod form_view;
