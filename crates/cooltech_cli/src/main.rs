//! Local host for the user edit session.
//!
//! # Responsibility
//! - Drive one edit session against a JSON directory snapshot.
//! - Print the form as text and the submission outcome.

use anyhow::{bail, Context};
use clap::Parser;
use cooltech_core::{
    default_log_level, init_logging, DirectoryBackend, DirectorySnapshot, EditSession,
    InMemoryDirectory, InMemorySessionStore, RecordId, RecordingNavigator, Role, SessionConfig,
    SessionPhase,
};
use log::info;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "cooltech", version, about = "Edit a user's role and division membership")]
struct Args {
    /// Directory snapshot JSON (`{"users": [...], "divisions": [...]}`).
    #[arg(long)]
    snapshot: PathBuf,
    /// Id of the signed-in caller.
    #[arg(long)]
    caller: String,
    /// Id of the user to edit.
    #[arg(long)]
    user: String,
    /// New role for the edited user.
    #[arg(long)]
    role: Option<Role>,
    /// Division checkbox to toggle, as `<division>:<ou>`. Repeatable.
    #[arg(long = "toggle", value_parser = parse_toggle)]
    toggles: Vec<(RecordId, RecordId)>,
    /// Submit the edits.
    #[arg(long)]
    submit: bool,
    /// Print the submitted body as JSON.
    #[arg(long)]
    print_payload: bool,
    /// Session config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Absolute directory for rolling log files.
    #[arg(long)]
    log_dir: Option<String>,
    #[arg(long)]
    log_level: Option<String>,
}

fn parse_toggle(raw: &str) -> Result<(RecordId, RecordId), String> {
    match raw.split_once(':') {
        Some((division, ou)) if !division.trim().is_empty() && !ou.trim().is_empty() => {
            Ok((division.trim().into(), ou.trim().into()))
        }
        _ => Err(format!("expected `<division>:<ou>`, got `{raw}`")),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(log_dir) = args.log_dir.as_deref() {
        let level = args.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).context("failed to initialize logging")?;
    }

    let config = match args.config.as_ref() {
        Some(path) => SessionConfig::from_json_file(path)?,
        None => SessionConfig::default(),
    };
    let snapshot = DirectorySnapshot::from_json_file(&args.snapshot)
        .with_context(|| format!("failed to load snapshot `{}`", args.snapshot.display()))?;

    let caller_id = RecordId::from(args.caller.as_str());
    let caller = snapshot.user(&caller_id).cloned();
    if caller.is_none() {
        bail!("caller `{caller_id}` is not in the snapshot");
    }

    let store = InMemorySessionStore::new(caller);
    let navigator = RecordingNavigator::new();
    let directory = InMemoryDirectory::new(snapshot);
    let mut session = EditSession::start(
        &directory,
        &store,
        &navigator,
        config,
        RecordId::from(args.user.as_str()),
    );
    info!(
        "event=cli_session module=cli status=started session={}",
        session.session_id()
    );

    if let SessionPhase::Redirected(route) = session.phase() {
        println!("redirected to {route}");
        return Ok(());
    }

    session.load()?;
    if let Some(role) = args.role {
        session.set_role(role)?;
    }
    for (division, ou) in &args.toggles {
        session.toggle_division(division, ou)?;
    }

    if let Some(view) = session.view() {
        println!("{view}");
    }

    if !args.submit {
        return Ok(());
    }

    let (ticket, payload) = session.begin_submit()?;
    if args.print_payload {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }
    let response = directory.update_user(session.target(), &payload);
    let outcome = session.finish_submit(ticket, response)?;
    println!(
        "{} (shown for {} ms)",
        outcome.notice.message,
        outcome.notice.duration.as_millis()
    );
    if outcome.identity_refreshed {
        println!("session identity refreshed");
    }
    Ok(())
}
