//! Plumbing shared by the one-shot commands.

use std::sync::Arc;

use crate::cli::error::CliError;
use crate::cli::render;
use crate::configuration::Settings;
use crate::controller::{Controller, Outcome};
use crate::gateway::HttpGateway;
use crate::models::ConversationId;

/// Commands run on a single-threaded runtime: every request suspends only the
/// flow that issued it.
pub fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(format!("Failed to create async runtime: {}", e)))
}

pub fn controller(settings: &Settings) -> Result<Controller, CliError> {
    let gateway = HttpGateway::from_settings(settings).map_err(|e| CliError::RequestFailed {
        action: "set up the HTTP client",
        source: e,
    })?;
    Ok(Controller::with_default_title(
        Arc::new(gateway),
        &settings.default_title,
    ))
}

pub fn print_notices(ctl: &Controller) {
    for notice in ctl.take_notices() {
        eprintln!("{}", render::notice(&notice));
    }
}

/// Maps an operation outcome to the command result. On failure the pending
/// notices are dropped: the returned error already carries the same message.
pub fn finish(ctl: &Controller, action: &'static str, outcome: Outcome) -> Result<(), CliError> {
    match outcome {
        Outcome::Failed(source) => {
            ctl.take_notices();
            Err(CliError::RequestFailed { action, source })
        }
        Outcome::Applied | Outcome::Skipped(_) => {
            print_notices(ctl);
            Ok(())
        }
    }
}

/// Fetches the list with `id` preferred, which selects it and loads its
/// messages. Fails when the server does not know `id`.
pub async fn open_conversation(ctl: &Controller, id: &ConversationId) -> Result<(), CliError> {
    let outcome = ctl.refresh_list(Some(id)).await;
    finish(ctl, "list conversations", outcome)?;

    if ctl.current_id().as_ref() != Some(id) {
        return Err(CliError::ConversationNotFound { id: id.clone() });
    }
    Ok(())
}
