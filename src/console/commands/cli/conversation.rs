use std::io::IsTerminal;

use super::support;
use crate::cli::error::CliError;
use crate::configuration::Settings;
use crate::console::commands::CallableTrait;
use crate::controller::{Outcome, SkipReason};
use crate::models::ConversationId;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// new
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `chatdesk new [TITLE]`
///
/// Creates a conversation. A missing or blank title uses the configured
/// default title.
pub struct NewCommand {
    pub settings: Settings,
    pub title: Option<String>,
}

impl NewCommand {
    pub fn new(settings: Settings, title: Option<String>) -> Self {
        Self { settings, title }
    }
}

impl CallableTrait for NewCommand {
    fn call(&self) -> Result<(), CliError> {
        let ctl = support::controller(&self.settings)?;
        let title = self.title.clone().unwrap_or_default();

        support::runtime()?.block_on(async {
            let outcome = ctl.create_conversation(&title).await;
            support::finish(&ctl, "create conversation", outcome)?;

            if let Some(created) = ctl.view().current {
                println!("{}", created.id);
                eprintln!("✓ Created conversation {}", created);
            }
            Ok(())
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// rename
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `chatdesk rename <ID> <TITLE>`
pub struct RenameCommand {
    pub settings: Settings,
    pub id: ConversationId,
    pub title: String,
}

impl RenameCommand {
    pub fn new(settings: Settings, id: ConversationId, title: String) -> Self {
        Self {
            settings,
            id,
            title,
        }
    }
}

impl CallableTrait for RenameCommand {
    fn call(&self) -> Result<(), CliError> {
        let ctl = support::controller(&self.settings)?;

        support::runtime()?.block_on(async {
            // The current title is needed to detect no-op renames.
            support::open_conversation(&ctl, &self.id).await?;

            match ctl.rename_conversation(&self.id, &self.title).await {
                Outcome::Skipped(SkipReason::EmptyTitle) => Err(CliError::InvalidInput(
                    "Title cannot be empty".to_string(),
                )),
                Outcome::Skipped(SkipReason::UnchangedTitle) => {
                    eprintln!("Title unchanged, nothing to do.");
                    Ok(())
                }
                outcome => {
                    support::finish(&ctl, "rename conversation", outcome)?;
                    eprintln!("✓ Renamed conversation {} to \"{}\"", self.id, self.title.trim());
                    Ok(())
                }
            }
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// delete
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `chatdesk delete <ID> [--yes]`
///
/// Deletes a conversation and all of its messages. Asks for confirmation
/// unless `--yes` is given; without a terminal `--yes` is mandatory.
pub struct DeleteCommand {
    pub settings: Settings,
    pub id: ConversationId,
    pub confirm: bool,
}

impl DeleteCommand {
    pub fn new(settings: Settings, id: ConversationId, confirm: bool) -> Self {
        Self {
            settings,
            id,
            confirm,
        }
    }

    fn confirmed(&self) -> Result<bool, CliError> {
        if self.confirm {
            return Ok(true);
        }
        if !std::io::stdin().is_terminal() {
            return Err(CliError::InvalidInput(
                "Delete requires --yes (-y) when not running interactively.".to_string(),
            ));
        }
        Ok(dialoguer::Confirm::new()
            .with_prompt(format!("Delete conversation {}?", self.id))
            .default(false)
            .interact()?)
    }
}

impl CallableTrait for DeleteCommand {
    fn call(&self) -> Result<(), CliError> {
        if !self.confirmed()? {
            eprintln!("Aborted.");
            return Ok(());
        }

        let ctl = support::controller(&self.settings)?;

        support::runtime()?.block_on(async {
            let outcome = ctl.delete_conversation(&self.id).await;
            support::finish(&ctl, "delete conversation", outcome)?;
            eprintln!("✓ Deleted conversation {}", self.id);
            Ok(())
        })
    }
}
