use super::support;
use crate::cli::error::CliError;
use crate::cli::{progress, render};
use crate::configuration::Settings;
use crate::console::commands::CallableTrait;
use crate::controller::{Outcome, SkipReason};
use crate::models::ConversationId;

/// `chatdesk send <ID> <MESSAGE>`
///
/// Sends one message and prints the exchange. A failed send is printed in
/// place of the reply and makes the command exit non-zero.
pub struct SendCommand {
    pub settings: Settings,
    pub id: ConversationId,
    pub message: String,
}

impl SendCommand {
    pub fn new(settings: Settings, id: ConversationId, message: String) -> Self {
        Self {
            settings,
            id,
            message,
        }
    }
}

impl CallableTrait for SendCommand {
    fn call(&self) -> Result<(), CliError> {
        if self.message.trim().is_empty() {
            return Err(CliError::InvalidInput("Message cannot be empty".to_string()));
        }

        let ctl = support::controller(&self.settings)?;

        support::runtime()?.block_on(async {
            support::open_conversation(&ctl, &self.id).await?;
            let before = ctl.view().transcript.entries().len();

            let pb = progress::reply_spinner();
            let outcome = ctl.send_message(&self.message).await;
            progress::finish_clear(&pb);

            for bubble in ctl.view().transcript.entries().iter().skip(before) {
                println!("{}", render::bubble(bubble));
            }

            match outcome {
                Outcome::Skipped(SkipReason::Busy) => Err(CliError::InvalidInput(format!(
                    "Conversation {} is busy, try again.",
                    self.id
                ))),
                outcome => support::finish(&ctl, "send message", outcome),
            }
        })
    }
}
