use super::support;
use crate::cli::error::CliError;
use crate::cli::render;
use crate::configuration::Settings;
use crate::console::commands::CallableTrait;
use crate::controller::Transcript;
use crate::models::{ConversationId, Message};

/// `chatdesk history <ID> [--json]`
///
/// Prints the messages of one conversation in server order.
pub struct HistoryCommand {
    pub settings: Settings,
    pub id: ConversationId,
    pub json: bool,
}

impl HistoryCommand {
    pub fn new(settings: Settings, id: ConversationId, json: bool) -> Self {
        Self { settings, id, json }
    }
}

impl CallableTrait for HistoryCommand {
    fn call(&self) -> Result<(), CliError> {
        let ctl = support::controller(&self.settings)?;

        support::runtime()?.block_on(async {
            support::open_conversation(&ctl, &self.id).await?;

            let view = ctl.view();
            if view.transcript == Transcript::Loading {
                return Err(CliError::InvalidInput(format!(
                    "Messages of conversation {} could not be loaded.",
                    self.id
                )));
            }

            if self.json {
                let messages: Vec<Message> = view
                    .transcript
                    .entries()
                    .iter()
                    .map(|b| Message {
                        role: b.role,
                        content: b.content.clone(),
                        created_at: b.created_at.clone(),
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&messages)?);
            } else {
                println!("{}", render::panel(&view));
            }
            Ok(())
        })
    }
}
