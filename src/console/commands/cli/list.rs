use super::support;
use crate::cli::error::CliError;
use crate::cli::render;
use crate::configuration::Settings;
use crate::console::commands::CallableTrait;

/// `chatdesk list [--json]`
///
/// Lists conversations in server order. The conversation that would be
/// selected on start-up is marked with `*`.
pub struct ListCommand {
    pub settings: Settings,
    pub json: bool,
}

impl ListCommand {
    pub fn new(settings: Settings, json: bool) -> Self {
        Self { settings, json }
    }
}

impl CallableTrait for ListCommand {
    fn call(&self) -> Result<(), CliError> {
        let ctl = support::controller(&self.settings)?;

        support::runtime()?.block_on(async {
            let outcome = ctl.refresh_list(None).await;
            support::finish(&ctl, "list conversations", outcome)?;

            let view = ctl.view();
            if self.json {
                println!("{}", serde_json::to_string_pretty(&view.conversations)?);
                return Ok(());
            }

            if view.conversations.is_empty() {
                eprintln!("No conversations yet. Run: chatdesk new");
                return Ok(());
            }

            let current = view.current.as_ref().map(|c| &c.id);
            print!("{}", render::conversation_table(&view.conversations, current));
            eprintln!("\n{} conversation(s) total.", view.conversations.len());
            Ok(())
        })
    }
}
