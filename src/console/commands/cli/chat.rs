use std::io::{IsTerminal, Write};

use super::support;
use crate::cli::error::CliError;
use crate::cli::{progress, render};
use crate::configuration::Settings;
use crate::console::commands::CallableTrait;
use crate::controller::{Controller, Outcome, SkipReason};
use crate::models::ConversationId;

const HELP: &str = "\
Type a message and press Enter to send it to the selected conversation.

  /list             show conversations
  /new [title]      create a conversation and switch to it
  /select <id>      switch conversation
  /rename [title]   rename the selected conversation
  /delete           delete the selected conversation
  /reload           reload messages of the selected conversation
  /help             show this help
  /quit             leave";

/// One line of user input in the interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Send(String),
    New(String),
    List,
    Select(ConversationId),
    Rename(Option<String>),
    Delete,
    Reload,
    Help,
    Quit,
    Unknown(String),
    Blank,
}

pub fn parse_input(line: &str) -> SessionInput {
    let line = line.trim();
    if line.is_empty() {
        return SessionInput::Blank;
    }
    let Some(command) = line.strip_prefix('/') else {
        return SessionInput::Send(line.to_string());
    };

    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };
    match name {
        "new" => SessionInput::New(rest.to_string()),
        "list" | "ls" => SessionInput::List,
        "select" | "open" if !rest.is_empty() => match rest.parse() {
            Ok(id) => SessionInput::Select(id),
            Err(never) => match never {},
        },
        "rename" => SessionInput::Rename((!rest.is_empty()).then(|| rest.to_string())),
        "delete" | "rm" => SessionInput::Delete,
        "reload" => SessionInput::Reload,
        "help" | "?" => SessionInput::Help,
        "quit" | "exit" | "q" => SessionInput::Quit,
        _ => SessionInput::Unknown(line.to_string()),
    }
}

/// `chatdesk chat`
///
/// Interactive session: the terminal stand-in for the chat window.
pub struct ChatCommand {
    pub settings: Settings,
}

impl ChatCommand {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    fn read_line(ctl: &Controller) -> Result<Option<String>, CliError> {
        let prompt = match ctl.view().current {
            Some(current) => format!("[{}] > ", render::truncate(&current.title, 24)),
            None => "> ".to_string(),
        };
        eprint!("{}", prompt);
        std::io::stderr().flush()?;

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        Ok(Some(input))
    }

    fn show_list(ctl: &Controller) {
        let view = ctl.view();
        if view.conversations.is_empty() {
            println!("No conversations yet. Use /new [title] to start one.");
        } else {
            let current = view.current.as_ref().map(|c| &c.id);
            print!("{}", render::conversation_table(&view.conversations, current));
        }
    }

    fn show_panel(ctl: &Controller) {
        println!("{}", render::panel(&ctl.view()));
    }

    async fn send(ctl: &Controller, text: &str) {
        let before = ctl.view().transcript.entries().len();
        let pb = progress::reply_spinner();
        let outcome = ctl.send_message(text).await;
        progress::finish_clear(&pb);

        if outcome == Outcome::Skipped(SkipReason::Busy) {
            eprintln!("Still waiting for the previous reply.");
        }
        for bubble in ctl.view().transcript.entries().iter().skip(before) {
            println!("{}", render::bubble(bubble));
        }
    }

    async fn rename(ctl: &Controller, title: Option<String>) -> Result<(), CliError> {
        let view = ctl.view();
        let Some(current) = view.current else {
            eprintln!("Select or create a conversation first.");
            return Ok(());
        };

        let title = match title {
            Some(title) => title,
            None if std::io::stdin().is_terminal() => dialoguer::Input::<String>::new()
                .with_prompt("New title")
                .with_initial_text(current.title.clone())
                .allow_empty(true)
                .interact_text()?,
            None => {
                eprintln!("Usage: /rename <title>");
                return Ok(());
            }
        };

        if ctl.rename_conversation(&current.id, &title).await.is_applied() {
            Self::show_panel(ctl);
        }
        Ok(())
    }

    async fn delete(ctl: &Controller) -> Result<(), CliError> {
        let view = ctl.view();
        let Some(current) = view.current else {
            eprintln!("Select or create a conversation first.");
            return Ok(());
        };

        if std::io::stdin().is_terminal()
            && !dialoguer::Confirm::new()
                .with_prompt(format!("Delete \"{}\"?", current.title))
                .default(false)
                .interact()?
        {
            return Ok(());
        }

        if ctl.delete_conversation(&current.id).await.is_applied() {
            Self::show_list(ctl);
            Self::show_panel(ctl);
        }
        Ok(())
    }

    /// Runs one input line. Returns `false` when the session should end.
    async fn dispatch(ctl: &Controller, input: SessionInput) -> Result<bool, CliError> {
        match input {
            SessionInput::Blank => {}
            SessionInput::Quit => return Ok(false),
            SessionInput::Help => println!("{}", HELP),
            SessionInput::Unknown(line) => eprintln!("Unknown command: {} (try /help)", line),
            SessionInput::Send(text) => Self::send(ctl, &text).await,
            SessionInput::List => {
                ctl.refresh_list(None).await;
                Self::show_list(ctl);
            }
            SessionInput::New(title) => {
                if ctl.create_conversation(&title).await.is_applied() {
                    Self::show_panel(ctl);
                }
            }
            SessionInput::Select(id) => match ctl.select_conversation(&id).await {
                Outcome::Skipped(SkipReason::UnknownConversation) => {
                    eprintln!("No conversation {} in the list (try /list).", id)
                }
                _ => Self::show_panel(ctl),
            },
            SessionInput::Rename(title) => Self::rename(ctl, title).await?,
            SessionInput::Delete => Self::delete(ctl).await?,
            SessionInput::Reload => {
                if ctl.on_focus().await.is_applied() {
                    Self::show_panel(ctl);
                }
            }
        }
        Ok(true)
    }
}

impl CallableTrait for ChatCommand {
    fn call(&self) -> Result<(), CliError> {
        let ctl = support::controller(&self.settings)?;

        support::runtime()?.block_on(async {
            ctl.check_backend().await;
            ctl.refresh_list(None).await;
            Self::show_list(&ctl);
            Self::show_panel(&ctl);
            support::print_notices(&ctl);
            eprintln!("Type /help for commands.");

            while let Some(line) = Self::read_line(&ctl)? {
                let keep_going = Self::dispatch(&ctl, parse_input(&line)).await?;
                support::print_notices(&ctl);
                if !keep_going {
                    break;
                }
            }
            Ok(())
        })
    }
}
