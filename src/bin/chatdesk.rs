//! `chatdesk`: terminal client for the chat backend.
//!
//! ```text
//! chatdesk list
//! chatdesk new "Trip planning"
//! chatdesk send 3 "What should I pack?"
//! chatdesk chat
//! ```

use std::path::PathBuf;

use chatdesk::cli::error::CliError;
use chatdesk::configuration::{get_configuration, get_configuration_from, Settings};
use chatdesk::console::commands::cli::{chat, conversation, history, list, ping, send};
use chatdesk::console::commands::CallableTrait;
use chatdesk::models::ConversationId;
use chatdesk::telemetry::{get_subscriber, init_subscriber};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "chatdesk",
    version,
    about = "Chat with the assistant backend from your terminal",
    long_about = "chatdesk: list, create, rename and delete conversations and exchange\n\
        messages with a chat backend over HTTP.\n\n\
        Settings come from ./chatdesk.{yaml,toml,json}, .env and CHATDESK__* variables;\n\
        command-line flags win over all of them."
)]
struct Cli {
    /// Backend base URL (default: http://127.0.0.1:8010)
    #[arg(long, global = true, env = "CHATDESK_BASE_URL", value_name = "URL")]
    base_url: Option<String>,
    /// Read settings from this file instead of ./chatdesk.*
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: ChatdeskCommands,
}

#[derive(Debug, Subcommand)]
enum ChatdeskCommands {
    /// Check that the backend is reachable
    Ping,
    /// List conversations
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Create a conversation
    New {
        /// Conversation title (default title when omitted)
        title: Option<String>,
    },
    /// Rename a conversation
    Rename {
        /// Conversation id
        id: ConversationId,
        /// New title
        title: String,
    },
    /// Delete a conversation and its messages
    Delete {
        /// Conversation id
        id: ConversationId,
        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Show the messages of a conversation
    History {
        /// Conversation id
        id: ConversationId,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Send one message and print the reply
    Send {
        /// Conversation id
        id: ConversationId,
        /// Message text
        message: String,
    },
    /// Start an interactive chat session
    Chat,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = load_settings(&cli)?;

    let subscriber = get_subscriber(
        "chatdesk".into(),
        settings.log_level.clone(),
        std::io::stderr,
    );
    if let Err(err) = init_subscriber(subscriber) {
        eprintln!("Logging disabled: {}", err);
    }

    get_command(cli.command, settings).call()
}

fn load_settings(cli: &Cli) -> Result<Settings, CliError> {
    let mut settings = match &cli.config {
        Some(path) => get_configuration_from(path)?,
        None => get_configuration()?,
    };
    if let Some(base_url) = &cli.base_url {
        settings.base_url = base_url.clone();
    }
    Ok(settings)
}

fn get_command(command: ChatdeskCommands, settings: Settings) -> Box<dyn CallableTrait> {
    match command {
        ChatdeskCommands::Ping => Box::new(ping::PingCommand::new(settings)),
        ChatdeskCommands::List { json } => Box::new(list::ListCommand::new(settings, json)),
        ChatdeskCommands::New { title } => {
            Box::new(conversation::NewCommand::new(settings, title))
        }
        ChatdeskCommands::Rename { id, title } => {
            Box::new(conversation::RenameCommand::new(settings, id, title))
        }
        ChatdeskCommands::Delete { id, yes } => {
            Box::new(conversation::DeleteCommand::new(settings, id, yes))
        }
        ChatdeskCommands::History { id, json } => {
            Box::new(history::HistoryCommand::new(settings, id, json))
        }
        ChatdeskCommands::Send { id, message } => {
            Box::new(send::SendCommand::new(settings, id, message))
        }
        ChatdeskCommands::Chat => Box::new(chat::ChatCommand::new(settings)),
    }
}
