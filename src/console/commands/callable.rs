use crate::cli::error::CliError;

/// A parsed `chatdesk` subcommand, ready to run.
pub trait CallableTrait {
    fn call(&self) -> Result<(), CliError>;
}
