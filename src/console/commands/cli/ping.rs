use super::support;
use crate::cli::error::CliError;
use crate::cli::progress;
use crate::configuration::Settings;
use crate::console::commands::CallableTrait;
use crate::controller::Outcome;

/// `chatdesk ping`
///
/// Checks that the chat backend answers `GET /ping`.
pub struct PingCommand {
    pub settings: Settings,
}

impl PingCommand {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

impl CallableTrait for PingCommand {
    fn call(&self) -> Result<(), CliError> {
        let ctl = support::controller(&self.settings)?;

        support::runtime()?.block_on(async {
            let pb = progress::spinner(&format!("Pinging {}...", self.settings.base_url));
            let outcome = ctl.check_backend().await;
            progress::finish_clear(&pb);

            if let Outcome::Failed(source) = outcome {
                ctl.take_notices();
                return Err(CliError::RequestFailed {
                    action: "reach the backend",
                    source,
                });
            }

            eprintln!("✓ Backend reachable at {}", self.settings.base_url);
            Ok(())
        })
    }
}
