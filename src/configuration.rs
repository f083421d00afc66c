use std::path::Path;
use std::time::Duration;

use crate::controller::DEFAULT_CONVERSATION_TITLE;
use crate::gateway::DEFAULT_BASE_URL;

/// Name of the optional config file looked up in the working directory
/// (`chatdesk.yaml`, `chatdesk.toml`, `chatdesk.json`, ...).
pub const CONFIG_FILE_NAME: &str = "chatdesk";

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    pub base_url: String,
    /// Unset or 0 means requests may wait forever.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    pub default_title: String,
    pub log_level: String,
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let builder = base_builder()?
        .add_source(config::File::with_name(CONFIG_FILE_NAME).required(false))
        .add_source(environment());

    builder.build()?.try_deserialize()
}

/// Same layering as [`get_configuration`] but reading an explicit file.
pub fn get_configuration_from(path: &Path) -> Result<Settings, config::ConfigError> {
    let builder = base_builder()?
        .add_source(config::File::from(path))
        .add_source(environment());

    builder.build()?.try_deserialize()
}

fn base_builder(
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    config::Config::builder()
        .set_default("base_url", DEFAULT_BASE_URL)?
        .set_default("default_title", DEFAULT_CONVERSATION_TITLE)?
        .set_default("log_level", "warn")
}

// CHATDESK__BASE_URL, CHATDESK__REQUEST_TIMEOUT_SECS, ...
fn environment() -> config::Environment {
    config::Environment::with_prefix("CHATDESK")
        .separator("__")
        .try_parsing(true)
}
