use config::{Config, File};
use plaid_api::Environment;
use serde::Deserialize;

use crate::CLIENT_NAME;

const CONFIG_NAME: &str = "config.toml";

/// Runtime configuration, read from `PLAID_*` environment variables with an
/// optional TOML file underneath. Environment variables win.
#[derive(Debug, Deserialize)]
pub struct Settings {
    pub client_id: String,
    pub secret: String,
    #[serde(default)]
    pub env: Environment,
    /// Only used by `export`; `serve` obtains tokens through the exchange route.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Settings {
    pub fn new(config_path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut s = Config::builder();

        if let Some(path) = config_path {
            s = s.add_source(File::with_name(path));
        } else {
            s = s.add_source(File::with_name(&default_config_path()).required(false));
        }

        s.add_source(config::Environment::with_prefix("PLAID"))
            .build()?
            .try_deserialize()
    }
}

fn default_config_path() -> String {
    dirs::config_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| std::env::temp_dir()))
        .join(CLIENT_NAME)
        .join(CONFIG_NAME)
        .display()
        .to_string()
}
