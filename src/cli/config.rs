use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::session::{FileTokenStore, Navigator, TokenStore, LOGIN_ROUTE};

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("OUTLINE_ADMIN_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("outline-admin")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// The CLI's stand-in for a login screen: there is nowhere to navigate, so
/// tell the operator how to get a session back
#[derive(Debug, Default)]
pub struct CliNavigator;

impl Navigator for CliNavigator {
    fn redirect(&self, route: &str) {
        if route == LOGIN_ROUTE {
            eprintln!("Not logged in. Run `outline-admin auth login --token <TOKEN>` to start a session.");
        } else {
            tracing::debug!("Ignoring navigation to {}", route);
        }
    }
}

/// Everything a command needs to talk to the backend
pub struct CliContext {
    pub config: AppConfig,
    pub store: Arc<FileTokenStore>,
    pub navigator: Arc<CliNavigator>,
}

impl CliContext {
    pub fn load(api_url: Option<&str>, media_origin: Option<&str>) -> anyhow::Result<Self> {
        let mut config = crate::config::config().clone();
        if let Some(url) = api_url {
            config.api.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(origin) = media_origin {
            config.api.media_origin = origin.trim_end_matches('/').to_string();
        }
        config.validate()?;

        let store = FileTokenStore::in_dir(&get_config_dir()?);
        tracing::debug!("Using session file {}", store.path().display());

        Ok(Self {
            config,
            store: Arc::new(store),
            navigator: Arc::new(CliNavigator),
        })
    }

    pub fn store(&self) -> Arc<dyn TokenStore> {
        self.store.clone()
    }

    pub fn navigator(&self) -> Arc<dyn Navigator> {
        self.navigator.clone()
    }

    /// Guarded client for one command
    pub fn api(&self) -> Result<ApiClient, ApiError> {
        ApiClient::connect(&self.config, self.store(), self.navigator())
    }
}
