use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Root of the admin REST API, without a trailing slash
    pub base_url: String,
    /// Origin prefixed onto relative media paths such as `/media/news/a.jpg`
    pub media_origin: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_image_bytes: u64,
    pub allowed_image_types: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid URL for {field}: {value} ({reason})")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("Request timeout must be at least one second")]
    ZeroTimeout,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("development") | Ok("dev") => Environment::Development,
            _ => Environment::Production,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("OUTLINE_API_BASE_URL") {
            self.api.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("OUTLINE_MEDIA_ORIGIN") {
            self.api.media_origin = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("OUTLINE_REQUEST_TIMEOUT_SECS") {
            if let Some(secs) = v.parse::<u64>().ok().filter(|secs| *secs > 0) {
                self.api.request_timeout_secs = secs;
            }
        }
        if let Ok(v) = env::var("OUTLINE_USER_AGENT") {
            self.api.user_agent = v;
        }
        if let Ok(v) = env::var("OUTLINE_MAX_IMAGE_BYTES") {
            self.upload.max_image_bytes = v.parse().unwrap_or(self.upload.max_image_bytes);
        }

        self
    }

    /// Build a config pointing at an arbitrary backend (used by tests and `--api-url`)
    pub fn for_backend(base_url: &str, media_origin: &str) -> Self {
        let mut config = Self::development();
        config.api.base_url = base_url.trim_end_matches('/').to_string();
        config.api.media_origin = media_origin.trim_end_matches('/').to_string();
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("api.base_url", &self.api.base_url), ("api.media_origin", &self.api.media_origin)] {
            let parsed = url::Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
                field,
                value: value.clone(),
                reason: e.to_string(),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidUrl {
                    field,
                    value: value.clone(),
                    reason: format!("unsupported scheme '{}'", parsed.scheme()),
                });
            }
        }

        if self.api.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:8000/admin_app/api".to_string(),
                media_origin: "http://localhost:8000".to_string(),
                request_timeout_secs: 10,
                user_agent: default_user_agent(),
            },
            upload: UploadConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://backend.outlinekerala.com/admin_app/api".to_string(),
                media_origin: "https://backend.outlinekerala.com".to_string(),
                request_timeout_secs: 30,
                user_agent: default_user_agent(),
            },
            upload: UploadConfig::default(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: 5 * 1024 * 1024, // 5MB
            allowed_image_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/webp".to_string(),
            ],
        }
    }
}

fn default_user_agent() -> String {
    format!("outline-admin/{}", env!("CARGO_PKG_VERSION"))
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.api.base_url, "https://backend.outlinekerala.com/admin_app/api");
        assert_eq!(config.api.media_origin, "https://backend.outlinekerala.com");
        assert_eq!(config.upload.max_image_bytes, 5 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_for_backend_strips_trailing_slash() {
        let config = AppConfig::for_backend("http://127.0.0.1:9000/admin_app/api/", "http://127.0.0.1:9000/");
        assert_eq!(config.api.base_url, "http://127.0.0.1:9000/admin_app/api");
        assert_eq!(config.api.media_origin, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let mut config = AppConfig::development();
        config.api.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl { field: "api.base_url", .. })));

        let mut config = AppConfig::development();
        config.api.media_origin = "ftp://example.com".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl { field: "api.media_origin", .. })));

        let mut config = AppConfig::development();
        config.api.request_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout)));
    }
}
