use crate::{MediaError, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default API base the `media/upload.json` path is resolved against
pub const DEFAULT_BASE_URL: &str = "https://upload.twitter.com/1.1/";

/// Path of the upload endpoint below the API base
pub const UPLOAD_PATH: &str = "media/upload.json";

/// Configuration for the media upload client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Endpoint and credentials
    pub api: ApiConfig,

    /// Upload request settings
    pub upload: UploadConfig,

    /// HTTP client settings
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API base URL
    pub base_url: String,

    /// Bearer token sent as `Authorization: Bearer <token>`
    pub bearer_token: Option<String>,

    /// `user:password` sent as HTTP basic auth when no bearer token is set
    pub basic_auth: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Media type declared by INIT
    pub media_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// User agent header
    pub user_agent: String,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_paths = [
            "twitter-media.toml",
            "config/twitter-media.toml",
            "/etc/twitter-media/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from a specific TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)?;
        let config = toml::from_str(&config_str).map_err(|e| {
            MediaError::Configuration(format!("invalid config file {}: {}", path.display(), e))
        })?;
        tracing::info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `TWITTER_MEDIA_*` overrides looked up through `var`
    pub fn with_overrides<F>(mut self, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = var("TWITTER_MEDIA_BASE_URL") {
            self.api.base_url = base_url;
        }

        if let Some(token) = var("TWITTER_MEDIA_TOKEN") {
            self.api.bearer_token = Some(token);
        }

        if let Some(basic) = var("TWITTER_MEDIA_BASIC_AUTH") {
            self.api.basic_auth = Some(basic);
        }

        if let Some(media_type) = var("TWITTER_MEDIA_MEDIA_TYPE") {
            self.upload.media_type = media_type;
        }

        if let Some(timeout) = var("TWITTER_MEDIA_TIMEOUT") {
            self.http.timeout_seconds = timeout.parse().map_err(|_| {
                MediaError::Configuration(format!("TWITTER_MEDIA_TIMEOUT is not a number: {}", timeout))
            })?;
        }

        Ok(self)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let config_str = toml::to_string_pretty(self)
            .map_err(|e| MediaError::Configuration(e.to_string()))?;
        std::fs::write(path, config_str)?;
        tracing::info!("Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(MediaError::Configuration("base_url must not be empty".to_string()));
        }

        self.upload_url()?;

        if self.upload.media_type.trim().is_empty() {
            return Err(MediaError::Configuration("media_type must not be empty".to_string()));
        }

        if self.http.timeout_seconds == 0 {
            return Err(MediaError::Configuration(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Resolve the `media/upload.json` endpoint against the base URL
    pub fn upload_url(&self) -> Result<Url> {
        let mut base = self.api.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        Url::parse(&base)
            .and_then(|url| url.join(UPLOAD_PATH))
            .map_err(|e| MediaError::Configuration(format!("invalid base_url {}: {}", base, e)))
    }

    /// Build the `Authorization` header, bearer token first
    pub fn auth_header_map(&self) -> Result<HeaderMap> {
        let mut header_map = HeaderMap::new();

        let value = if let Some(token) = &self.api.bearer_token {
            Some(format!("Bearer {}", token))
        } else {
            self.api
                .basic_auth
                .as_ref()
                .map(|basic| format!("Basic {}", STANDARD.encode(basic)))
        };

        if let Some(value) = value {
            let value = HeaderValue::from_str(&value)
                .map_err(|e| MediaError::Configuration(format!("invalid credentials: {}", e)))?;
            header_map.insert(AUTHORIZATION, value);
        }

        Ok(header_map)
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Twitter Media Configuration:\n\
            - Base URL: {}\n\
            - Media Type: {}\n\
            - Timeout: {}s\n\
            - Authorization: {}",
            self.api.base_url,
            self.upload.media_type,
            self.http.timeout_seconds,
            if self.api.bearer_token.is_some() {
                "bearer"
            } else if self.api.basic_auth.is_some() {
                "basic"
            } else {
                "none"
            }
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                bearer_token: None,
                basic_auth: None,
            },
            upload: UploadConfig {
                media_type: "image/jpeg".to_string(),
            },
            http: HttpConfig {
                timeout_seconds: 60,
                user_agent: format!("twitter-media/{}", env!("CARGO_PKG_VERSION")),
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.api.base_url = base_url.into();
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.config.api.bearer_token = Some(token.into());
        self
    }

    pub fn with_basic_auth(mut self, user: &str, password: &str) -> Self {
        self.config.api.basic_auth = Some(format!("{}:{}", user, password));
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.config.upload.media_type = media_type.into();
        self
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config.http.timeout_seconds = timeout_seconds;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.http.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
