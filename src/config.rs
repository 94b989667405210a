//! Top-level application configuration.
//!
//! Configuration is stored in `.mesa/config.yaml` and includes:
//! - Helpdesk API location, token and request timeout
//! - Board behaviour (page size, debounce quiet period, respond close delay)
//! - The signed-in helpdesk user used as responder and "assign to me" target

use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::board::BoardConfig;
use crate::error::{MesaError, Result};
use crate::paths::config_file;
use crate::types::CurrentUser;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Helpdesk API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Board behaviour
    #[serde(default, skip_serializing_if = "BoardSettings::is_default")]
    pub board: BoardSettings,

    /// Signed-in user
    #[serde(default)]
    pub user: UserConfig,
}

/// Helpdesk API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend, e.g. `http://localhost:8080`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Bearer token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<ApiToken>,

    /// Request timeout in seconds (default: 20)
    #[serde(default = "default_api_timeout")]
    pub timeout: u64,
}

fn default_api_timeout() -> u64 {
    20
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout: default_api_timeout(),
        }
    }
}

/// Bearer token for the helpdesk API
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiToken(pub String);

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiToken").field(&"[REDACTED]").finish()
    }
}

/// Board behaviour settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSettings {
    /// Tickets per page (default: 15)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Quiet period before typed search text is applied (default: 400)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// How long the respond form stays open after a successful answer (default: 2000)
    #[serde(default = "default_respond_close_delay_ms")]
    pub respond_close_delay_ms: u64,
}

fn default_page_size() -> u32 {
    15
}

fn default_debounce_ms() -> u64 {
    400
}

fn default_respond_close_delay_ms() -> u64 {
    2000
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            debounce_ms: default_debounce_ms(),
            respond_close_delay_ms: default_respond_close_delay_ms(),
        }
    }
}

impl BoardSettings {
    /// Check if these settings are the defaults (for serialization skip)
    pub fn is_default(&self) -> bool {
        self.page_size == default_page_size()
            && self.debounce_ms == default_debounce_ms()
            && self.respond_close_delay_ms == default_respond_close_delay_ms()
    }
}

/// Signed-in user configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub id: i64,
    pub name: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        let user = CurrentUser::default();
        Self {
            id: user.id,
            name: user.name,
        }
    }
}

/// Keys accepted by `config get` / `config set`.
pub const CONFIG_KEYS: &[&str] = &[
    "api.base_url",
    "api.token",
    "api.timeout",
    "board.page_size",
    "board.debounce_ms",
    "board.respond_close_delay_ms",
    "user.id",
    "user.name",
];

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        config_file()
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            MesaError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                MesaError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create directory for config at {}: {}",
                        parent.display(),
                        e
                    ),
                ))
            })?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content).map_err(|e| {
            MesaError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config at {}: {}", path.display(), e),
            ))
        })?;

        // Owner read/write only: the file may hold the API token
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, permissions).map_err(|e| {
                MesaError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to set permissions on config at {}: {}",
                        path.display(),
                        e
                    ),
                ))
            })?;
        }

        Ok(())
    }

    /// Get the API base URL from environment variable or config
    pub fn base_url(&self) -> Option<String> {
        if let Ok(url) = env::var("MESA_API_URL")
            && !url.is_empty()
        {
            return Some(url);
        }

        self.api.base_url.clone()
    }

    /// Get the API token from environment variable or config
    pub fn api_token(&self) -> Option<String> {
        if let Ok(token) = env::var("MESA_API_TOKEN")
            && !token.is_empty()
        {
            return Some(token);
        }

        self.api.token.as_ref().map(|t| t.0.clone())
    }

    /// Get the request timeout duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout)
    }

    /// The signed-in user
    pub fn current_user(&self) -> CurrentUser {
        CurrentUser::new(self.user.id, self.user.name.clone())
    }

    /// Controller settings derived from this configuration
    pub fn board_config(&self) -> BoardConfig {
        BoardConfig {
            page_size: self.board.page_size.max(1),
            debounce: Duration::from_millis(self.board.debounce_ms),
            request_timeout: self.request_timeout(),
            respond_close_delay: Duration::from_millis(self.board.respond_close_delay_ms),
        }
    }

    /// Read a value by dotted key. Tokens are never returned in clear text.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = match key {
            "api.base_url" => self.api.base_url.clone(),
            "api.token" => self.api.token.as_ref().map(|_| "[REDACTED]".to_string()),
            "api.timeout" => Some(self.api.timeout.to_string()),
            "board.page_size" => Some(self.board.page_size.to_string()),
            "board.debounce_ms" => Some(self.board.debounce_ms.to_string()),
            "board.respond_close_delay_ms" => Some(self.board.respond_close_delay_ms.to_string()),
            "user.id" => Some(self.user.id.to_string()),
            "user.name" => Some(self.user.name.clone()),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set a value by dotted key, validating its type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api.base_url" => {
                url::Url::parse(value)?;
                self.api.base_url = Some(value.to_string());
            }
            "api.token" => self.api.token = Some(ApiToken(value.to_string())),
            "api.timeout" => self.api.timeout = parse_number(key, value)?,
            "board.page_size" => {
                let size: u32 = parse_number(key, value)?;
                if size == 0 {
                    return Err(MesaError::Config(
                        "board.page_size must be greater than zero".to_string(),
                    ));
                }
                self.board.page_size = size;
            }
            "board.debounce_ms" => self.board.debounce_ms = parse_number(key, value)?,
            "board.respond_close_delay_ms" => {
                self.board.respond_close_delay_ms = parse_number(key, value)?
            }
            "user.id" => self.user.id = parse_number(key, value)?,
            "user.name" => {
                if value.trim().is_empty() {
                    return Err(MesaError::Config("user.name cannot be empty".to_string()));
                }
                self.user.name = value.trim().to_string();
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| {
        MesaError::Config(format!(
            "invalid value '{value}' for {key}. Expected a number"
        ))
    })
}

fn unknown_key(key: &str) -> MesaError {
    MesaError::Config(format!(
        "unknown config key '{key}'. Valid keys: {}",
        CONFIG_KEYS.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.api.base_url.is_none());
        assert!(config.api.token.is_none());
        assert_eq!(config.api.timeout, 20);
        assert_eq!(config.board.page_size, 15);
        assert_eq!(config.board.debounce_ms, 400);
        assert!(config.board.is_default());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.set("api.base_url", "http://localhost:8080").unwrap();
        config.set("api.token", "secret-token").unwrap();
        config.set("user.name", "Ana Torres").unwrap();

        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        let parsed: Config = serde_yaml_ng::from_str(&yaml).unwrap();

        assert_eq!(
            parsed.api.base_url.as_deref(),
            Some("http://localhost:8080")
        );
        assert_eq!(parsed.api.token.as_ref().map(|t| t.0.as_str()), Some("secret-token"));
        assert_eq!(parsed.user.name, "Ana Torres");
    }

    #[test]
    fn test_board_section_defaults_when_missing() {
        let yaml = r#"
api:
  base_url: http://localhost:8080
"#;
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        let board = config.board_config();
        assert_eq!(board.page_size, 15);
        assert_eq!(board.debounce, Duration::from_millis(400));
        assert_eq!(board.request_timeout, Duration::from_secs(20));
        assert_eq!(board.respond_close_delay, Duration::from_millis(2000));
    }

    #[test]
    fn test_token_is_redacted_in_debug() {
        let mut config = Config::default();
        config.set("api.token", "super-secret").unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
        assert_eq!(config.get("api.token").unwrap().as_deref(), Some("[REDACTED]"));
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut config = Config::default();
        assert!(config.set("board.page_size", "0").is_err());
        assert!(config.set("board.page_size", "many").is_err());
        assert!(config.set("api.base_url", "not a url").is_err());
        assert!(config.set("user.name", "   ").is_err());
        assert!(config.set("nope", "1").is_err());
        assert!(config.get("nope").is_err());
    }

    #[test]
    fn test_set_numbers() {
        let mut config = Config::default();
        config.set("board.debounce_ms", "250").unwrap();
        config.set("api.timeout", "30").unwrap();
        config.set("user.id", "44").unwrap();
        assert_eq!(config.board_config().debounce, Duration::from_millis(250));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.current_user().id, 44);
        assert!(!config.board.is_default());
    }
}
