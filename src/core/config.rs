//! Configuration management for po-harvest
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/po-harvest/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::core::error::{ExtractError, Result};

/// Environment variable holding the portal username
pub const USERNAME_VAR: &str = "SHIPHERO_USERNAME";
/// Environment variable holding the portal password
pub const PASSWORD_VAR: &str = "SHIPHERO_PASSWORD";

/// Main configuration for po-harvest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Vendor portal location
    pub portal: PortalConfig,
    /// Browser driver configuration
    pub browser: BrowserConfig,
    /// Listing scan behaviour
    #[serde(default)]
    pub scan: ScanConfig,
    /// Wait timeouts
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// CSV export
    #[serde(default)]
    pub export: ExportConfig,
    /// Cursor persistence
    #[serde(default)]
    pub state: StateConfig,
}

/// Vendor portal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Base URL of the dashboard (default: https://app.shiphero.com)
    pub base_url: String,
}

/// Browser automation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Session name for agent-browser
    pub session_name: String,
    /// Whether to run in headed mode (visible browser)
    pub headed: bool,
    /// agent-browser executable
    pub binary: String,
}

/// Listing scan configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Clicks on the Created Date header before giving up on the sort order
    pub max_sort_attempts: u32,
    /// chrono format of the Created Date column
    pub date_format: String,
}

/// Wait timeouts in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Buttons, header cells, listing rows
    pub short_secs: u64,
    /// First field of the login form
    pub login_secs: u64,
    /// Page loads and table refreshes
    pub page_secs: u64,
}

/// CSV export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Where the CSV is written
    pub output_path: PathBuf,
}

/// Cursor persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// JSON file holding the last successful run
    pub cursor_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            portal: PortalConfig::default(),
            browser: BrowserConfig::default(),
            scan: ScanConfig::default(),
            timeouts: TimeoutConfig::default(),
            export: ExportConfig::default(),
            state: StateConfig::default(),
        }
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("PO_HARVEST_BASE_URL")
                .unwrap_or_else(|_| "https://app.shiphero.com".to_string()),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            session_name: env::var("PO_HARVEST_BROWSER_SESSION")
                .unwrap_or_else(|_| "po-harvest".to_string()),
            headed: env::var("PO_HARVEST_BROWSER_HEADED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            binary: "agent-browser".to_string(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_sort_attempts: 3,
            date_format: "%m/%d/%Y %I:%M %p".to_string(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            short_secs: 10,
            login_secs: 20,
            page_secs: 30,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: env::var("PO_HARVEST_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("po_details.csv")),
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            cursor_path: env::var("PO_HARVEST_CURSOR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| Config::data_dir().join("cursor.json")),
        }
    }
}

impl TimeoutConfig {
    pub fn short(&self) -> Duration {
        Duration::from_secs(self.short_secs)
    }

    pub fn login(&self) -> Duration {
        Duration::from_secs(self.login_secs)
    }

    pub fn page(&self) -> Duration {
        Duration::from_secs(self.page_secs)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("po-harvest")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Directory for persisted state
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("po-harvest")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        if let Ok(config) = Self::load_from_file() {
            return config;
        }

        // Fall back to defaults (which respect env vars)
        Self::default()
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(ExtractError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| ExtractError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ExtractError::config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to file and return the path
    pub fn save(&self) -> Result<PathBuf> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| ExtractError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ExtractError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| ExtractError::config(format!("Failed to write config: {}", e)))?;

        Ok(config_path)
    }

    /// Render the configuration as TOML for display
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|_| String::from("# Error generating config"))
    }

    fn base_url(&self) -> Result<Url> {
        Url::parse(&self.portal.base_url).map_err(|e| {
            ExtractError::config(format!("Invalid base_url '{}': {}", self.portal.base_url, e))
        })
    }

    /// Login page of the portal
    pub fn login_url(&self) -> Result<String> {
        self.resolve("/account/login")
    }

    /// Purchase-order listing page
    pub fn listing_url(&self) -> Result<String> {
        self.resolve("/dashboard/purchase-orders")
    }

    /// Resolve a possibly relative href against the portal base URL
    pub fn resolve(&self, href: &str) -> Result<String> {
        let joined = self
            .base_url()?
            .join(href)
            .map_err(|e| ExtractError::extraction(format!("Invalid link '{}': {}", href, e)))?;
        Ok(joined.to_string())
    }
}

/// Portal login, sourced from the environment
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Read credentials from the environment (after `.env` is loaded)
    pub fn from_env() -> Result<Self> {
        let username = env::var(USERNAME_VAR)
            .map_err(|_| ExtractError::MissingCredentials(USERNAME_VAR.to_string()))?;
        let password = env::var(PASSWORD_VAR)
            .map_err(|_| ExtractError::MissingCredentials(PASSWORD_VAR.to_string()))?;

        Ok(Self { username, password })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scan.max_sort_attempts, 3);
        assert_eq!(config.scan.date_format, "%m/%d/%Y %I:%M %p");
        assert_eq!(config.timeouts.page(), Duration::from_secs(30));
        assert_eq!(config.browser.binary, "agent-browser");
    }

    #[test]
    fn test_portal_urls() {
        let mut config = Config::default();
        config.portal.base_url = "https://app.shiphero.com".to_string();
        assert_eq!(
            config.login_url().unwrap(),
            "https://app.shiphero.com/account/login"
        );
        assert_eq!(
            config.listing_url().unwrap(),
            "https://app.shiphero.com/dashboard/purchase-orders"
        );
        assert_eq!(
            config.resolve("/dashboard/purchase-orders/details/42").unwrap(),
            "https://app.shiphero.com/dashboard/purchase-orders/details/42"
        );
        assert_eq!(
            config.resolve("https://other.test/po/1").unwrap(),
            "https://other.test/po/1"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = Config::default();
        config.portal.base_url = "not a url".to_string();
        assert!(matches!(config.login_url(), Err(ExtractError::Config(_))));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = config.to_toml();
        assert!(toml_str.contains("base_url"));
        assert!(toml_str.contains("max_sort_attempts"));

        let parsed = Config::from_toml(&toml_str).unwrap();
        assert_eq!(parsed.timeouts.short_secs, config.timeouts.short_secs);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = Config::from_toml(
            r#"
            [portal]
            base_url = "https://sandbox.test"

            [browser]
            session_name = "nightly"
            headed = true
            binary = "agent-browser"
            "#,
        )
        .unwrap();
        assert_eq!(config.portal.base_url, "https://sandbox.test");
        assert!(config.browser.headed);
        assert_eq!(config.scan.max_sort_attempts, 3);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials {
            username: "ops@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let shown = format!("{:?}", creds);
        assert!(shown.contains("ops@example.com"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn test_config_dir() {
        let dir = Config::config_dir();
        assert!(dir.to_string_lossy().contains("po-harvest"));
    }
}
