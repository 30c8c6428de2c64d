//! Browser executor - wraps agent-browser CLI
//!
//! Each session call runs one agent-browser command against a named session,
//! so the browser process outlives the individual commands until `close`.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::browser::BrowserSession;
use crate::core::config::BrowserConfig;
use crate::core::{ExtractError, Result};

/// Session backed by the agent-browser CLI
pub struct AgentBrowser {
    /// agent-browser executable
    binary: String,
    /// Session name for isolation
    session_name: String,
    /// Whether to run in headed mode
    headed: bool,
}

impl AgentBrowser {
    /// Create a new executor for a named session
    pub fn new(session_name: impl Into<String>) -> Self {
        Self {
            binary: "agent-browser".to_string(),
            session_name: session_name.into(),
            headed: false,
        }
    }

    /// Create an executor from configuration
    pub fn from_config(config: &BrowserConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            session_name: config.session_name.clone(),
            headed: config.headed,
        }
    }

    /// Set headed mode
    pub fn set_headed(&mut self, headed: bool) {
        self.headed = headed;
    }

    /// Check if agent-browser is installed
    pub async fn is_available(binary: &str) -> bool {
        Command::new(binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Arguments passed before every command
    fn base_args(&self) -> Vec<&str> {
        let mut args = vec!["--session", self.session_name.as_str()];
        if self.headed {
            args.push("--headed");
        }
        args
    }

    /// Run an agent-browser command and return its trimmed stdout
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        // fill carries credentials; only the verb is logged
        debug!(session = %self.session_name, command = args.first().copied().unwrap_or(""), "agent-browser");

        let output = Command::new(&self.binary)
            .args(self.base_args())
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ExtractError::AgentBrowserNotFound
                } else {
                    ExtractError::browser(format!("Failed to run agent-browser: {}", e))
                }
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ExtractError::browser(format!(
                "agent-browser {} failed: {}",
                args.first().copied().unwrap_or(""),
                stderr.trim()
            )))
        }
    }
}

/// Interpret agent-browser's output for a missing attribute
fn parse_attribute(output: String) -> Option<String> {
    match output.as_str() {
        "" | "null" | "undefined" => None,
        _ => Some(output),
    }
}

#[async_trait]
impl BrowserSession for AgentBrowser {
    async fn open(&self, url: &str) -> Result<()> {
        self.run_command(&["open", url]).await.map(|_| ())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.run_command(&["click", selector]).await.map(|_| ())
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<()> {
        self.run_command(&["fill", selector, text]).await.map(|_| ())
    }

    async fn value(&self, selector: &str) -> Result<String> {
        self.run_command(&["get", "value", selector]).await
    }

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        self.run_command(&["get", "attr", selector, name])
            .await
            .map(parse_attribute)
    }

    async fn html(&self, selector: &str) -> Result<String> {
        self.run_command(&["get", "html", selector]).await
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        let output = self.run_command(&["get", "count", selector]).await?;
        output.parse().map_err(|_| {
            ExtractError::browser(format!("Unexpected count output for '{}': {}", selector, output))
        })
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        let output = self.run_command(&["is", "visible", selector]).await?;
        Ok(output == "true")
    }

    async fn close(&self) -> Result<()> {
        self.run_command(&["close"]).await.map(|_| ())
    }
}

impl Default for AgentBrowser {
    fn default() -> Self {
        Self::new("po-harvest")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executor_creation() {
        let executor = AgentBrowser::new("test-session");
        assert_eq!(executor.session_name, "test-session");
        assert!(!executor.headed);
        assert_eq!(executor.base_args(), vec!["--session", "test-session"]);
    }

    #[test]
    fn test_headed_adds_flag() {
        let mut executor = AgentBrowser::default();
        executor.set_headed(true);
        assert_eq!(
            executor.base_args(),
            vec!["--session", "po-harvest", "--headed"]
        );
    }

    #[test]
    fn test_parse_attribute() {
        assert_eq!(parse_attribute("descending".to_string()), Some("descending".to_string()));
        assert_eq!(parse_attribute("null".to_string()), None);
        assert_eq!(parse_attribute(String::new()), None);
    }

    #[test]
    fn test_missing_binary_is_reported() {
        let executor = AgentBrowser::from_config(&BrowserConfig {
            session_name: "t".to_string(),
            headed: false,
            binary: "po-harvest-no-such-binary".to_string(),
        });
        let result = tokio_test::block_on(executor.open("https://example.com"));
        assert!(matches!(result, Err(ExtractError::AgentBrowserNotFound)));
    }
}
