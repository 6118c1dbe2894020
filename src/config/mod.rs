/// Configuration management for poolctl
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Environment variable consulted when no token is configured
pub const TOKEN_ENV: &str = "IC_IAM_TOKEN";

const DEFAULT_ENDPOINT: &str = "https://containers.cloud.ibm.com/global";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the container-cluster API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// IAM bearer token (can also be set via IC_IAM_TOKEN env var)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Region the requests are scoped to (e.g., "us-south")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Resource group ID the requests are scoped to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout() -> u64 {
    60
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            token: None,
            region: None,
            resource_group: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, falling back to defaults when it does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.endpoint.is_empty() {
            anyhow::bail!("endpoint cannot be empty");
        }

        let url = Url::parse(&self.endpoint)
            .with_context(|| format!("Invalid endpoint URL: {}", self.endpoint))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("endpoint must be an http or https URL: {}", self.endpoint);
        }

        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Get the API token from config or environment
    pub fn get_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var(TOKEN_ENV).ok())
            .filter(|token| !token.is_empty())
    }

    /// Generate an example configuration file
    pub fn example() -> Self {
        Self {
            region: Some("us-south".to_string()),
            resource_group: Some("default".to_string()),
            ..Self::default()
        }
    }
}
