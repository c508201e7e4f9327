use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the card portal client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortalConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// 0 = wait forever.
    #[serde(default)]
    pub timeout_sec: u64,
}

impl PortalConfig {
    pub fn with_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_sec > 0).then(|| Duration::from_secs(self.timeout_sec))
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            page_size: default_page_size(),
            timeout_sec: 0,
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:8081/api".to_string()
}

fn default_page_size() -> u32 {
    10
}
