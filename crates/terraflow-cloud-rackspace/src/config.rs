//! Rackspace provider configuration

use crate::error::{RackspaceError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_IDENTITY_URL: &str = "https://identity.api.rackspacecloud.com/v2.0";
pub const DEFAULT_REGION: &str = "DFW";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RackspaceConfig {
    /// Identity (Keystone v2) endpoint used to obtain tokens
    pub identity_url: String,
    /// Region whose Cloud Servers endpoint is used, e.g. `DFW` or `LON`
    pub region: String,
    pub request_timeout_secs: u64,
}

impl Default for RackspaceConfig {
    fn default() -> Self {
        Self {
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            region: DEFAULT_REGION.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl RackspaceConfig {
    /// Overlay `RACKSPACE_IDENTITY_URL` and `RACKSPACE_REGION` on the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("RACKSPACE_IDENTITY_URL") {
            config.identity_url = url;
        }
        if let Ok(region) = std::env::var("RACKSPACE_REGION") {
            config.region = region.to_ascii_uppercase();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.identity_url.starts_with("https://") || self.identity_url.starts_with("http://")) {
            return Err(RackspaceError::InvalidConfig(format!(
                "identity_url must be an http(s) URL, got '{}'",
                self.identity_url
            )));
        }
        if self.region.is_empty() {
            return Err(RackspaceError::InvalidConfig("region is empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(RackspaceError::InvalidConfig(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub(crate) fn tokens_url(&self) -> String {
        format!("{}/tokens", self.identity_url.trim_end_matches('/'))
    }
}
