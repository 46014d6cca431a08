//! AWS provider configuration

use crate::error::{AwsError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_REGION: &str = "us-east-1";

/// Settings shared by every AWS service client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    pub region: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
        }
    }
}

impl AwsConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }

    /// Read the region from `AWS_REGION`, then `AWS_DEFAULT_REGION`
    pub fn from_env() -> Result<Self> {
        let region = std::env::var("AWS_REGION")
            .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
            .unwrap_or_else(|_| DEFAULT_REGION.to_string());

        let config = Self { region };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let well_formed = !self.region.is_empty()
            && self
                .region
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            && !self.region.starts_with('-')
            && !self.region.ends_with('-');

        if well_formed {
            Ok(())
        } else {
            Err(AwsError::InvalidRegion(self.region.clone()))
        }
    }
}
