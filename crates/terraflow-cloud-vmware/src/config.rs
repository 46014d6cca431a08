//! VMware provider configuration

use crate::error::{Result, VmwareError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use terraflow_cloud::{AddressPool, Ip4};

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Inclusive range of guest addresses, written `first-last`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRange {
    pub first: Ip4,
    pub last: Ip4,
}

impl AddressRange {
    pub fn new(first: Ip4, last: Ip4) -> Self {
        Self { first, last }
    }

    /// An empty pool over this range
    pub fn to_pool(&self) -> terraflow_cloud::Result<AddressPool> {
        AddressPool::new(self.first, self.last)
    }
}

impl FromStr for AddressRange {
    type Err = VmwareError;

    fn from_str(s: &str) -> Result<Self> {
        let (first, last) = s.split_once('-').ok_or_else(|| {
            VmwareError::InvalidConfig(format!("address range '{s}' is not of the form first-last"))
        })?;
        Ok(Self {
            first: first.trim().parse()?,
            last: last.trim().parse()?,
        })
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.last)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmwareConfig {
    /// vCenter base URL. Falls back to the URL in the credentials.
    #[serde(default)]
    pub url: Option<String>,
    /// Addresses handed to cloned guests
    pub address_range: AddressRange,
    /// Lab vCenters commonly run with self-signed certificates
    #[serde(default)]
    pub accept_invalid_certs: bool,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl VmwareConfig {
    pub fn new(address_range: AddressRange) -> Self {
        Self {
            url: None,
            address_range,
            accept_invalid_certs: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Read `VMWARE_ADDRESS_RANGE` (required), `VMWARE_URL` and
    /// `VMWARE_ACCEPT_INVALID_CERTS`
    pub fn from_env() -> Result<Self> {
        let range = std::env::var("VMWARE_ADDRESS_RANGE")
            .map_err(|_| VmwareError::MissingEnvVar("VMWARE_ADDRESS_RANGE".to_string()))?;

        let mut config = Self::new(range.parse()?);
        config.url = std::env::var("VMWARE_URL").ok();
        config.accept_invalid_certs = std::env::var("VMWARE_ACCEPT_INVALID_CERTS")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.address_range.to_pool()?;
        if let Some(url) = &self.url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(VmwareError::InvalidConfig(format!(
                    "url must be an http(s) URL, got '{url}'"
                )));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(VmwareError::InvalidConfig(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terraflow_cloud::CloudError;

    #[test]
    fn test_parse_range() {
        let range: AddressRange = "10.0.0.10 - 10.0.0.20".parse().unwrap();
        assert_eq!(range.first, Ip4::new(10, 0, 0, 10));
        assert_eq!(range.last, Ip4::new(10, 0, 0, 20));
        assert_eq!(range.to_string(), "10.0.0.10-10.0.0.20");
        assert_eq!(range.to_pool().unwrap().capacity(), 11);
    }

    #[test]
    fn test_parse_range_errors() {
        assert!(matches!(
            "10.0.0.1".parse::<AddressRange>(),
            Err(VmwareError::InvalidConfig(_))
        ));
        assert!(matches!(
            "10.0.0.1-10.0.0.x".parse::<AddressRange>(),
            Err(VmwareError::CloudError(CloudError::InvalidAddress(_)))
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let config = VmwareConfig::new(AddressRange::new(
            Ip4::new(10, 0, 0, 9),
            Ip4::new(10, 0, 0, 1),
        ));
        assert!(matches!(
            config.validate(),
            Err(VmwareError::CloudError(CloudError::RangeInvalid { .. }))
        ));
    }

    #[test]
    fn test_deserialize() {
        let json = r#"{
            "url": "https://vcenter.lab",
            "address_range": {"first": "192.168.10.50", "last": "192.168.10.99"}
        }"#;
        let config: VmwareConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.url.as_deref(), Some("https://vcenter.lab"));
        assert_eq!(config.address_range.first, Ip4::new(192, 168, 10, 50));
        assert!(!config.accept_invalid_certs);
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                ("VMWARE_ADDRESS_RANGE", Some("10.1.0.1-10.1.0.8")),
                ("VMWARE_URL", Some("https://vc.example")),
                ("VMWARE_ACCEPT_INVALID_CERTS", Some("true")),
            ],
            || {
                let config = VmwareConfig::from_env().unwrap();
                assert_eq!(config.address_range.to_pool().unwrap().capacity(), 8);
                assert!(config.accept_invalid_certs);
            },
        );
    }

    #[test]
    fn test_from_env_requires_range() {
        temp_env::with_var_unset("VMWARE_ADDRESS_RANGE", || {
            assert!(matches!(
                VmwareConfig::from_env(),
                Err(VmwareError::MissingEnvVar(_))
            ));
        });
    }
}
