//! Provider credentials
//!
//! Credentials are not polymorphic across providers: a context only accepts
//! the variant whose [`ProviderKind`] matches its own.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The cloud a context, environment or credential set belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Aws,
    Rackspace,
    Vmware,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Aws => write!(f, "AWS"),
            ProviderKind::Rackspace => write!(f, "Rackspace"),
            ProviderKind::Vmware => write!(f, "VMware"),
        }
    }
}

/// A secret string that never shows up in `Debug` output or logs
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(***)")
    }
}

/// Credentials for one provider, tagged by provider in serialized form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum Credentials {
    Aws(AwsCredentials),
    Rackspace(RackspaceCredentials),
    Vmware(VmwareCredentials),
}

impl Credentials {
    pub fn provider(&self) -> ProviderKind {
        match self {
            Credentials::Aws(_) => ProviderKind::Aws,
            Credentials::Rackspace(_) => ProviderKind::Rackspace,
            Credentials::Vmware(_) => ProviderKind::Vmware,
        }
    }

    /// User-facing name of this credential set
    pub fn name(&self) -> &str {
        match self {
            Credentials::Aws(c) => &c.name,
            Credentials::Rackspace(c) => &c.name,
            Credentials::Vmware(c) => &c.name,
        }
    }

    pub fn as_aws(&self) -> Option<&AwsCredentials> {
        match self {
            Credentials::Aws(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_rackspace(&self) -> Option<&RackspaceCredentials> {
        match self {
            Credentials::Rackspace(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_vmware(&self) -> Option<&VmwareCredentials> {
        match self {
            Credentials::Vmware(c) => Some(c),
            _ => None,
        }
    }
}

impl From<AwsCredentials> for Credentials {
    fn from(c: AwsCredentials) -> Self {
        Credentials::Aws(c)
    }
}

impl From<RackspaceCredentials> for Credentials {
    fn from(c: RackspaceCredentials) -> Self {
        Credentials::Rackspace(c)
    }
}

impl From<VmwareCredentials> for Credentials {
    fn from(c: VmwareCredentials) -> Self {
        Credentials::Vmware(c)
    }
}

/// Access key pair for Amazon Web Services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsCredentials {
    pub name: String,
    pub access_key_id: String,
    pub secret_access_key: Secret,
}

impl AwsCredentials {
    pub fn new(
        name: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: Secret::new(secret_access_key),
        }
    }
}

/// Username and API key for the Rackspace identity service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RackspaceCredentials {
    pub name: String,
    pub username: String,
    pub api_key: Secret,
}

impl RackspaceCredentials {
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            api_key: Secret::new(api_key),
        }
    }
}

/// vCenter login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmwareCredentials {
    pub name: String,
    pub url: String,
    pub username: String,
    pub password: Secret,
}

impl VmwareCredentials {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            username: username.into(),
            password: Secret::new(password),
        }
    }
}
