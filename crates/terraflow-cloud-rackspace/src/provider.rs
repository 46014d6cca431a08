//! Rackspace provider implementation

use crate::config::RackspaceConfig;
use crate::servers::CloudServersClient;
use std::sync::Arc;
use terraflow_cloud::{
    CloudError, Context, Credentials, EnvironmentPolicy, FailurePolicy, LazyConnection, Provider,
    ProviderKind, RackspaceCredentials, RestoreSupport, Session,
};

pub type RackspaceContext = Context<RackspaceProvider>;

/// Rackspace provider
///
/// Task failures are logged and the batch reports success. There is nothing
/// to restore.
#[derive(Debug, Clone, Default)]
pub struct RackspaceProvider {
    config: RackspaceConfig,
}

impl RackspaceProvider {
    pub fn new(config: RackspaceConfig) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RackspaceConfig {
        &self.config
    }
}

impl Provider for RackspaceProvider {
    type Session = RackspaceSession;

    fn kind(&self) -> ProviderKind {
        ProviderKind::Rackspace
    }

    fn policy(&self) -> EnvironmentPolicy {
        EnvironmentPolicy {
            on_failure: FailurePolicy::LogAndContinue,
            restore: RestoreSupport::Unsupported,
        }
    }

    fn open_session(&self, credentials: &Credentials) -> terraflow_cloud::Result<RackspaceSession> {
        let credentials = credentials
            .as_rackspace()
            .cloned()
            .ok_or(CloudError::CredentialTypeMismatch {
                expected: ProviderKind::Rackspace,
                found: credentials.provider(),
            })?;

        Ok(RackspaceSession {
            credentials,
            config: self.config.clone(),
            servers: LazyConnection::new("Rackspace:CloudServers"),
        })
    }
}

/// Per-credentials Rackspace session
pub struct RackspaceSession {
    credentials: RackspaceCredentials,
    config: RackspaceConfig,
    servers: LazyConnection<CloudServersClient>,
}

impl RackspaceSession {
    pub fn credentials(&self) -> &RackspaceCredentials {
        &self.credentials
    }

    /// Cloud Servers client, built on first call and shared until the session closes
    pub fn fetch_servers_client(&self) -> terraflow_cloud::Result<Arc<CloudServersClient>> {
        self.servers.get_or_connect(|| {
            CloudServersClient::new(self.config.clone(), self.credentials.clone())
                .map_err(CloudError::from)
        })
    }
}

impl Session for RackspaceSession {
    fn close_connections(&self) {
        self.servers.close();
    }
}
