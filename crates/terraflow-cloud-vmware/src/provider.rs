//! VMware provider implementation

use crate::config::VmwareConfig;
use crate::vsphere::VsphereClient;
use std::sync::Arc;
use terraflow_cloud::{
    CloudError, Context, Credentials, EnvironmentPolicy, LazyConnection, Provider, ProviderKind,
    Session, SharedAddressPool, VmwareCredentials,
};

pub type VmwareContext = Context<VmwareProvider>;

/// VMware provider
///
/// vSphere has no address service for cloned guests, so the provider owns
/// an address pool that every session shares. Allocations survive a change
/// of credentials.
#[derive(Debug, Clone)]
pub struct VmwareProvider {
    config: VmwareConfig,
    pool: SharedAddressPool,
}

impl VmwareProvider {
    pub fn new(config: VmwareConfig) -> crate::Result<Self> {
        config.validate()?;
        let pool = SharedAddressPool::new(config.address_range.to_pool()?);
        tracing::debug!(range = %config.address_range, "VMware address pool ready");
        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &VmwareConfig {
        &self.config
    }

    pub fn address_pool(&self) -> &SharedAddressPool {
        &self.pool
    }
}

impl Provider for VmwareProvider {
    type Session = VmwareSession;

    fn kind(&self) -> ProviderKind {
        ProviderKind::Vmware
    }

    fn policy(&self) -> EnvironmentPolicy {
        EnvironmentPolicy::propagating()
    }

    fn open_session(&self, credentials: &Credentials) -> terraflow_cloud::Result<VmwareSession> {
        let credentials = credentials
            .as_vmware()
            .cloned()
            .ok_or(CloudError::CredentialTypeMismatch {
                expected: ProviderKind::Vmware,
                found: credentials.provider(),
            })?;

        Ok(VmwareSession {
            credentials,
            config: self.config.clone(),
            pool: self.pool.clone(),
            vsphere: LazyConnection::new("VMware:vSphere"),
        })
    }
}

pub struct VmwareSession {
    credentials: VmwareCredentials,
    config: VmwareConfig,
    pool: SharedAddressPool,
    vsphere: LazyConnection<VsphereClient>,
}

impl VmwareSession {
    pub fn credentials(&self) -> &VmwareCredentials {
        &self.credentials
    }

    /// vSphere client, built on first call and shared until the session closes
    pub fn fetch_vsphere_client(&self) -> terraflow_cloud::Result<Arc<VsphereClient>> {
        self.vsphere.get_or_connect(|| {
            VsphereClient::new(&self.config, self.credentials.clone()).map_err(CloudError::from)
        })
    }

    /// Pool that guest addresses are allocated from
    pub fn address_pool(&self) -> &SharedAddressPool {
        &self.pool
    }
}

impl Session for VmwareSession {
    fn close_connections(&self) {
        self.vsphere.close();
    }
}
