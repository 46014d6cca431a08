//! AWS provider implementation

use crate::config::AwsConfig;
use crate::connector::{AwsConnector, SdkConnector};
use std::sync::Arc;
use terraflow_cloud::{
    AwsCredentials, CloudError, Context, Credentials, EnvironmentPolicy, LazyConnection,
    Provider, ProviderKind, Session,
};

/// Context bound to the AWS provider
pub type AwsContext<C = SdkConnector> = Context<AwsProvider<C>>;

/// AWS provider
///
/// Failures are propagated and restore runs as a batch.
pub struct AwsProvider<C: AwsConnector = SdkConnector> {
    connector: Arc<C>,
}

impl AwsProvider<SdkConnector> {
    pub fn from_config(config: AwsConfig) -> crate::Result<Self> {
        Ok(Self::new(SdkConnector::new(config)?))
    }
}

impl<C: AwsConnector> AwsProvider<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector: Arc::new(connector),
        }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }
}

impl<C: AwsConnector> Provider for AwsProvider<C> {
    type Session = AwsSession<C>;

    fn kind(&self) -> ProviderKind {
        ProviderKind::Aws
    }

    fn policy(&self) -> EnvironmentPolicy {
        EnvironmentPolicy::propagating()
    }

    fn open_session(&self, credentials: &Credentials) -> terraflow_cloud::Result<AwsSession<C>> {
        let credentials = credentials
            .as_aws()
            .cloned()
            .ok_or(CloudError::CredentialTypeMismatch {
                expected: ProviderKind::Aws,
                found: credentials.provider(),
            })?;

        tracing::debug!(credentials = %credentials.name, "Opening AWS session");
        Ok(AwsSession {
            credentials,
            connector: Arc::clone(&self.connector),
            ec2: LazyConnection::new("AWS:EC2"),
            elb: LazyConnection::new("AWS:ELB"),
        })
    }
}

/// Per-credentials AWS session with lazily built service clients
pub struct AwsSession<C: AwsConnector = SdkConnector> {
    credentials: AwsCredentials,
    connector: Arc<C>,
    ec2: LazyConnection<C::Ec2>,
    elb: LazyConnection<C::Elb>,
}

impl<C: AwsConnector> AwsSession<C> {
    pub fn credentials(&self) -> &AwsCredentials {
        &self.credentials
    }

    /// EC2 client, built on first call and shared until the session closes
    pub fn fetch_ec2_client(&self) -> terraflow_cloud::Result<Arc<C::Ec2>> {
        self.ec2.get_or_connect(|| {
            self.connector
                .connect_ec2(&self.credentials)
                .map_err(CloudError::from)
        })
    }

    /// ELB client, built on first call and shared until the session closes
    pub fn fetch_elb_client(&self) -> terraflow_cloud::Result<Arc<C::Elb>> {
        self.elb.get_or_connect(|| {
            self.connector
                .connect_elb(&self.credentials)
                .map_err(CloudError::from)
        })
    }
}

impl<C: AwsConnector> Session for AwsSession<C> {
    fn close_connections(&self) {
        self.ec2.close();
        self.elb.close();
    }
}
