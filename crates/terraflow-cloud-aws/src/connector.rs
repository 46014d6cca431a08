//! EC2 and ELB service clients
//!
//! Clients are built from static credentials on first use and handed to the
//! session's lazy slots. Building a client performs no network traffic.

use crate::config::AwsConfig;
use crate::error::{AwsError, Result};
use terraflow_cloud::{AwsCredentials, Connection};

const CREDENTIALS_PROVIDER_NAME: &str = "terraflow";

/// Builds the service clients an [`AwsSession`](crate::AwsSession) hands out
pub trait AwsConnector: Send + Sync + 'static {
    type Ec2: Connection + 'static;
    type Elb: Connection + 'static;

    fn connect_ec2(&self, credentials: &AwsCredentials) -> Result<Self::Ec2>;
    fn connect_elb(&self, credentials: &AwsCredentials) -> Result<Self::Elb>;
}

/// Connector backed by the AWS SDK
#[derive(Debug, Clone)]
pub struct SdkConnector {
    config: AwsConfig,
}

impl SdkConnector {
    pub fn new(config: AwsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn region(&self) -> &str {
        &self.config.region
    }
}

fn static_credentials(service: &str, credentials: &AwsCredentials) -> Result<aws_sdk_ec2::config::Credentials> {
    if credentials.access_key_id.is_empty() || credentials.secret_access_key.expose().is_empty() {
        return Err(AwsError::ClientBuild {
            service: service.to_string(),
            message: format!("credentials '{}' have an empty key", credentials.name),
        });
    }

    Ok(aws_sdk_ec2::config::Credentials::new(
        credentials.access_key_id.clone(),
        credentials.secret_access_key.expose().to_string(),
        None,
        None,
        CREDENTIALS_PROVIDER_NAME,
    ))
}

impl AwsConnector for SdkConnector {
    type Ec2 = Ec2Client;
    type Elb = ElbClient;

    fn connect_ec2(&self, credentials: &AwsCredentials) -> Result<Ec2Client> {
        let keys = static_credentials("AWS:EC2", credentials)?;
        let config = aws_sdk_ec2::Config::builder()
            .behavior_version(aws_sdk_ec2::config::BehaviorVersion::latest())
            .region(aws_sdk_ec2::config::Region::new(self.config.region.clone()))
            .credentials_provider(keys)
            .build();

        tracing::debug!(region = %self.config.region, "Building EC2 client");
        Ok(Ec2Client {
            inner: aws_sdk_ec2::Client::from_conf(config),
        })
    }

    fn connect_elb(&self, credentials: &AwsCredentials) -> Result<ElbClient> {
        let keys = static_credentials("AWS:ELB", credentials)?;
        let config = aws_sdk_elasticloadbalancing::Config::builder()
            .behavior_version(aws_sdk_elasticloadbalancing::config::BehaviorVersion::latest())
            .region(aws_sdk_elasticloadbalancing::config::Region::new(
                self.config.region.clone(),
            ))
            .credentials_provider(keys)
            .build();

        tracing::debug!(region = %self.config.region, "Building ELB client");
        Ok(ElbClient {
            inner: aws_sdk_elasticloadbalancing::Client::from_conf(config),
        })
    }
}

/// EC2 client handle
#[derive(Debug, Clone)]
pub struct Ec2Client {
    inner: aws_sdk_ec2::Client,
}

impl Ec2Client {
    pub fn client(&self) -> &aws_sdk_ec2::Client {
        &self.inner
    }
}

impl Connection for Ec2Client {
    // SDK clients own no sockets beyond their pooled HTTP connector,
    // which is released when the last handle is dropped.
    fn shutdown(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Classic Elastic Load Balancing client handle
#[derive(Debug, Clone)]
pub struct ElbClient {
    inner: aws_sdk_elasticloadbalancing::Client,
}

impl ElbClient {
    pub fn client(&self) -> &aws_sdk_elasticloadbalancing::Client {
        &self.inner
    }
}

impl Connection for ElbClient {
    fn shutdown(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
