//! AWS provider for Terraflow
//!
//! Binds a [`terraflow_cloud::Context`] to Amazon Web Services. Resource
//! tasks receive an [`AwsSession`] and fetch the shared EC2 and Elastic Load
//! Balancing clients from it; each client is built on first use and closed
//! when the lifecycle operation ends.
//!
//! # Requirements
//!
//! - Static access key credentials ([`terraflow_cloud::AwsCredentials`])
//! - Region from [`AwsConfig`], or `AWS_REGION` / `AWS_DEFAULT_REGION`
//!
//! # Example
//!
//! ```ignore
//! use terraflow_cloud::AwsCredentials;
//! use terraflow_cloud_aws::{AwsConfig, AwsContext, AwsProvider};
//!
//! let provider = AwsProvider::from_config(AwsConfig::from_env()?)?;
//! let mut ctx = AwsContext::new(provider);
//! ctx.set_credentials(AwsCredentials::new("prod", key_id, secret).into())?;
//!
//! let env = ctx.create_environment("web");
//! env.add_resource_task(WebInstance::new("web-1"))?;
//! ctx.create().await?;
//! ```

pub mod config;
pub mod connector;
pub mod error;
pub mod provider;

pub use config::AwsConfig;
pub use connector::{AwsConnector, Ec2Client, ElbClient, SdkConnector};
pub use error::{AwsError, Result};
pub use provider::{AwsContext, AwsProvider, AwsSession};
