//! Rackspace provider for Terraflow
//!
//! Binds a [`terraflow_cloud::Context`] to Rackspace Cloud Servers. Resource
//! tasks receive a [`RackspaceSession`] and fetch the shared
//! [`CloudServersClient`] from it.
//!
//! Rackspace environments never fail a lifecycle call because of a task:
//! failures and timeouts are logged as warnings and the call returns `Ok`.
//! Restore is a no-op.
//!
//! # Requirements
//!
//! - Username and API key ([`terraflow_cloud::RackspaceCredentials`])
//! - Optional: `RACKSPACE_IDENTITY_URL`, `RACKSPACE_REGION` env vars

pub mod config;
pub mod error;
pub mod provider;
pub mod servers;

pub use config::RackspaceConfig;
pub use error::{RackspaceError, Result};
pub use provider::{RackspaceContext, RackspaceProvider, RackspaceSession};
pub use servers::{AuthToken, CloudServersClient, Server, ServerRequest};
