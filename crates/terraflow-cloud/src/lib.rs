//! Terraflow Cloud Provisioning
//!
//! This crate provides the provider-agnostic provisioning engine for
//! Terraflow: environments of resource tasks that are created, destroyed
//! and restored as a unit, on any supported cloud.
//!
//! # Supported Providers
//!
//! - **AWS**: EC2 instances, Elastic Load Balancers
//! - **Rackspace**: Cloud Servers
//! - **VMware**: vSphere clones with statically assigned addresses
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              Context<P: Provider>               │
//! │   credentials · lazy session · one environment  │
//! └─────────────────┬───────────────────────────────┘
//!                   │ create / destroy / restore
//! ┌─────────────────▼───────────────────────────────┐
//! │                  Environment                    │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │        Executor (bounded workers)        │   │
//! │  │  trait ResourceTask { create, destroy }  │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐                               │
//! │  │ AddressPool  │  (providers without DHCP)     │
//! │  └──────────────┘                               │
//! └───────┬─────────────────┬─────────────────┬─────┘
//!         │                 │                 │
//! ┌───────▼──────┐ ┌────────▼──────┐ ┌────────▼─────┐
//! │     aws      │ │   rackspace   │ │    vmware    │
//! │   provider   │ │   provider    │ │   provider   │
//! └──────────────┘ └───────────────┘ └──────────────┘
//! ```

pub mod connection;
pub mod context;
pub mod credentials;
pub mod environment;
pub mod error;
pub mod executor;
pub mod ip;
pub mod pool;
pub mod task;

// Re-exports
pub use connection::{Connection, LazyConnection};
pub use context::{Context, Provider, Session};
pub use credentials::{
    AwsCredentials, Credentials, ProviderKind, RackspaceCredentials, Secret, VmwareCredentials,
};
pub use environment::{Environment, EnvironmentPolicy, FailurePolicy, RestoreSupport};
pub use error::{CloudError, Result};
pub use executor::{BatchReport, Executor, ExecutorConfig, TaskOutcome};
pub use ip::Ip4;
pub use pool::{AddressPool, SharedAddressPool};
pub use task::{Operation, ResourceTask, TaskState};
