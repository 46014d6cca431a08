//! VMware provider for Terraflow
//!
//! Binds a [`terraflow_cloud::Context`] to a vCenter. Resource tasks receive
//! a [`VmwareSession`]; it hands out the shared [`VsphereClient`] and the
//! provider's [`terraflow_cloud::SharedAddressPool`], from which each cloned
//! guest takes its static address.
//!
//! # Example
//!
//! ```ignore
//! use terraflow_cloud_vmware::{VmwareConfig, VmwareContext, VmwareProvider};
//!
//! let provider = VmwareProvider::new(VmwareConfig::from_env()?)?;
//! let mut ctx = VmwareContext::new(provider);
//! ctx.set_credentials(VmwareCredentials::new("lab", url, user, password).into())?;
//!
//! let env = ctx.create_environment("lab");
//! env.add_resource_task(CloneTask::new("app-1", "centos-template"))?;
//! ctx.create().await?;
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod vsphere;

pub use config::{AddressRange, VmwareConfig};
pub use error::{Result, VmwareError};
pub use provider::{VmwareContext, VmwareProvider, VmwareSession};
pub use vsphere::{CloneRequest, GuestNetwork, VmSummary, VsphereClient};
