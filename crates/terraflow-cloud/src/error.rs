//! Cloud provisioning error types

use crate::credentials::ProviderKind;
use crate::ip::Ip4;
use crate::task::Operation;
use std::time::Duration;
use thiserror::Error;

/// Provisioning engine errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid address range: {first} is after {last}")]
    RangeInvalid { first: Ip4, last: Ip4 },

    #[error("Address {address} is outside the pool range {first} - {last}")]
    AddressOutOfRange { address: Ip4, first: Ip4, last: Ip4 },

    #[error("Address already in use: {0}")]
    AddressInUse(Ip4),

    #[error("Address pool {first} - {last} is exhausted")]
    PoolExhausted { first: Ip4, last: Ip4 },

    #[error(
        "Timeout waiting for {operation} tasks to finish after {timeout:?} ({} unfinished, {} never started)",
        .pending.len(),
        .unstarted.len()
    )]
    BatchTimeout {
        operation: Operation,
        timeout: Duration,
        /// Every task without an outcome, in submission order
        pending: Vec<String>,
        /// The subset of `pending` still waiting for a worker
        unstarted: Vec<String>,
    },

    #[error("Resource task '{task}' failed to {operation}: {source}")]
    TaskExecution {
        task: String,
        index: usize,
        operation: Operation,
        #[source]
        source: anyhow::Error,
    },

    #[error("Bad credential type: expected {expected}, got {found}")]
    CredentialTypeMismatch {
        expected: ProviderKind,
        found: ProviderKind,
    },

    #[error("No credentials set for {0} context")]
    CredentialsNotSet(ProviderKind),

    #[error("No environment configured for {0} context")]
    NoEnvironmentConfigured(ProviderKind),

    #[error("Environment '{0}' is already running; no more resource tasks can be added")]
    EnvironmentSealed(String),

    #[error("Could not connect to {connection}: {message}")]
    ConnectionFailed { connection: String, message: String },

    #[error("Did not finish starting {provider} environment")]
    EnvironmentCreationFailed {
        provider: ProviderKind,
        #[source]
        source: Box<CloudError>,
    },

    #[error("Could not completely destroy {provider} environment")]
    EnvironmentDestructionFailed {
        provider: ProviderKind,
        #[source]
        source: Box<CloudError>,
    },

    #[error("Could not completely restore {provider} environment")]
    EnvironmentRestorationFailed {
        provider: ProviderKind,
        #[source]
        source: Box<CloudError>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// The innermost provisioning error beneath any lifecycle envelope.
    pub fn root(&self) -> &CloudError {
        match self {
            CloudError::EnvironmentCreationFailed { source, .. }
            | CloudError::EnvironmentDestructionFailed { source, .. }
            | CloudError::EnvironmentRestorationFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
