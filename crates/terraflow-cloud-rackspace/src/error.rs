//! Rackspace provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RackspaceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rackspace API returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("No {service} endpoint in region {region}")]
    EndpointNotFound { service: String, region: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Cloud error: {0}")]
    CloudError(#[from] terraflow_cloud::CloudError),
}

impl From<RackspaceError> for terraflow_cloud::CloudError {
    fn from(err: RackspaceError) -> Self {
        match err {
            RackspaceError::CloudError(inner) => inner,
            RackspaceError::InvalidConfig(message) => {
                terraflow_cloud::CloudError::InvalidConfig(message)
            }
            other => terraflow_cloud::CloudError::ConnectionFailed {
                connection: "Rackspace:CloudServers".to_string(),
                message: other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, RackspaceError>;
