//! VMware provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VmwareError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("vSphere API returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("vCenter login failed: {0}")]
    AuthenticationFailed(String),

    #[error("Virtual machine not found: {0}")]
    VmNotFound(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Cloud error: {0}")]
    CloudError(#[from] terraflow_cloud::CloudError),
}

impl From<VmwareError> for terraflow_cloud::CloudError {
    fn from(err: VmwareError) -> Self {
        match err {
            VmwareError::CloudError(inner) => inner,
            VmwareError::InvalidConfig(message) => {
                terraflow_cloud::CloudError::InvalidConfig(message)
            }
            other => terraflow_cloud::CloudError::ConnectionFailed {
                connection: "VMware:vSphere".to_string(),
                message: other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, VmwareError>;
