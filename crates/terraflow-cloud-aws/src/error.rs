//! AWS provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("Invalid AWS region: '{0}'")]
    InvalidRegion(String),

    #[error("Could not build {service} client: {message}")]
    ClientBuild { service: String, message: String },

    #[error("Cloud error: {0}")]
    CloudError(#[from] terraflow_cloud::CloudError),
}

impl From<AwsError> for terraflow_cloud::CloudError {
    fn from(err: AwsError) -> Self {
        match err {
            AwsError::InvalidRegion(_) => terraflow_cloud::CloudError::InvalidConfig(err.to_string()),
            AwsError::ClientBuild { service, message } => {
                terraflow_cloud::CloudError::ConnectionFailed {
                    connection: service,
                    message,
                }
            }
            AwsError::CloudError(inner) => inner,
        }
    }
}

pub type Result<T> = std::result::Result<T, AwsError>;
