//! OpenStack provider error types

use envsweep_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenStackError {
    #[error("openstack CLI not found. Please install: pip install python-openstackclient")]
    CliNotFound,

    #[error("openstack authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("openstack endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("openstack command failed: {0}")]
    CommandFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unexpected output: {0}")]
    UnexpectedOutput(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl OpenStackError {
    /// Classify a failed command by its stderr
    pub fn from_stderr(stderr: &str) -> Self {
        let message = stderr.trim().to_string();
        let lower = message.to_ascii_lowercase();

        if lower.contains("no server with a name or id")
            || lower.contains("no volume with a name or id")
            || lower.contains("could not be found")
            || lower.contains("(http 404)")
        {
            OpenStackError::NotFound(message)
        } else if lower.contains("unable to establish connection")
            || lower.contains("failed to discover available identity versions")
            || lower.contains("connection refused")
            || lower.contains("name or service not known")
        {
            OpenStackError::Unreachable(message)
        } else if lower.contains("the request you have made requires authentication")
            || lower.contains("(http 401)")
            || lower.contains("missing value auth-url")
        {
            OpenStackError::AuthenticationFailed(message)
        } else {
            OpenStackError::CommandFailed(message)
        }
    }
}

impl From<OpenStackError> for CloudError {
    fn from(err: OpenStackError) -> Self {
        match err {
            OpenStackError::CliNotFound => {
                CloudError::InvalidConfig("openstack CLI not found".to_string())
            }
            OpenStackError::AuthenticationFailed(msg) => CloudError::AuthenticationFailed(msg),
            OpenStackError::Unreachable(msg) => CloudError::Unreachable(msg),
            OpenStackError::CommandFailed(msg) => CloudError::CommandFailed(msg),
            OpenStackError::NotFound(msg) => CloudError::ResourceNotFound(msg),
            OpenStackError::UnexpectedOutput(msg) => CloudError::ApiError(msg),
            OpenStackError::JsonError(e) => CloudError::Json(e),
            OpenStackError::IoError(e) => CloudError::Io(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, OpenStackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_stderr() {
        assert!(matches!(
            OpenStackError::from_stderr("No server with a name or ID of 'abc' exists."),
            OpenStackError::NotFound(_)
        ));
        assert!(matches!(
            OpenStackError::from_stderr(
                "Failed to discover available identity versions when contacting http://keystone:5000/v3."
            ),
            OpenStackError::Unreachable(_)
        ));
        assert!(matches!(
            OpenStackError::from_stderr(
                "The request you have made requires authentication. (HTTP 401)"
            ),
            OpenStackError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            OpenStackError::from_stderr("Invalid volume: Volume status must be available"),
            OpenStackError::CommandFailed(_)
        ));
    }

    #[test]
    fn test_into_cloud_error() {
        let err: CloudError = OpenStackError::NotFound("vol-1".to_string()).into();
        assert!(err.is_not_found());

        let err: CloudError = OpenStackError::Unreachable("keystone".to_string()).into();
        assert!(matches!(err, CloudError::Unreachable(_)));
    }
}
