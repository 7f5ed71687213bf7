use std::{path::PathBuf, time::Duration};

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while resolving session configs or assuming roles.
///
/// Everything up to `InvalidSessionDuration` is raised during resolution, before
/// any network call. The remaining variants only surface when credentials are
/// retrieved from a role-scoped config.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read AWS credentials file {}", .path.display())]
    CredentialsFile {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("failed to read AWS config file {}", .path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("profile '{profile}' not found in credentials file {}", .path.display())]
    ProfileNotFound { profile: String, path: PathBuf },

    #[error("profile '{profile}' is missing {key}")]
    IncompleteProfile { profile: String, key: &'static str },

    #[error("invalid domain role mapping '{0}', expected DOMAIN=ROLE_ARN")]
    InvalidDomainRole(String),

    #[error("domain '{domain}' is mapped to more than one role")]
    ConflictingDomainRoles { domain: String },

    #[error("session duration of {}s is outside the allowed 900-43200s range", .0.as_secs())]
    InvalidSessionDuration(Duration),

    #[error("failed to assume role {role_arn}: {message}")]
    RoleAssumption { role_arn: String, message: String },

    #[error("AWS STS returned no credentials for role {role_arn}")]
    MissingStsCredentials { role_arn: String },

    #[error("AWS STS returned an unusable expiration for role {role_arn}")]
    InvalidExpiration { role_arn: String },

    #[error("assuming role {role_arn} timed out after {}s", .timeout.as_secs())]
    RefreshTimeout { role_arn: String, timeout: Duration },
}

impl Error {
    /// Whether the error was raised by a role assumption rather than by resolution.
    pub fn is_retrieval_error(&self) -> bool {
        matches!(
            self,
            Self::RoleAssumption { .. }
                | Self::MissingStsCredentials { .. }
                | Self::InvalidExpiration { .. }
                | Self::RefreshTimeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_not_found_message() {
        let err = Error::ProfileNotFound {
            profile: "prod".to_string(),
            path: PathBuf::from("/tmp/creds"),
        };
        assert_eq!(
            err.to_string(),
            "profile 'prod' not found in credentials file /tmp/creds"
        );
        assert!(!err.is_retrieval_error());
    }

    #[test]
    fn test_session_duration_message() {
        let err = Error::InvalidSessionDuration(Duration::from_secs(60));
        assert!(err.to_string().contains("60s"));
    }

    #[test]
    fn test_role_assumption_is_retrieval_error() {
        let err = Error::RoleAssumption {
            role_arn: "arn:aws:iam::123456789012:role/dns".to_string(),
            message: "AccessDenied".to_string(),
        };
        assert!(err.is_retrieval_error());
        assert!(err.to_string().contains("AccessDenied"));
    }
}
