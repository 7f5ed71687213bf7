use std::time::SystemTime;

use aws_credential_types::Credentials;
use aws_smithy_types::DateTime;

use crate::error::{Error, Result};

pub mod cache;
pub mod chain;
pub mod credentials;
pub mod resolver;
pub mod role;
pub mod sts;

pub(crate) const ASSUME_ROLE_PROVIDER_NAME: &str = "AssumeRoleProvider";

/// AWS temporary credentials returned by STS
#[derive(Debug, Clone)]
pub struct TemporaryCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime,
}

impl TemporaryCredentials {
    /// Convert into SDK credentials that expire at the STS-issued time.
    pub fn into_credentials(self, role_arn: &str) -> Result<Credentials> {
        let expiry = SystemTime::try_from(self.expiration).map_err(|_| Error::InvalidExpiration {
            role_arn: role_arn.to_string(),
        })?;

        Ok(Credentials::new(
            self.access_key_id,
            self.secret_access_key,
            Some(self.session_token),
            Some(expiry),
            ASSUME_ROLE_PROVIDER_NAME,
        ))
    }
}

pub use resolver::{ResolvedConfig, ResolvedConfigs, resolve};
pub use role::{AssumeRoleProvider, RoleConfigFactory, RoleSettings};
pub use sts::{AssumeRoleRequest, RoleAssumer, StsRoleAssumer};
