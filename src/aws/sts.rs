use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use aws_config::{Region, SdkConfig};
use aws_sdk_sts::{Client as StsClient, error::DisplayErrorContext};
use tracing::{debug, info};

use super::TemporaryCredentials;
use crate::{
    constants::DEFAULT_AWS_REGION,
    error::{Error, Result},
};

/// Parameters of a single AssumeRole call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleRequest {
    pub role_arn: String,
    pub session_name: String,
    pub external_id: Option<String>,
    pub duration: Duration,
}

/// Exchanges a role ARN for temporary credentials.
///
/// Errors are returned as-is; retries belong to the transport underneath.
#[async_trait]
pub trait RoleAssumer: Debug + Send + Sync {
    async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<TemporaryCredentials>;
}

/// [`RoleAssumer`] backed by the AWS STS API
#[derive(Debug, Clone)]
pub struct StsRoleAssumer {
    client: StsClient,
}

impl StsRoleAssumer {
    pub fn new(client: StsClient) -> Self {
        Self { client }
    }

    /// Build an STS client that signs with the credentials of `base`.
    /// STS needs a region, so `us-east-1` is used when `base` has none.
    pub fn from_conf(base: &SdkConfig) -> Self {
        let mut builder = aws_sdk_sts::config::Builder::from(base);
        if base.region().is_none() {
            debug!(
                "No region configured, using default {} for STS",
                DEFAULT_AWS_REGION
            );
            builder = builder.region(Region::new(DEFAULT_AWS_REGION));
        }
        Self::new(StsClient::from_conf(builder.build()))
    }
}

#[async_trait]
impl RoleAssumer for StsRoleAssumer {
    async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<TemporaryCredentials> {
        info!(role_arn = %request.role_arn, "Calling AWS STS AssumeRole");
        debug!("Session name: {}", request.session_name);
        debug!("Duration: {} seconds", request.duration.as_secs());

        let duration_seconds = i32::try_from(request.duration.as_secs()).unwrap_or(i32::MAX);

        let response = self
            .client
            .assume_role()
            .role_arn(&request.role_arn)
            .role_session_name(&request.session_name)
            .set_external_id(request.external_id.clone())
            .duration_seconds(duration_seconds)
            .send()
            .await
            .map_err(|e| Error::RoleAssumption {
                role_arn: request.role_arn.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let sts_creds = response
            .credentials()
            .ok_or_else(|| Error::MissingStsCredentials {
                role_arn: request.role_arn.clone(),
            })?;

        info!(role_arn = %request.role_arn, "Successfully assumed role");
        Ok(TemporaryCredentials {
            access_key_id: sts_creds.access_key_id().to_string(),
            secret_access_key: sts_creds.secret_access_key().to_string(),
            session_token: sts_creds.session_token().to_string(),
            expiration: *sts_creds.expiration(),
        })
    }
}
