use aws_config::{
    ecs::EcsCredentialsProvider,
    environment::credentials::EnvironmentVariableCredentialsProvider,
    imds::credentials::ImdsCredentialsProvider, meta::credentials::CredentialsProviderChain,
};
use aws_credential_types::provider::SharedCredentialsProvider;
use tracing::{debug, info};

use super::credentials::load_profile_credentials;
use crate::{config::SessionConfig, constants, error::Result};

/// Build the base credential provider for a session.
///
/// Sources are tried in order: environment variables, the shared credentials
/// file profile, the ECS container endpoint, then EC2 instance metadata. Only
/// the credentials file is read here; every other source is probed on first
/// use, so a session without any credentials only fails once they are
/// retrieved.
pub fn build_base_provider(config: &SessionConfig) -> Result<SharedCredentialsProvider> {
    let profile = config.active_profile();
    let path = constants::get_aws_credentials_path();
    let profile_credentials =
        load_profile_credentials(path.as_deref(), profile, config.profile_name().is_some())?;

    let mut chain = CredentialsProviderChain::first_try(
        "Environment",
        EnvironmentVariableCredentialsProvider::new(),
    );

    match profile_credentials {
        Some(credentials) => {
            info!("Using profile '{}' from the shared credentials file", profile);
            chain = chain.or_else("Profile", credentials);
        }
        None => debug!("Skipping shared credentials file"),
    }

    let chain = chain
        .or_else("EcsContainer", EcsCredentialsProvider::builder().build())
        .or_else(
            "Ec2InstanceMetadata",
            ImdsCredentialsProvider::builder().build(),
        );

    Ok(SharedCredentialsProvider::new(chain))
}
