use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use aws_config::{BehaviorVersion, Region, SdkConfig, retry::RetryConfig};
use aws_credential_types::provider::{
    self, ProvideCredentials, SharedCredentialsProvider, error::CredentialsError,
};
use tracing::info;

use super::{
    chain::build_base_provider,
    role::{RoleConfigFactory, RoleSettings},
    sts::{RoleAssumer, StsRoleAssumer},
};
use crate::{
    config::{SessionConfig, normalize_domain},
    error::{Error, Result},
};

/// A finished SDK config together with the role it was built for
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    role_arn: Option<String>,
    sdk_config: SdkConfig,
}

impl ResolvedConfig {
    pub fn new(role_arn: Option<String>, sdk_config: SdkConfig) -> Self {
        Self {
            role_arn,
            sdk_config,
        }
    }

    pub fn role_arn(&self) -> Option<&str> {
        self.role_arn.as_deref()
    }

    pub fn sdk_config(&self) -> &SdkConfig {
        &self.sdk_config
    }

    pub fn region(&self) -> Option<&Region> {
        self.sdk_config.region()
    }

    pub fn credentials(&self) -> Option<SharedCredentialsProvider> {
        self.sdk_config.credentials_provider()
    }

    /// Fetch currently valid credentials, assuming the role if needed.
    pub async fn retrieve(&self) -> provider::Result {
        match self.credentials() {
            Some(credentials) => credentials.provide_credentials().await,
            None => Err(CredentialsError::not_loaded(
                "no credentials provider configured",
            )),
        }
    }
}

/// Non-empty set of resolved configs, one per distinct role.
#[derive(Debug, Clone)]
pub struct ResolvedConfigs {
    configs: Vec<ResolvedConfig>,
    domain_roles: Vec<(String, String)>,
    default_role: Option<String>,
}

impl ResolvedConfigs {
    fn new(
        configs: Vec<ResolvedConfig>,
        domain_roles: BTreeMap<String, String>,
        session: &SessionConfig,
    ) -> Self {
        Self {
            configs,
            domain_roles: domain_roles.into_iter().collect(),
            default_role: session.assume_role_arn().map(str::to_string),
        }
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedConfig> {
        self.configs.iter()
    }

    pub fn for_role(&self, role_arn: &str) -> Option<&ResolvedConfig> {
        self.configs
            .iter()
            .find(|config| config.role_arn() == Some(role_arn))
    }

    /// Config for domains without a mapping: the global role if one is set,
    /// otherwise the config without a role, if any.
    pub fn default_config(&self) -> Option<&ResolvedConfig> {
        match &self.default_role {
            Some(role_arn) => self.for_role(role_arn),
            None => self.configs.iter().find(|config| config.role_arn().is_none()),
        }
    }

    /// Config to use for `domain`. The longest mapped domain equal to it or
    /// one of its parents wins; unmapped names use [`Self::default_config`].
    pub fn for_domain(&self, domain: &str) -> Option<&ResolvedConfig> {
        let name = normalize_domain(domain);

        let mapped = self
            .domain_roles
            .iter()
            .filter(|(zone, _)| {
                name == *zone
                    || name
                        .strip_suffix(zone.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.'))
            })
            .max_by_key(|(zone, _)| zone.len());

        match mapped {
            Some((_, role_arn)) => self.for_role(role_arn),
            None => self.default_config(),
        }
    }
}

impl<'a> IntoIterator for &'a ResolvedConfigs {
    type Item = &'a ResolvedConfig;
    type IntoIter = std::slice::Iter<'a, ResolvedConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Resolve a session into one config per distinct role.
///
/// The base credential chain is built once and shared by all configs. Every
/// role in `domain_roles` plus the global `assume_role` gets exactly one
/// config; with no roles at all a single config using the base credentials is
/// returned. Nothing here talks to the network: STS is only called when
/// credentials are retrieved from a config. `assumer` replaces the STS client
/// built from the base config.
pub fn resolve(
    session: &SessionConfig,
    assumer: Option<Arc<dyn RoleAssumer>>,
) -> Result<ResolvedConfigs> {
    let domain_roles = normalize_domain_roles(session)?;
    let region = session.resolve_region()?;
    let credentials = build_base_provider(session)?;
    let base = base_sdk_config(region, credentials, session.api_retries);

    let roles = collect_roles(&domain_roles, session);
    if roles.is_empty() {
        info!("No roles configured, using base credentials");
        let configs = vec![ResolvedConfig::new(None, base)];
        return Ok(ResolvedConfigs::new(configs, domain_roles, session));
    }

    let settings = RoleSettings {
        session_name: session.session_name().map(str::to_string),
        external_id: session.external_id().map(str::to_string),
        duration: session.session_duration()?,
    };

    let assumer = assumer.unwrap_or_else(|| Arc::new(StsRoleAssumer::from_conf(&base)));
    let factory = RoleConfigFactory::new(base, assumer, settings);

    let configs = roles
        .into_iter()
        .map(|role_arn| {
            info!(role_arn, "Resolved role-scoped config");
            factory.build(Some(role_arn))
        })
        .collect();

    Ok(ResolvedConfigs::new(configs, domain_roles, session))
}

/// Normalize domain names, rejecting two spellings of one domain that map to
/// different roles.
fn normalize_domain_roles(session: &SessionConfig) -> Result<BTreeMap<String, String>> {
    let mut normalized = BTreeMap::new();
    for (domain, role_arn) in &session.domain_roles {
        let name = normalize_domain(domain);
        match normalized.get(&name) {
            Some(existing) if existing != role_arn => {
                return Err(Error::ConflictingDomainRoles { domain: name });
            }
            Some(_) => {}
            None => {
                normalized.insert(name, role_arn.clone());
            }
        }
    }
    Ok(normalized)
}

fn collect_roles<'a>(
    domain_roles: &'a BTreeMap<String, String>,
    session: &'a SessionConfig,
) -> BTreeSet<&'a str> {
    domain_roles
        .values()
        .map(String::as_str)
        .chain(session.assume_role_arn())
        .filter(|role_arn| !role_arn.is_empty())
        .collect()
}

fn base_sdk_config(
    region: Option<Region>,
    credentials: SharedCredentialsProvider,
    api_retries: Option<u32>,
) -> SdkConfig {
    let mut builder = SdkConfig::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(region)
        .credentials_provider(credentials);

    if let Some(attempts) = api_retries {
        builder = builder.retry_config(RetryConfig::standard().with_max_attempts(attempts.max(1)));
    }

    builder.build()
}
