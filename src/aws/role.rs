use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use aws_config::SdkConfig;
use aws_credential_types::{
    Credentials,
    provider::{
        self, ProvideCredentials, SharedCredentialsProvider, error::CredentialsError, future,
    },
};
use aws_smithy_types::date_time::Format;
use tracing::{Instrument, debug, info_span};

use super::{
    cache::{CredentialsCache, SystemClock, TimeSource},
    resolver::ResolvedConfig,
    sts::{AssumeRoleRequest, RoleAssumer},
};
use crate::{
    constants::{
        DEFAULT_EXPIRY_BUFFER, DEFAULT_REFRESH_TIMEOUT, DEFAULT_SESSION_DURATION,
        ROLE_SESSION_NAME_PREFIX,
    },
    error::{Error, Result},
};

/// Options applied to every role assumption of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSettings {
    pub session_name: Option<String>,
    pub external_id: Option<String>,
    pub duration: Duration,
}

impl Default for RoleSettings {
    fn default() -> Self {
        Self {
            session_name: None,
            external_id: None,
            duration: DEFAULT_SESSION_DURATION,
        }
    }
}

/// Credentials provider that assumes a single role and caches the result.
///
/// The role is only assumed when credentials are first requested, and again
/// whenever the cached set is about to expire. Concurrent requests during a
/// refresh share one STS call.
#[derive(Debug)]
pub struct AssumeRoleProvider {
    role_arn: String,
    assumer: Arc<dyn RoleAssumer>,
    settings: RoleSettings,
    refresh_timeout: Duration,
    cache: CredentialsCache,
}

impl AssumeRoleProvider {
    pub fn builder(role_arn: impl Into<String>) -> Builder {
        Builder::new(role_arn.into())
    }

    pub fn role_arn(&self) -> &str {
        &self.role_arn
    }

    async fn credentials(&self) -> provider::Result {
        let span = info_span!("assume_role", role_arn = %self.role_arn);
        self.cache
            .get_or_load(|| self.assume())
            .instrument(span)
            .await
            .map_err(CredentialsError::provider_error)
    }

    async fn assume(&self) -> Result<Credentials> {
        let request = AssumeRoleRequest {
            role_arn: self.role_arn.clone(),
            session_name: self
                .settings
                .session_name
                .clone()
                .unwrap_or_else(default_session_name),
            external_id: self.settings.external_id.clone(),
            duration: self.settings.duration,
        };

        let assumed = tokio::time::timeout(self.refresh_timeout, self.assumer.assume_role(&request))
            .await
            .map_err(|_| Error::RefreshTimeout {
                role_arn: self.role_arn.clone(),
                timeout: self.refresh_timeout,
            })??;

        debug!(
            "Caching credentials until {}",
            assumed
                .expiration
                .fmt(Format::DateTime)
                .unwrap_or_else(|_| "unknown".to_string())
        );
        assumed.into_credentials(&self.role_arn)
    }
}

impl ProvideCredentials for AssumeRoleProvider {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        future::ProvideCredentials::new(self.credentials())
    }
}

/// Builder for [`AssumeRoleProvider`]
#[derive(Debug)]
pub struct Builder {
    role_arn: String,
    settings: RoleSettings,
    refresh_timeout: Duration,
    expiry_buffer: Duration,
    time: Arc<dyn TimeSource>,
}

impl Builder {
    fn new(role_arn: String) -> Self {
        Self {
            role_arn,
            settings: RoleSettings::default(),
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            expiry_buffer: DEFAULT_EXPIRY_BUFFER,
            time: Arc::new(SystemClock),
        }
    }

    pub fn settings(mut self, settings: RoleSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    pub fn expiry_buffer(mut self, buffer: Duration) -> Self {
        self.expiry_buffer = buffer;
        self
    }

    pub fn time_source(mut self, time: Arc<dyn TimeSource>) -> Self {
        self.time = time;
        self
    }

    pub fn build(self, assumer: Arc<dyn RoleAssumer>) -> AssumeRoleProvider {
        AssumeRoleProvider {
            role_arn: self.role_arn,
            assumer,
            settings: self.settings,
            refresh_timeout: self.refresh_timeout,
            cache: CredentialsCache::new(self.time, self.expiry_buffer),
        }
    }
}

fn default_session_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{ROLE_SESSION_NAME_PREFIX}-{millis}")
}

/// Produces the final config for a role on top of a shared base config.
#[derive(Debug, Clone)]
pub struct RoleConfigFactory {
    base: SdkConfig,
    assumer: Arc<dyn RoleAssumer>,
    settings: RoleSettings,
}

impl RoleConfigFactory {
    pub fn new(base: SdkConfig, assumer: Arc<dyn RoleAssumer>, settings: RoleSettings) -> Self {
        Self {
            base,
            assumer,
            settings,
        }
    }

    /// Without a role the base credentials are used as they are and STS is
    /// never called. Region and retry settings always come from the base.
    pub fn build(&self, role_arn: Option<&str>) -> ResolvedConfig {
        let Some(role_arn) = role_arn.filter(|arn| !arn.is_empty()) else {
            return ResolvedConfig::new(None, self.base.clone());
        };

        let provider = AssumeRoleProvider::builder(role_arn)
            .settings(self.settings.clone())
            .build(self.assumer.clone());
        let sdk_config = self
            .base
            .to_builder()
            .credentials_provider(SharedCredentialsProvider::new(provider))
            .build();

        ResolvedConfig::new(Some(role_arn.to_string()), sdk_config)
    }
}
