use std::{collections::HashMap, env, path::Path, time::Duration};

use aws_config::Region;
use ini::Ini;
use tracing::debug;

use crate::{
    constants::{
        self, AWS_REGION_ENVS, DEFAULT_PROFILE, DEFAULT_SESSION_DURATION, MAX_SESSION_DURATION,
        MIN_SESSION_DURATION,
    },
    error::{Error, Result},
};

/// User-supplied description of how AWS sessions should be built.
///
/// `assume_role` and `domain_roles` are independent: either, both, or neither may
/// be set. Empty strings are treated the same as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Shared credentials file profile
    pub profile: Option<String>,
    pub region: Option<String>,
    /// Role assumed for every domain without its own mapping
    pub assume_role: Option<String>,
    pub assume_role_external_id: Option<String>,
    /// Domain name to role ARN
    pub domain_roles: HashMap<String, String>,
    pub role_session_name: Option<String>,
    pub session_duration: Option<Duration>,
    /// Maximum attempts for the standard retry policy
    pub api_retries: Option<u32>,
}

impl SessionConfig {
    pub fn profile_name(&self) -> Option<&str> {
        non_empty(self.profile.as_deref())
    }

    /// The profile that is actually read, falling back to `default`.
    pub fn active_profile(&self) -> &str {
        self.profile_name().unwrap_or(DEFAULT_PROFILE)
    }

    pub fn assume_role_arn(&self) -> Option<&str> {
        non_empty(self.assume_role.as_deref())
    }

    pub fn external_id(&self) -> Option<&str> {
        non_empty(self.assume_role_external_id.as_deref())
    }

    pub fn session_name(&self) -> Option<&str> {
        non_empty(self.role_session_name.as_deref())
    }

    /// Requested STS session length, checked against the limits STS accepts.
    pub fn session_duration(&self) -> Result<Duration> {
        let duration = self.session_duration.unwrap_or(DEFAULT_SESSION_DURATION);
        if !(MIN_SESSION_DURATION..=MAX_SESSION_DURATION).contains(&duration) {
            return Err(Error::InvalidSessionDuration(duration));
        }
        Ok(duration)
    }

    /// Adds a mapping, normalizing the domain name.
    pub fn with_domain_role(mut self, domain: &str, role_arn: impl Into<String>) -> Self {
        self.domain_roles
            .insert(normalize_domain(domain), role_arn.into());
        self
    }

    /// Picks the region: explicit value, then the region environment variables,
    /// then the `region` key of the active profile in the shared config file.
    pub fn resolve_region(&self) -> Result<Option<Region>> {
        if let Some(region) = non_empty(self.region.as_deref()) {
            return Ok(Some(Region::new(region.to_string())));
        }

        for name in AWS_REGION_ENVS {
            if let Ok(value) = env::var(name) {
                if !value.is_empty() {
                    debug!("Using region {} from {}", value, name);
                    return Ok(Some(Region::new(value)));
                }
            }
        }

        let Some(path) = constants::get_aws_config_path() else {
            return Ok(None);
        };
        let region = region_from_config_file(&path, self.active_profile())?;
        if let Some(region) = &region {
            debug!("Using region {} from {}", region, path.display());
        }
        Ok(region.map(Region::new))
    }
}

/// Parses a `DOMAIN=ROLE_ARN` pair.
pub fn parse_domain_role(raw: &str) -> Result<(String, String)> {
    let (domain, role_arn) = raw
        .split_once('=')
        .ok_or_else(|| Error::InvalidDomainRole(raw.to_string()))?;

    let domain = normalize_domain(domain);
    let role_arn = role_arn.trim();
    if domain.is_empty() || role_arn.is_empty() {
        return Err(Error::InvalidDomainRole(raw.to_string()));
    }

    Ok((domain, role_arn.to_string()))
}

/// Lowercases and strips surrounding whitespace and the trailing root dot.
pub fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_ascii_lowercase()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn config_section_name(profile: &str) -> String {
    if profile == DEFAULT_PROFILE {
        profile.to_string()
    } else {
        format!("profile {profile}")
    }
}

fn region_from_config_file(path: &Path, profile: &str) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let ini = Ini::load_from_file(path).map_err(|source| Error::ConfigFile {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(ini
        .section(Some(config_section_name(profile)))
        .and_then(|section| section.get("region"))
        .filter(|region| !region.is_empty())
        .map(str::to_string))
}
