//! Multi-account AWS credential resolution.
//!
//! A [`SessionConfig`] is resolved into one SDK config per distinct IAM role:
//! one for every role in the domain mapping plus the global assume-role ARN,
//! or a single config on the base credential chain when no role is set. Each
//! role-scoped config assumes its role lazily and refreshes it before expiry.

pub mod aws;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;

#[cfg(test)]
mod test_util;

pub use aws::{ResolvedConfig, ResolvedConfigs, RoleAssumer, StsRoleAssumer, resolve};
pub use config::SessionConfig;
pub use error::{Error, Result};
