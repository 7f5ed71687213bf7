use std::{env, path::PathBuf, time::Duration};

use dirs;

/// AWS configuration directory name
pub const AWS_CONFIG_DIR_NAME: &str = ".aws";

/// AWS configuration file name
pub const AWS_CONFIG_FILE_NAME: &str = "config";

/// AWS shared credentials file name
pub const AWS_CREDENTIALS_FILE_NAME: &str = "credentials";

/// Environment variable overriding the shared config file location
pub const AWS_CONFIG_FILE_ENV: &str = "AWS_CONFIG_FILE";

/// Environment variable overriding the shared credentials file location
pub const AWS_SHARED_CREDENTIALS_FILE_ENV: &str = "AWS_SHARED_CREDENTIALS_FILE";

/// Environment variables consulted for the region, in priority order
pub const AWS_REGION_ENVS: [&str; 2] = ["AWS_REGION", "AWS_DEFAULT_REGION"];

/// Profile used when none is configured
pub const DEFAULT_PROFILE: &str = "default";

/// Default AWS region for STS operations when no region is configured
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Prefix of generated STS role session names
pub const ROLE_SESSION_NAME_PREFIX: &str = "aws-dns-session";

/// Minimum STS session duration
pub const MIN_SESSION_DURATION: Duration = Duration::from_secs(15 * 60);

/// Maximum STS session duration
pub const MAX_SESSION_DURATION: Duration = Duration::from_secs(12 * 60 * 60);

/// Default STS session duration
pub const DEFAULT_SESSION_DURATION: Duration = Duration::from_secs(60 * 60);

/// Cached role credentials are refreshed once they are this close to expiring
pub const DEFAULT_EXPIRY_BUFFER: Duration = Duration::from_secs(5 * 60);

/// Upper bound on a single role assumption
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

/// Get the AWS config file path
/// Respects AWS_CONFIG_FILE environment variable if set
pub fn get_aws_config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(AWS_CONFIG_FILE_ENV) {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| home.join(AWS_CONFIG_DIR_NAME).join(AWS_CONFIG_FILE_NAME))
}

/// Get the AWS credentials file path
/// Respects AWS_SHARED_CREDENTIALS_FILE environment variable if set
pub fn get_aws_credentials_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(AWS_SHARED_CREDENTIALS_FILE_ENV) {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| {
        home.join(AWS_CONFIG_DIR_NAME)
            .join(AWS_CREDENTIALS_FILE_NAME)
    })
}
