use std::path::Path;

use aws_credential_types::Credentials;
use ini::Ini;
use tracing::debug;

use crate::error::{Error, Result};

pub(crate) const PROFILE_PROVIDER_NAME: &str = "SharedCredentialsFile";

/// Load a profile's static keys from the shared credentials file.
///
/// With `required` unset a missing file or section yields `Ok(None)` so the
/// chain can fall through; with it set both are errors. An unparsable file or
/// a section without keys is always an error.
pub fn load_profile_credentials(
    path: Option<&Path>,
    profile: &str,
    required: bool,
) -> Result<Option<Credentials>> {
    let Some(path) = path.filter(|p| p.exists()) else {
        debug!("No AWS credentials file found");
        return match (required, path) {
            (true, Some(path)) => Err(Error::ProfileNotFound {
                profile: profile.to_string(),
                path: path.to_path_buf(),
            }),
            (true, None) => Err(Error::ProfileNotFound {
                profile: profile.to_string(),
                path: Default::default(),
            }),
            (false, _) => Ok(None),
        };
    };

    let ini = Ini::load_from_file(path).map_err(|source| Error::CredentialsFile {
        path: path.to_path_buf(),
        source,
    })?;

    let Some(section) = ini.section(Some(profile)) else {
        if required {
            return Err(Error::ProfileNotFound {
                profile: profile.to_string(),
                path: path.to_path_buf(),
            });
        }
        debug!("Profile '{}' not present in {}", profile, path.display());
        return Ok(None);
    };

    let access_key_id = section
        .get("aws_access_key_id")
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::IncompleteProfile {
            profile: profile.to_string(),
            key: "aws_access_key_id",
        })?;

    let secret_access_key = section
        .get("aws_secret_access_key")
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::IncompleteProfile {
            profile: profile.to_string(),
            key: "aws_secret_access_key",
        })?;

    let session_token = section
        .get("aws_session_token")
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    debug!("Loaded profile '{}' from {}", profile, path.display());
    Ok(Some(Credentials::new(
        access_key_id,
        secret_access_key,
        session_token,
        None,
        PROFILE_PROVIDER_NAME,
    )))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::{fs, path::PathBuf};
    use tempfile::TempDir;

    pub(crate) const TWO_PROFILES: &str = "[profile1]\naws_access_key_id=AKID1234\naws_secret_access_key=SECRET1\n\n[profile2]\naws_access_key_id=AKID2345\naws_secret_access_key=SECRET2\n";

    pub(crate) fn write_credentials_file(contents: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_named_profile() {
        let (_dir, path) = write_credentials_file(TWO_PROFILES);

        let creds = load_profile_credentials(Some(&path), "profile2", true)
            .unwrap()
            .unwrap();

        assert_eq!(creds.access_key_id(), "AKID2345");
        assert_eq!(creds.secret_access_key(), "SECRET2");
        assert_eq!(creds.session_token(), None);
    }

    #[test]
    fn test_load_session_token() {
        let (_dir, path) = write_credentials_file(
            "[default]\naws_access_key_id=AKID\naws_secret_access_key=SECRET\naws_session_token=TOKEN\n",
        );

        let creds = load_profile_credentials(Some(&path), "default", false)
            .unwrap()
            .unwrap();

        assert_eq!(creds.session_token(), Some("TOKEN"));
    }

    #[test]
    fn test_missing_required_profile() {
        let (_dir, path) = write_credentials_file(TWO_PROFILES);

        let err = load_profile_credentials(Some(&path), "profile3", true).unwrap_err();
        assert!(matches!(err, Error::ProfileNotFound { ref profile, .. } if profile == "profile3"));
    }

    #[test]
    fn test_missing_optional_profile() {
        let (_dir, path) = write_credentials_file(TWO_PROFILES);

        let creds = load_profile_credentials(Some(&path), "default", false).unwrap();
        assert!(creds.is_none());
    }

    #[test]
    fn test_missing_file() {
        let path = PathBuf::from("/nonexistent/aws/credentials");

        assert!(
            load_profile_credentials(Some(&path), "default", false)
                .unwrap()
                .is_none()
        );
        assert!(matches!(
            load_profile_credentials(Some(&path), "profile1", true),
            Err(Error::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn test_incomplete_profile() {
        let (_dir, path) = write_credentials_file("[profile1]\naws_access_key_id=AKID1234\n");

        let err = load_profile_credentials(Some(&path), "profile1", true).unwrap_err();
        assert!(matches!(
            err,
            Error::IncompleteProfile {
                key: "aws_secret_access_key",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_file() {
        let (_dir, path) = write_credentials_file("[profile1\naws_access_key_id=AKID1234\n");

        let err = load_profile_credentials(Some(&path), "profile1", false).unwrap_err();
        assert!(matches!(err, Error::CredentialsFile { .. }));
    }
}
