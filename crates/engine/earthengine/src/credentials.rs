//! Service-account credentials
//!
//! Credentials come from one of two places, checked in order:
//!
//! 1. a secrets file (TOML) holding an `[earthengine]` table with the fields of
//!    a Google service-account key;
//! 2. a service-account JSON key file on disk, optionally paired with an
//!    explicit service-account e-mail.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Google's OAuth token endpoint, used when the key does not name one
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Name of the secrets table holding the key fields
pub const SECRETS_TABLE: &str = "earthengine";

/// The fields of a service-account key this client needs
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    /// PEM-encoded RSA private key
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("private_key_id", &self.private_key_id)
            .field("project_id", &self.project_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// Parse a JSON key as downloaded from the cloud console
    pub fn from_json(text: &str) -> Result<Self> {
        let key: Self = serde_json::from_str(text)
            .map_err(|e| Error::Credentials(format!("invalid service-account key: {e}")))?;
        key.check()?;
        Ok(key)
    }

    /// Read the `[earthengine]` table of a secrets file
    ///
    /// Returns `Ok(None)` when the file has no such table.
    pub fn from_secrets_toml(text: &str) -> Result<Option<Self>> {
        let mut table: toml::Table = toml::from_str(text)
            .map_err(|e| Error::Credentials(format!("invalid secrets file: {e}")))?;

        let Some(section) = table.remove(SECRETS_TABLE) else {
            return Ok(None);
        };

        let key: Self = section
            .try_into()
            .map_err(|e| Error::Credentials(format!("invalid [{SECRETS_TABLE}] table: {e}")))?;
        key.check()?;
        Ok(Some(key))
    }

    /// Read a JSON key file, optionally overriding the service-account e-mail
    pub fn from_key_file(path: &Path, service_account: Option<&str>) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::KeyFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut key = Self::from_json(&text)?;
        if let Some(email) = service_account {
            key.client_email = email.to_string();
        }
        Ok(key)
    }

    pub fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }

    fn check(&self) -> Result<()> {
        if self.client_email.trim().is_empty() {
            return Err(Error::Credentials("client_email is empty".into()));
        }
        if !self.private_key.contains("PRIVATE KEY") {
            return Err(Error::Credentials(
                "private_key is not a PEM-encoded key".into(),
            ));
        }
        Ok(())
    }
}

/// Where to look for credentials
#[derive(Debug, Clone)]
pub struct CredentialSource {
    /// Secrets file with an `[earthengine]` table
    pub secrets_path: PathBuf,
    /// Fallback JSON key file
    pub key_file: PathBuf,
    /// Service-account e-mail to use with the key file
    pub service_account: Option<String>,
}

impl CredentialSource {
    /// Resolve credentials, preferring the secrets file
    pub fn load(&self) -> Result<ServiceAccountKey> {
        if self.secrets_path.is_file() {
            let text = std::fs::read_to_string(&self.secrets_path).map_err(|source| {
                Error::KeyFile {
                    path: self.secrets_path.clone(),
                    source,
                }
            })?;
            if let Some(key) = ServiceAccountKey::from_secrets_toml(&text)? {
                tracing::info!(
                    "Using Earth Engine credentials from {:?} for {}",
                    self.secrets_path,
                    key.client_email
                );
                return Ok(key);
            }
            tracing::debug!(
                "{:?} has no [{}] table, falling back to key file",
                self.secrets_path,
                SECRETS_TABLE
            );
        }

        let key = ServiceAccountKey::from_key_file(&self.key_file, self.service_account.as_deref())?;
        tracing::info!(
            "Using Earth Engine key file {:?} for {}",
            self.key_file,
            key.client_email
        );
        Ok(key)
    }
}
