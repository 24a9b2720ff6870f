use std::{env, path::PathBuf, time::Duration};
use vegscope_earthengine::CredentialSource;

/// Configuration for the vegscope server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address and port the server binds to (e.g. `0.0.0.0:8501`).
    pub bind_address: String,
    /// Secrets file holding an `[earthengine]` service-account table.
    pub secrets_path: PathBuf,
    /// Service-account JSON key used when the secrets file has no table.
    pub key_file: PathBuf,
    /// Overrides the key file's `client_email`.
    pub service_account: Option<String>,
    /// Earth Engine cloud project; defaults to the key's `project_id`.
    pub ee_project: Option<String>,
    /// Identifies the server to the geocoder and the imagery service.
    pub user_agent: String,
    /// Sessions idle for longer than this are dropped.
    pub session_ttl: Duration,
}

impl ServerConfig {
    /// Builds a configuration from `VEGSCOPE_*` environment variables, falling
    /// back to defaults for a local run.
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_address = env::var("VEGSCOPE_BIND").unwrap_or_else(|_| "0.0.0.0:8501".into());
        let secrets_path = env::var("VEGSCOPE_SECRETS")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("secrets.toml"));
        let key_file = env::var("VEGSCOPE_KEY_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("credentials.json"));
        let service_account = non_empty_var("VEGSCOPE_SERVICE_ACCOUNT");
        let ee_project = non_empty_var("VEGSCOPE_EE_PROJECT");
        let user_agent =
            env::var("VEGSCOPE_USER_AGENT").unwrap_or_else(|_| "vegscope/0.1".into());

        let ttl_secs: u64 = match env::var("VEGSCOPE_SESSION_TTL_SECS") {
            Ok(v) => v
                .parse()
                .map_err(|e| anyhow::anyhow!("VEGSCOPE_SESSION_TTL_SECS={v:?}: {e}"))?,
            Err(_) => 3600,
        };
        anyhow::ensure!(ttl_secs >= 1, "session TTL must be at least one second");

        Ok(Self {
            bind_address,
            secrets_path,
            key_file,
            service_account,
            ee_project,
            user_agent,
            session_ttl: Duration::from_secs(ttl_secs),
        })
    }

    /// Where to look for Earth Engine credentials.
    pub fn credential_source(&self) -> CredentialSource {
        CredentialSource {
            secrets_path: self.secrets_path.clone(),
            key_file: self.key_file.clone(),
            service_account: self.service_account.clone(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_source_mirrors_config() {
        let config = ServerConfig {
            bind_address: "127.0.0.1:0".into(),
            secrets_path: PathBuf::from("/etc/vegscope/secrets.toml"),
            key_file: PathBuf::from("/etc/vegscope/key.json"),
            service_account: Some("svc@example.iam.gserviceaccount.com".into()),
            ee_project: None,
            user_agent: "vegscope-test".into(),
            session_ttl: Duration::from_secs(60),
        };

        let source = config.credential_source();
        assert_eq!(source.secrets_path, config.secrets_path);
        assert_eq!(source.key_file, config.key_file);
        assert_eq!(source.service_account, config.service_account);
    }
}
