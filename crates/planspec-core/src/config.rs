//! Publisher configuration and the credential source.
//!
//! Layers, later wins:
//! 1. defaults (`http://localhost:8085`, 30s timeout)
//! 2. the `.credentials` file
//! 3. `PLANSPEC_*` environment variables
//! 4. explicit overrides from the caller (CLI flags)

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::error::{PublishError, Result};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8085";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CREDENTIALS_FILE: &str = ".credentials";

pub const ENV_SERVER: &str = "PLANSPEC_SERVER";
pub const ENV_USERNAME: &str = "PLANSPEC_USERNAME";
pub const ENV_PASSWORD: &str = "PLANSPEC_PASSWORD";
pub const ENV_TOKEN: &str = "PLANSPEC_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "PLANSPEC_TIMEOUT_SECS";

/// Server credentials. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic { username: String, password: String },
    Token { token: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::Token { .. } => f
                .debug_struct("Token")
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

impl Credentials {
    /// Read a properties file of `key=value` lines.
    ///
    /// Recognized keys: `username`, `password`, `token`, and `server`
    /// (ignored here, see [`PublisherConfig::load`]). A token wins over a
    /// username/password pair.
    pub fn from_file(path: &Path) -> Result<Self> {
        let properties = read_properties(path)?;
        Self::from_properties(&properties).ok_or_else(|| {
            PublishError::Config(format!(
                "{} has neither token nor username/password",
                path.display()
            ))
        })
    }

    fn from_properties(properties: &HashMap<String, String>) -> Option<Self> {
        if let Some(token) = properties.get("token").filter(|t| !t.is_empty()) {
            return Some(Credentials::Token {
                token: token.clone(),
            });
        }
        match (properties.get("username"), properties.get("password")) {
            (Some(username), Some(password)) if !username.is_empty() => Some(Credentials::Basic {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

/// Parse `key=value` lines; blank lines and `#`/`!` comments are skipped.
fn read_properties(path: &Path) -> Result<HashMap<String, String>> {
    let content = std::fs::read_to_string(path)?;
    let mut properties = HashMap::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let (key, value) = line.split_once('=').ok_or_else(|| {
            PublishError::Config(format!(
                "{}:{}: expected key=value",
                path.display(),
                lineno + 1
            ))
        })?;
        properties.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(properties)
}

/// Where and how to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherConfig {
    pub server_url: String,
    pub credentials: Option<Credentials>,
    /// Bound on one publish call, connection included.
    pub timeout: Duration,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        PublisherConfig {
            server_url: DEFAULT_SERVER_URL.to_string(),
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PublisherConfig {
    /// Create config for a specific server.
    pub fn new(server_url: &str) -> Self {
        PublisherConfig {
            server_url: server_url.to_string(),
            ..Self::default()
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Defaults, then `credentials_file` (or `./.credentials` if present),
    /// then the process environment.
    pub fn load(credentials_file: Option<&Path>) -> Result<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::load_from(credentials_file, &env)
    }

    fn load_from(credentials_file: Option<&Path>, env: &HashMap<String, String>) -> Result<Self> {
        let mut config = Self::default();

        let path = match credentials_file {
            Some(p) => Some(p.to_path_buf()),
            None => Some(PathBuf::from(DEFAULT_CREDENTIALS_FILE)).filter(|p| p.exists()),
        };
        if let Some(path) = path {
            debug!(path = %path.display(), "Reading credentials file");
            let properties = read_properties(&path)?;
            if let Some(server) = properties.get("server").filter(|s| !s.is_empty()) {
                config.server_url = server.clone();
            }
            config.credentials = Credentials::from_properties(&properties);
        }

        config.apply_env(env)?;
        Ok(config)
    }

    fn apply_env(&mut self, env: &HashMap<String, String>) -> Result<()> {
        if let Some(server) = env.get(ENV_SERVER) {
            self.server_url = server.clone();
        }
        if let Some(token) = env.get(ENV_TOKEN) {
            self.credentials = Some(Credentials::Token {
                token: token.clone(),
            });
        } else {
            match (env.get(ENV_USERNAME), env.get(ENV_PASSWORD)) {
                (Some(username), Some(password)) => {
                    self.credentials = Some(Credentials::Basic {
                        username: username.clone(),
                        password: password.clone(),
                    });
                }
                (Some(_), None) | (None, Some(_)) => {
                    return Err(PublishError::Config(format!(
                        "{ENV_USERNAME} and {ENV_PASSWORD} must be set together"
                    )));
                }
                (None, None) => {}
            }
        }
        if let Some(secs) = env.get(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.parse().map_err(|_| {
                PublishError::Config(format!("{ENV_TIMEOUT_SECS} must be whole seconds, got {secs:?}"))
            })?;
            self.timeout = Duration::from_secs(secs);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn credentials_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = PublisherConfig::default();
        assert_eq!(config.server_url, "http://localhost:8085");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_credentials_file_basic() {
        let file = credentials_file("# ci user\nusername = builder\npassword=s3cret=x\n");
        let creds = Credentials::from_file(file.path()).unwrap();
        assert_eq!(
            creds,
            Credentials::Basic {
                username: "builder".to_string(),
                password: "s3cret=x".to_string(),
            }
        );
    }

    #[test]
    fn test_credentials_file_token_wins() {
        let file = credentials_file("username=builder\npassword=pw\ntoken=abc\n");
        let creds = Credentials::from_file(file.path()).unwrap();
        assert_eq!(
            creds,
            Credentials::Token {
                token: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_credentials_file_malformed_line() {
        let file = credentials_file("username\n");
        let err = Credentials::from_file(file.path()).unwrap_err();
        assert!(matches!(err, PublishError::Config(_)));
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = Credentials::Basic {
            username: "builder".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{:?}", creds);
        assert!(debug.contains("builder"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = credentials_file("server=http://ci.internal:8085\nusername=a\npassword=b\n");
        let env: HashMap<String, String> = [
            (ENV_TOKEN.to_string(), "from-env".to_string()),
            (ENV_TIMEOUT_SECS.to_string(), "5".to_string()),
        ]
        .into_iter()
        .collect();

        let config = PublisherConfig::load_from(Some(file.path()), &env).unwrap();
        assert_eq!(config.server_url, "http://ci.internal:8085");
        assert_eq!(
            config.credentials,
            Some(Credentials::Token {
                token: "from-env".to_string()
            })
        );
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_bad_timeout_env_rejected() {
        let env: HashMap<String, String> =
            [(ENV_TIMEOUT_SECS.to_string(), "soon".to_string())].into_iter().collect();
        let mut config = PublisherConfig::default();
        assert!(config.apply_env(&env).is_err());
    }

    #[test]
    fn test_username_without_password_rejected() {
        let env: HashMap<String, String> =
            [(ENV_USERNAME.to_string(), "builder".to_string())].into_iter().collect();
        let err = PublisherConfig::load_from(None, &env).unwrap_err();
        assert!(matches!(err, PublishError::Config(msg) if msg.contains(ENV_PASSWORD)));

        let env: HashMap<String, String> =
            [(ENV_PASSWORD.to_string(), "pw".to_string())].into_iter().collect();
        assert!(PublisherConfig::load_from(None, &env).is_err());
    }

    #[test]
    fn test_token_env_takes_precedence_over_partial_basic() {
        let env: HashMap<String, String> = [
            (ENV_TOKEN.to_string(), "abc".to_string()),
            (ENV_USERNAME.to_string(), "builder".to_string()),
        ]
        .into_iter()
        .collect();
        let config = PublisherConfig::load_from(None, &env).unwrap();
        assert_eq!(
            config.credentials,
            Some(Credentials::Token {
                token: "abc".to_string()
            })
        );
    }
}
