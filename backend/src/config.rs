//! Facility configuration.
//!
//! Settings come from an `lt.toml` file, from `LT_*` environment variables,
//! or from a file with environment overrides on top (see [`FacilityConfig::load`]).
//!
//! ```toml
//! username = "observer"
//! password = "secret"
//! host = "161.72.57.3"
//! port = 8080
//! timeout_secs = 30
//! debug = false
//! debug_output = "tom.RTML"
//!
//! [[proposals]]
//! label = "Transients"
//! id = "PL23A01"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{RtmlError, RtmlResult};
use crate::models::ProposalId;

pub const DEFAULT_HOST: &str = "161.72.57.3";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DEBUG_OUTPUT: &str = "tom.RTML";
pub const NODE_AGENT_PATH: &str = "/node_agent2/node_agent";

/// A proposal the configured user may submit against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub label: String,
    pub id: ProposalId,
}

/// Username/password pair sent as transport headers.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Liverpool Telescope facility settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct FacilityConfig {
    #[serde(default)]
    pub proposals: Vec<Proposal>,
    pub username: String,
    pub password: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Write documents to `debug_output` instead of sending them
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_debug_output")]
    pub debug_output: PathBuf,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_debug_output() -> PathBuf {
    PathBuf::from(DEFAULT_DEBUG_OUTPUT)
}

impl FacilityConfig {
    /// Configuration with defaults for everything but the credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            proposals: Vec::new(),
            username: username.into(),
            password: password.into(),
            host: default_host(),
            port: DEFAULT_PORT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            debug: false,
            debug_output: default_debug_output(),
        }
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> RtmlResult<Self> {
        let config: FacilityConfig = toml::from_str(content).map_err(|e| {
            RtmlError::Configuration(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> RtmlResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RtmlError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `lt.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> RtmlResult<Self> {
        match find_config_file(Path::new(".")) {
            Some(path) => Self::from_file(path),
            None => Err(RtmlError::Configuration(
                "No lt.toml found in standard locations".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `LT_USERNAME` (required): node agent user, also written as the contact
    /// - `LT_PASSWORD` (required): node agent password
    /// - `LT_HOST` (optional, default: `161.72.57.3`)
    /// - `LT_PORT` (optional, default: 8080)
    /// - `LT_TIMEOUT_SECS` (optional, default: 30)
    /// - `LT_DEBUG` (optional, default: false): `true`/`1`/`yes` enables the debug sink
    /// - `LT_DEBUG_OUTPUT` (optional, default: `tom.RTML`)
    /// - `LT_PROPOSALS` (optional): comma separated `label=id` pairs, or bare ids
    pub fn from_env() -> RtmlResult<Self> {
        let username = env::var("LT_USERNAME").map_err(|_| {
            RtmlError::Configuration("LT_USERNAME environment variable not set".to_string())
        })?;
        let password = env::var("LT_PASSWORD").map_err(|_| {
            RtmlError::Configuration("LT_PASSWORD environment variable not set".to_string())
        })?;

        let mut config = Self::new(username, password);
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// File from the default location with `LT_*` variables on top, falling
    /// back to the environment alone when no file exists.
    pub fn load() -> RtmlResult<Self> {
        Self::load_from(Path::new("."))
    }

    /// [`FacilityConfig::load`] with the search rooted at `base`.
    ///
    /// A file that exists but cannot be read or parsed is an error; only a
    /// missing file falls back to the environment.
    pub fn load_from(base: &Path) -> RtmlResult<Self> {
        let Some(path) = find_config_file(base) else {
            return Self::from_env();
        };

        let mut config = Self::from_file(&path)?;
        if let Ok(username) = env::var("LT_USERNAME") {
            config.username = username;
        }
        if let Ok(password) = env::var("LT_PASSWORD") {
            config.password = password;
        }
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> RtmlResult<()> {
        if let Ok(host) = env::var("LT_HOST") {
            self.host = host;
        }
        if let Ok(port) = env::var("LT_PORT") {
            self.port = port.parse().map_err(|_| {
                RtmlError::Configuration("LT_PORT must be a valid port number".to_string())
            })?;
        }
        if let Ok(secs) = env::var("LT_TIMEOUT_SECS") {
            self.timeout_secs = secs.parse().map_err(|_| {
                RtmlError::Configuration(
                    "LT_TIMEOUT_SECS must be a whole number of seconds".to_string(),
                )
            })?;
        }
        if let Ok(debug) = env::var("LT_DEBUG") {
            self.debug = parse_flag(&debug);
        }
        if let Ok(path) = env::var("LT_DEBUG_OUTPUT") {
            self.debug_output = PathBuf::from(path);
        }
        if let Ok(proposals) = env::var("LT_PROPOSALS") {
            self.proposals = parse_proposals(&proposals);
        }
        Ok(())
    }

    pub fn validate(&self) -> RtmlResult<()> {
        if self.username.trim().is_empty() {
            return Err(RtmlError::Configuration("username is empty".to_string()));
        }
        if self.host.trim().is_empty() {
            return Err(RtmlError::Configuration("host is empty".to_string()));
        }
        if self.port == 0 {
            return Err(RtmlError::Configuration("port must be non-zero".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(RtmlError::Configuration(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password)
    }

    /// `http://<host>:<port>/node_agent2/node_agent`
    pub fn endpoint_url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, NODE_AGENT_PATH)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn proposal(&self, id: &str) -> Option<&Proposal> {
        self.proposals.iter().find(|p| p.id.as_str() == id)
    }
}

/// Config file candidates, relative to the search root, in priority order.
const CONFIG_SEARCH_PATHS: [&str; 3] = ["lt.toml", "backend/lt.toml", "../lt.toml"];

fn find_config_file(base: &Path) -> Option<PathBuf> {
    CONFIG_SEARCH_PATHS
        .iter()
        .map(|candidate| base.join(candidate))
        .find(|path| path.exists())
}

impl fmt::Debug for FacilityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FacilityConfig")
            .field("proposals", &self.proposals)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("timeout_secs", &self.timeout_secs)
            .field("debug", &self.debug)
            .field("debug_output", &self.debug_output)
            .finish()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_proposals(value: &str) -> Vec<Proposal> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((label, id)) => Proposal {
                label: label.trim().to_string(),
                id: ProposalId::new(id.trim()),
            },
            None => Proposal {
                label: entry.to_string(),
                id: ProposalId::new(entry),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config = FacilityConfig::from_toml_str(
            r#"
            username = "observer"
            password = "secret"
            "#,
        )
        .unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, 8080);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(!config.debug);
        assert_eq!(config.debug_output, PathBuf::from("tom.RTML"));
        assert!(config.proposals.is_empty());
    }

    #[test]
    fn test_full_toml() {
        let config = FacilityConfig::from_toml_str(
            r#"
            username = "observer"
            password = "secret"
            host = "localhost"
            port = 9000
            timeout_secs = 5
            debug = true
            debug_output = "/tmp/out.rtml"

            [[proposals]]
            label = "Transients"
            id = "PL23A01"
            "#,
        )
        .unwrap();
        assert_eq!(config.endpoint_url(), "http://localhost:9000/node_agent2/node_agent");
        assert!(config.debug);
        assert_eq!(
            config.proposal("PL23A01").map(|p| p.label.as_str()),
            Some("Transients")
        );
        assert!(config.proposal("PL99Z99").is_none());
    }

    #[test]
    fn test_missing_credentials_is_configuration_error() {
        let result = FacilityConfig::from_toml_str("host = \"localhost\"");
        assert!(matches!(result, Err(RtmlError::Configuration(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = FacilityConfig::from_toml_str(
            r#"
            username = "observer"
            password = "secret"
            timeout_secs = 0
            "#,
        );
        assert!(matches!(result, Err(RtmlError::Configuration(_))));
    }

    #[test]
    fn test_debug_output_redacts_password() {
        let config = FacilityConfig::new("observer", "hunter2");
        let rendered = format!("{:?} {:?}", config, config.credentials());
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("observer"));
    }

    #[test]
    fn test_parse_proposals() {
        let proposals = parse_proposals("Transients=PL23A01, PL23B02 ,");
        assert_eq!(proposals.len(), 2);
        assert_eq!(proposals[0].label, "Transients");
        assert_eq!(proposals[0].id.as_str(), "PL23A01");
        assert_eq!(proposals[1].label, "PL23B02");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}
