//! Client configuration.
//!
//! A YAML file holds one block per environment plus an `active_env` key:
//!
//! ```yaml
//! active_env: dev
//! dev:
//!   base_url: http://127.0.0.1:8080
//!   description: local
//! prod:
//!   base_url: https://weapm.example.internal
//!   username: weapmUser
//!   password: secret
//!   timeout: 30
//!   max_retries: 3
//!   retry_backoff_factor: 0.5
//!   enable_logging: false
//! ```
//!
//! `Config::from_yaml` selects an environment (explicit > `active_env` > `dev`),
//! validates `base_url` and fills in defaults for every other key.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::error::{Result, WeapmError};

pub const DEFAULT_USERNAME: &str = "weapmUser";
pub const DEFAULT_PASSWORD: &str = "Weapm@123admin";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF_SECS: f64 = 0.5;
pub const DEFAULT_POOL_CONNECTIONS: usize = 10;
pub const DEFAULT_ENV: &str = "dev";
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/* ---- Raw file layout ---- */

/// The YAML document as written on disk.
#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub active_env: Option<String>,
    #[serde(flatten)]
    pub environments: BTreeMap<String, EnvProfile>,
}

/// One environment block. Every key is optional at parse time; `base_url`
/// is enforced when the block is resolved.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct EnvProfile {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Seconds.
    pub timeout: Option<u64>,
    pub max_retries: Option<u32>,
    /// Seconds; the delay before retry `n` is `n * retry_backoff_factor`.
    pub retry_backoff_factor: Option<f64>,
    pub pool_connections: Option<usize>,
    pub enable_logging: Option<bool>,
    pub description: Option<String>,
}

impl ConfigFile {
    pub fn parse(raw: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(raw).map_err(|source| WeapmError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Names of all environment blocks, sorted.
    pub fn environment_names(&self) -> Vec<String> {
        self.environments.keys().cloned().collect()
    }

    /// Pick the environment to use: explicit name, then `active_env`, then `dev`.
    pub fn select<'a>(&'a self, env: Option<&'a str>) -> Result<(&'a str, &'a EnvProfile)> {
        let name = env
            .filter(|e| !e.trim().is_empty())
            .or(self.active_env.as_deref().filter(|e| !e.trim().is_empty()))
            .unwrap_or(DEFAULT_ENV);
        match self.environments.get(name) {
            Some(profile) => Ok((name, profile)),
            None => Err(WeapmError::UnknownEnvironment {
                env: name.to_string(),
                available: self.environment_names(),
            }),
        }
    }
}

/* ---- Resolved configuration ---- */

/// Runtime configuration for one client.
#[derive(Clone)]
pub struct Config {
    pub base_url: Url,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub pool_connections: usize,
    pub enable_logging: bool,
    /// Environment name the configuration came from (`None` for ad-hoc URLs).
    pub env: Option<String>,
    pub description: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff", &self.retry_backoff)
            .field("pool_connections", &self.pool_connections)
            .field("enable_logging", &self.enable_logging)
            .field("env", &self.env)
            .finish()
    }
}

/// Command-line values that take precedence over whatever source was loaded.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Built-in defaults for an ad-hoc base URL.
    pub fn with_base_url(raw: &str) -> Result<Self> {
        Ok(Config {
            base_url: parse_base_url(raw)?,
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: Duration::from_secs_f64(DEFAULT_RETRY_BACKOFF_SECS),
            pool_connections: DEFAULT_POOL_CONNECTIONS,
            enable_logging: true,
            env: None,
            description: None,
        })
    }

    /// Load a YAML file and resolve one of its environments.
    ///
    /// `path = None` uses [`default_config_path`].
    pub fn from_yaml(path: Option<&Path>, env: Option<&str>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
        if !path.is_file() {
            return Err(WeapmError::ConfigNotFound(path));
        }
        let raw = std::fs::read_to_string(&path).map_err(|source| WeapmError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        let file = ConfigFile::parse(&raw, &path)?;
        let (name, profile) = file.select(env)?;
        let config = Config::from_profile(name, profile)?;

        info!(
            description = config.description.as_deref().unwrap_or(name),
            env = name,
            path = %path.display(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// Resolve a single environment block, applying defaults.
    pub fn from_profile(env: &str, profile: &EnvProfile) -> Result<Self> {
        let raw_url = profile
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| WeapmError::MissingField {
                env: env.to_string(),
                field: "base_url",
            })?;

        let timeout_secs = profile.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(WeapmError::InvalidValue {
                field: "timeout",
                reason: "must be at least one second".into(),
            });
        }

        let backoff = profile
            .retry_backoff_factor
            .unwrap_or(DEFAULT_RETRY_BACKOFF_SECS);
        let retry_backoff =
            Duration::try_from_secs_f64(backoff).map_err(|e| WeapmError::InvalidValue {
                field: "retry_backoff_factor",
                reason: format!("expected a non-negative number of seconds, got {backoff} ({e})"),
            })?;

        Ok(Config {
            base_url: parse_base_url(raw_url)?,
            username: profile
                .username
                .clone()
                .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            password: profile
                .password
                .clone()
                .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            max_retries: profile.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            retry_backoff,
            pool_connections: profile
                .pool_connections
                .unwrap_or(DEFAULT_POOL_CONNECTIONS),
            enable_logging: profile.enable_logging.unwrap_or(true),
            env: Some(env.to_string()),
            description: profile.description.clone(),
        })
    }

    /// Apply command-line overrides in place.
    pub fn apply(&mut self, overrides: &ConfigOverrides) -> Result<()> {
        if let Some(u) = &overrides.username {
            self.username = u.clone();
        }
        if let Some(p) = &overrides.password {
            self.password = p.clone();
        }
        if let Some(secs) = overrides.timeout_secs {
            if secs == 0 {
                return Err(WeapmError::InvalidValue {
                    field: "timeout",
                    reason: "must be at least one second".into(),
                });
            }
            self.timeout = Duration::from_secs(secs);
        }
        debug!(config = ?self, "effective configuration");
        Ok(())
    }

    /// Human label for the configuration source.
    pub fn label(&self) -> String {
        match (&self.description, &self.env) {
            (Some(d), Some(e)) => format!("{d} ({e})"),
            (None, Some(e)) => e.clone(),
            _ => self.base_url.to_string(),
        }
    }
}

/// `./config.yaml` if it exists, otherwise `config.yaml` beside the executable.
pub fn default_config_path() -> PathBuf {
    let exe = std::env::current_exe().ok();
    config_path_between(PathBuf::from(CONFIG_FILE_NAME), exe.as_deref())
}

fn config_path_between(local: PathBuf, exe: Option<&Path>) -> PathBuf {
    if local.is_file() {
        return local;
    }
    exe.and_then(Path::parent)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .unwrap_or(local)
}

/// Parse and validate a base URL (absolute, http or https).
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|e| WeapmError::InvalidBaseUrl {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(WeapmError::InvalidBaseUrl {
                url: trimmed.to_string(),
                reason: format!("unsupported scheme '{other}' (expected http or https)"),
            });
        }
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(WeapmError::InvalidBaseUrl {
            url: trimmed.to_string(),
            reason: "missing host".into(),
        });
    }
    Ok(url)
}
