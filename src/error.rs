//! Error type shared by the configuration loader and the API client.
//!
//! `WeapmError::is_retryable` is the one place that decides whether the
//! retry loop may try a request again.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, WeapmError>;

/// Everything that can go wrong while loading configuration or talking to
/// the log server.
#[derive(Debug, Error)]
pub enum WeapmError {
    /// No configuration file at the resolved location.
    #[error(
        "configuration file not found: {} (create it with a `dev:` block containing `base_url`, or pass --base-url)",
        .0.display()
    )]
    ConfigNotFound(PathBuf),

    /// The file exists but could not be read.
    #[error("failed to read configuration file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML for the expected layout.
    #[error("failed to parse configuration file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The requested environment is not defined in the file.
    #[error("unknown environment '{env}' (available: {})", available.join(", "))]
    UnknownEnvironment { env: String, available: Vec<String> },

    /// A required key is missing from the selected environment.
    #[error("environment '{env}' is missing required field '{field}'")]
    MissingField { env: String, field: &'static str },

    /// `base_url` is not an absolute http(s) URL.
    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// A configuration value is out of range.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    /// Connection, timeout or body read failure.
    #[error("request failed: {0}")]
    Transport(String),

    /// 5xx (or 429) response. Retried.
    #[error("server error: {status} - {body}")]
    Server { status: u16, body: String },

    /// 4xx response. Never retried.
    #[error("client error: {status} - {body}")]
    Client { status: u16, body: String },

    /// The body was not the JSON shape we expected.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The server answered with a non-zero business code.
    #[error("API error (code {code}): {message}")]
    Api { code: i64, message: String },

    /// Every attempt failed with a retryable error.
    #[error("request failed after {retries} retries: {last}")]
    RetriesExhausted {
        retries: u32,
        #[source]
        last: Box<WeapmError>,
    },

    /// The request could not be built (bad path segment, body serialization).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl WeapmError {
    /// Whether the retry loop should attempt the request again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WeapmError::Transport(_) | WeapmError::Server { .. })
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            WeapmError::Server { status, .. } | WeapmError::Client { status, .. } => Some(*status),
            WeapmError::RetriesExhausted { last, .. } => last.status(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for WeapmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WeapmError::Transport(format!("timed out: {err}"))
        } else {
            WeapmError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_and_server_errors_are_retryable() {
        assert!(WeapmError::Transport("reset".into()).is_retryable());
        assert!(
            WeapmError::Server {
                status: 503,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            !WeapmError::Client {
                status: 404,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            !WeapmError::Api {
                code: 1,
                message: "nope".into()
            }
            .is_retryable()
        );
        assert!(!WeapmError::Decode("eof".into()).is_retryable());
    }

    #[test]
    fn exhausted_reports_last_status() {
        let err = WeapmError::RetriesExhausted {
            retries: 3,
            last: Box::new(WeapmError::Server {
                status: 502,
                body: "bad gateway".into(),
            }),
        };
        assert_eq!(err.status(), Some(502));
        assert_eq!(
            err.to_string(),
            "request failed after 3 retries: server error: 502 - bad gateway"
        );
    }

    #[test]
    fn unknown_environment_lists_choices() {
        let err = WeapmError::UnknownEnvironment {
            env: "qa".into(),
            available: vec!["dev".into(), "prod".into()],
        };
        assert_eq!(
            err.to_string(),
            "unknown environment 'qa' (available: dev, prod)"
        );
    }

    #[test]
    fn missing_config_tells_user_to_create_one() {
        let msg = WeapmError::ConfigNotFound(PathBuf::from("/etc/weapm/config.yaml")).to_string();
        assert!(msg.starts_with("configuration file not found: /etc/weapm/config.yaml"));
        assert!(msg.contains("create it"));
        assert!(msg.contains("--base-url"));
    }
}
