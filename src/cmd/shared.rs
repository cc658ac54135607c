/*!
shared.rs - pieces every subcommand needs.

  - ConnectionArgs: global flags that pick and tweak the configuration
  - Session: resolved config + client + a Tokio runtime to drive it
  - Output: JSON vs. human rendering switch
*/

use std::future::Future;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::client::WeapmClient;
use crate::cmd::format::{Glyph, Role, StyleOptions, color, with_glyph};
use crate::config::{Config, ConfigOverrides};
use crate::error::WeapmError;
use crate::model::ApiEnvelope;

/* ---- Connection flags ---- */

/// Where to find the server and how to authenticate.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Configuration file (defaults to ./config.yaml, then config.yaml next to the binary)
    #[arg(short = 'c', long = "config", global = true, env = "WEAPM_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Environment block to use from the configuration file (e.g. dev, prod)
    #[arg(short = 'e', long = "env", global = true, env = "WEAPM_ENV", value_name = "NAME")]
    pub env: Option<String>,

    /// Talk to this server directly with built-in defaults (ignored when --config/--env is set)
    #[arg(long = "base-url", global = true, env = "WEAPM_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// Override the API username
    #[arg(long, global = true, env = "WEAPM_USERNAME")]
    pub username: Option<String>,

    /// Override the API password
    #[arg(long, global = true, env = "WEAPM_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Override the request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl ConnectionArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            username: self.username.clone(),
            password: self.password.clone(),
            timeout_secs: self.timeout,
        }
    }

    /// Resolve the configuration:
    ///   1. --config or --env      -> YAML file
    ///   2. --base-url             -> built-in defaults for that URL
    ///   3. neither                -> YAML file at the default location
    /// then apply --username / --password / --timeout.
    pub fn resolve(&self) -> Result<Config> {
        let mut config = if self.config.is_some() || self.env.is_some() {
            Config::from_yaml(self.config.as_deref(), self.env.as_deref())
                .context("failed to load configuration")?
        } else if let Some(url) = self.base_url.as_deref() {
            Config::with_base_url(url).context("invalid --base-url")?
        } else {
            Config::from_yaml(None, None).context("failed to load configuration")?
        };
        config.apply(&self.overrides())?;
        Ok(config)
    }
}

/// Add a credentials hint to errors caused by a 401/403 from the server.
pub fn with_auth_hint(err: anyhow::Error) -> anyhow::Error {
    match err.downcast_ref::<WeapmError>().and_then(WeapmError::status) {
        Some(code @ (401 | 403)) => err.context(format!(
            "server rejected the credentials (HTTP {code}); check --username/--password or the config file"
        )),
        _ => err,
    }
}

/* ---- Output ---- */

/// Chooses between pretty JSON and human-readable text.
#[derive(Debug, Clone)]
pub struct Output {
    pub json: bool,
    pub style: StyleOptions,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            style: StyleOptions::detect(),
        }
    }

    /// Print `value` as JSON, or whatever `human` renders.
    pub fn emit<T, F>(&self, value: &T, human: F) -> Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&StyleOptions) -> String,
    {
        println!("{}", self.render(value, human)?);
        Ok(())
    }

    pub fn render<T, F>(&self, value: &T, human: F) -> Result<String>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&StyleOptions) -> String,
    {
        if self.json {
            serde_json::to_string_pretty(value).context("failed to serialize output")
        } else {
            Ok(human(&self.style))
        }
    }

    /// Report a mutation: the envelope as JSON, or a one-line confirmation.
    pub fn done(&self, envelope: &ApiEnvelope, summary: &str) -> Result<()> {
        self.emit(envelope, |style| {
            let mut line = color(Role::Good, with_glyph(Glyph::Ok, summary, style), style);
            let msg = envelope.message();
            if !msg.is_empty() {
                line.push_str(&color(Role::Dim, format!(" ({msg})"), style));
            }
            line
        })
    }
}

/* ---- Session ---- */

/// Everything a command needs to talk to the server.
#[derive(Debug)]
pub struct Session {
    pub config: Config,
    pub client: WeapmClient,
    pub out: Output,
    runtime: tokio::runtime::Runtime,
}

impl Session {
    pub fn open(conn: &ConnectionArgs, json: bool) -> Result<Self> {
        let config = conn.resolve()?;
        let client = WeapmClient::new(&config).context("failed to create API client")?;
        let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
        Ok(Self {
            config,
            client,
            out: Output::new(json),
            runtime,
        })
    }

    /// Drive one client future to completion.
    pub fn run<F: Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }

    /// Short description of where requests go, for headers.
    pub fn target_label(&self) -> String {
        match &self.config.env {
            Some(_) => format!("{} • {}", self.config.label(), self.client.base_url()),
            None => self.client.base_url().to_string(),
        }
    }
}
