//! Utilities: logging setup driven by `-v` / `-q`.
//!
//! Logs go to stderr through `tracing-subscriber` so stdout only carries
//! command output. `RUST_LOG`, when set, replaces the derived level.

use tracing_subscriber::EnvFilter;

/// Logging helpers.
pub mod logging {
    use super::*;

    #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
    pub enum LogLevel {
        Error = 0,
        Info = 1,
        Debug = 2,
        Trace = 3,
    }

    impl LogLevel {
        pub fn as_str(&self) -> &'static str {
            match self {
                LogLevel::Error => "error",
                LogLevel::Info => "info",
                LogLevel::Debug => "debug",
                LogLevel::Trace => "trace",
            }
        }
    }

    pub fn derive_level(verbose: u8, quiet: bool) -> LogLevel {
        if quiet {
            return LogLevel::Error;
        }
        match verbose {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// Filter for our own crate at `level`, dependencies one notch quieter
    /// unless tracing everything.
    pub fn build_filter(level: LogLevel) -> EnvFilter {
        if let Ok(from_env) = EnvFilter::try_from_default_env() {
            return from_env;
        }
        let deps = match level {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "info",
            _ => "warn",
        };
        EnvFilter::new(format!("{deps},weapm={}", level.as_str()))
    }

    /// Install the global subscriber. Safe to call more than once; later
    /// calls are ignored.
    pub fn init_logging(level: LogLevel) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(build_filter(level))
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

pub use logging::{derive_level, init_logging};
