//! Client library and CLI building blocks for the WEAPM-LOGSERVER log
//! management API.
//!
//! ```no_run
//! # async fn demo() -> weapm::Result<()> {
//! let config = weapm::Config::from_yaml(None, Some("prod"))?;
//! let client = weapm::WeapmClient::new(&config)?;
//! let dashboard = client.get_dashboard().await?;
//! println!("{} subsystems", dashboard.subsystem_count);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod cmd;
pub mod config;
pub mod error;
pub mod model;
pub mod utils;

pub use client::WeapmClient;
pub use config::Config;
pub use error::{Result, WeapmError};
