//! Configuration management for gh.
//!
//! This crate loads the per-user configuration file, upgrades it from the
//! legacy layout when a write needs the modern one, and exposes hosts,
//! credentials, and settings through a single [`Config`] contract.
//!
//! # Overview
//!
//! The crate is organized into the following modules:
//!
//! - [`config`]: The [`Config`] facade, its two layouts, and the loader
//! - [`auth`]: Host and credential records resolved from the `hosts` block
//! - [`document`]: The ordered YAML tree the facade reads from
//! - [`format`]: Legacy vs. modern layout detection
//! - [`migration`]: Backed-up rewrite of legacy files
//! - [`persistence`]: Config file location and reading
//! - [`protocol`]: Git transport protocol setting
//! - [`error`]: Error types for configuration operations
//!
//! # File Format
//!
//! ```yaml
//! hosts:
//!   github.com:
//!     - user: monalisa
//!       oauth_token: OTOKEN
//! editor: /usr/bin/vim    # optional, must be absolute
//! git_protocol: ssh       # optional, https or ssh, defaults to https
//! ```
//!
//! Older files have the host entries at the top level with no `hosts`
//! wrapper. They can be read as-is; loading them for writing rewrites them
//! into the layout above and keeps the original as `config.yml.bak`.
//!
//! # Examples
//!
//! ```no_run
//! use gh_config::{Config, ConfigLoader};
//!
//! # fn main() -> gh_config::Result<()> {
//! let config = ConfigLoader::new().load_default()?;
//!
//! let github = config.default_host_config()?;
//! if let Some(auth) = github.default_auth() {
//!     println!("Logged in to {} as {}", github.host(), auth.user());
//! }
//! println!("Cloning over {}", config.git_protocol()?);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod document;
pub mod error;
pub mod format;
pub mod migration;
pub mod persistence;
pub mod protocol;

// Re-export primary types at crate root for convenience
pub use auth::{AuthConfig, DEFAULT_HOSTNAME, HostConfig};
pub use config::{Config, ConfigLoader, LegacyConfig, ModernConfig, parse_config};
pub use error::{ConfigError, ErrorKind, Result};
pub use format::ConfigFormat;
pub use protocol::GitProtocol;
