//! Git transport protocol selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The protocol used for git operations against a host.
///
/// # Examples
///
/// ```
/// use gh_config::GitProtocol;
///
/// assert_eq!(GitProtocol::default(), GitProtocol::Https);
/// assert_eq!("ssh".parse::<GitProtocol>().unwrap(), GitProtocol::Ssh);
/// assert!("ftp".parse::<GitProtocol>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitProtocol {
    /// `https://` remotes.
    #[default]
    Https,
    /// `ssh://` or scp-style remotes.
    Ssh,
}

impl GitProtocol {
    /// The value as written in the configuration file.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Https => "https",
            Self::Ssh => "ssh",
        }
    }
}

impl fmt::Display for GitProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GitProtocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "https" => Ok(Self::Https),
            "ssh" => Ok(Self::Ssh),
            other => Err(ConfigError::InvalidGitProtocol(other.to_string())),
        }
    }
}
