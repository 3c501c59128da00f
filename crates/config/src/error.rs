//! Error types for configuration operations.
//!
//! This module defines the error types that can occur while loading,
//! migrating, and querying the configuration document. Every variant belongs
//! to one of the coarse [`ErrorKind`]s so callers can react to the category
//! (for instance, start a first-run setup when the file is missing) without
//! matching on each variant.

use std::path::PathBuf;

/// Coarse classification of a [`ConfigError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A file, key, or host entry is absent.
    NotFound,
    /// The document does not have the expected shape.
    Malformed,
    /// A value is present but not acceptable.
    Validation,
    /// Rewriting a legacy document failed.
    Migration,
    /// A generic read or write failure.
    Io,
}

/// Errors that can occur during configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("config file not found at {path}")]
    NotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// The document has no `hosts` block.
    #[error("could not find hosts config")]
    MissingHosts,

    /// No host entry matches the requested name.
    #[error("could not find config entry for {hostname:?}")]
    HostNotFound {
        /// The host that was requested.
        hostname: String,
    },

    /// The document is not a mapping at the top level, fails to parse, or
    /// has an entry of the wrong shape.
    #[error("malformed config: {reason}")]
    Malformed {
        /// What was wrong with the document.
        reason: String,
    },

    /// The configured editor is not an absolute path.
    #[error("editor should be an absolute path; got: {0}")]
    InvalidEditor(String),

    /// The configured git protocol is not one of the supported values.
    #[error("got unexpected value for git_protocol: {0}")]
    InvalidGitProtocol(String),

    /// The key cannot be replaced with a single value.
    #[error("{0} cannot be set to a single value")]
    ReadOnlyKey(String),

    /// A write was attempted against a legacy document.
    #[error("config is in the legacy layout; migrate it before changing settings")]
    MigrationRequired,

    /// Migrating a legacy document failed.
    #[error("failed to {reason}: {source}")]
    Migration {
        /// The migration step that failed.
        reason: &'static str,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a configuration file.
    #[error("failed to read config file at {path}: {source}")]
    ReadFile {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to determine home directory.
    #[error("could not determine home directory")]
    NoHomeDirectory,
}

impl ConfigError {
    /// Builds a [`ConfigError::Malformed`] from anything printable.
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// Returns the category this error belongs to.
    ///
    /// # Examples
    ///
    /// ```
    /// use gh_config::{ConfigError, ErrorKind};
    ///
    /// let err = ConfigError::MissingHosts;
    /// assert_eq!(err.kind(), ErrorKind::NotFound);
    /// ```
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } | Self::MissingHosts | Self::HostNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::Malformed { .. } => ErrorKind::Malformed,
            Self::InvalidEditor(_) | Self::InvalidGitProtocol(_) | Self::ReadOnlyKey(_) => {
                ErrorKind::Validation
            }
            Self::Migration { .. } | Self::MigrationRequired => ErrorKind::Migration,
            Self::ReadFile { .. } | Self::NoHomeDirectory => ErrorKind::Io,
        }
    }

    /// Returns whether this error means something was absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::malformed(err.to_string())
    }
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
