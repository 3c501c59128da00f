//! The configuration facade and its loader.
//!
//! [`Config`] is the one contract the rest of the application sees. It has
//! two implementations, picked once when the file is loaded:
//!
//! - [`ModernConfig`] for documents with a `hosts` block and optional
//!   `editor` / `git_protocol` settings
//! - [`LegacyConfig`] for the older layout with hosts at the top level
//!
//! Resolved values are memoized per instance. The first successful lookup
//! wins; later changes to the underlying document do not invalidate it.

use std::cell::OnceCell;
use std::fmt;
use std::path::Path;

use tracing::{debug, instrument, warn};

use crate::auth::{DEFAULT_HOSTNAME, HostConfig, resolve_hosts};
use crate::document::{Document, Mapping, Node};
use crate::error::{ConfigError, Result};
use crate::format::{ConfigFormat, HOSTS_KEY, classify};
use crate::migration::migrate_config;
use crate::persistence::{FsReader, ReadConfig, default_config_path, read_config};
use crate::protocol::GitProtocol;

/// Top-level key holding the editor path.
pub const EDITOR_KEY: &str = "editor";

/// Top-level key holding the git protocol.
pub const GIT_PROTOCOL_KEY: &str = "git_protocol";

/// Read access to the user's configuration, whatever its layout.
pub trait Config: fmt::Debug {
    /// The layout this configuration was loaded from.
    fn format(&self) -> ConfigFormat;

    /// All configured hosts, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingHosts`] when the document has no hosts
    /// block, or [`ConfigError::Malformed`] when it has the wrong shape.
    fn hosts(&self) -> Result<&[HostConfig]>;

    /// The first host entry named `hostname`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HostNotFound`] if no entry matches, or any
    /// error from [`Config::hosts`].
    fn config_for_host(&self, hostname: &str) -> Result<&HostConfig> {
        self.hosts()?
            .iter()
            .find(|hc| hc.host() == hostname)
            .ok_or_else(|| ConfigError::HostNotFound {
                hostname: hostname.to_string(),
            })
    }

    /// The entry for [`DEFAULT_HOSTNAME`].
    ///
    /// # Errors
    ///
    /// Same as [`Config::config_for_host`].
    fn default_host_config(&self) -> Result<&HostConfig> {
        self.config_for_host(DEFAULT_HOSTNAME)
    }

    /// The configured editor. `None` means the environment decides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEditor`] if the value is not an
    /// absolute path.
    fn editor(&self) -> Result<Option<&str>>;

    /// The git protocol, defaulting to [`GitProtocol::Https`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidGitProtocol`] if a value is set but is
    /// neither `https` nor `ssh`.
    fn git_protocol(&self) -> Result<GitProtocol>;

    /// The raw value of a top-level setting, if set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Malformed`] if the key holds a list or map.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Sets a top-level setting in memory. Nothing is written to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot hold a single value, or if the
    /// configuration must be migrated first.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Per-instance memoized values. An empty cell means "not resolved yet".
#[derive(Debug, Default)]
struct Resolved {
    hosts: OnceCell<Vec<HostConfig>>,
    editor: OnceCell<Option<String>>,
    git_protocol: OnceCell<GitProtocol>,
}

/// Returns the cached value, or computes and caches it. Failures are not
/// cached, so the next call retries.
fn memoize<T>(cell: &OnceCell<T>, init: impl FnOnce() -> Result<T>) -> Result<&T> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = init()?;
    Ok(cell.get_or_init(|| value))
}

fn scalar_setting(root: &Mapping, key: &str) -> Result<Option<String>> {
    match root.get(key) {
        None | Some(Node::Null) => Ok(None),
        Some(Node::Scalar(value)) => Ok(Some(value.clone())),
        Some(other) => Err(ConfigError::malformed(format!(
            "{key} is a {}, not a single value",
            other.kind_name()
        ))),
    }
}

/// Configuration in the modern layout.
///
/// # Examples
///
/// ```
/// use gh_config::{Config, ModernConfig, GitProtocol};
/// use gh_config::document::Document;
///
/// # fn main() -> gh_config::Result<()> {
/// let doc = Document::parse(b"hosts:\n  github.com:\n  - user: monalisa\n    oauth_token: OTOKEN\ngit_protocol: ssh\n")?;
/// let config = ModernConfig::new(doc);
///
/// assert_eq!(config.default_host_config()?.auths()[0].user(), "monalisa");
/// assert_eq!(config.git_protocol()?, GitProtocol::Ssh);
/// assert_eq!(config.editor()?, None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ModernConfig {
    document: Document,
    resolved: Resolved,
}

impl ModernConfig {
    /// Wraps a document in the modern layout.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            resolved: Resolved::default(),
        }
    }

    /// The underlying document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl Config for ModernConfig {
    fn format(&self) -> ConfigFormat {
        ConfigFormat::Modern
    }

    fn hosts(&self) -> Result<&[HostConfig]> {
        memoize(&self.resolved.hosts, || {
            match self.document.root().get(HOSTS_KEY) {
                None => Err(ConfigError::MissingHosts),
                Some(Node::Null) => Ok(Vec::new()),
                Some(Node::Mapping(hosts)) => resolve_hosts(hosts),
                Some(other) => Err(ConfigError::malformed(format!(
                    "hosts should be a map, found a {}",
                    other.kind_name()
                ))),
            }
        })
        .map(Vec::as_slice)
    }

    fn editor(&self) -> Result<Option<&str>> {
        memoize(&self.resolved.editor, || {
            let Some(editor) = scalar_setting(self.document.root(), EDITOR_KEY)? else {
                return Ok(None);
            };
            if !Path::new(&editor).is_absolute() {
                return Err(ConfigError::InvalidEditor(editor));
            }
            Ok(Some(editor))
        })
        .map(Option::as_deref)
    }

    fn git_protocol(&self) -> Result<GitProtocol> {
        memoize(&self.resolved.git_protocol, || {
            match scalar_setting(self.document.root(), GIT_PROTOCOL_KEY) {
                Ok(Some(value)) => value.parse(),
                Ok(None) => {
                    debug!(default = %GitProtocol::default(), "no git_protocol configured");
                    Ok(GitProtocol::default())
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        "malformed git_protocol config entry; falling back to default"
                    );
                    Ok(GitProtocol::default())
                }
            }
        })
        .copied()
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        scalar_setting(self.document.root(), key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if key == HOSTS_KEY {
            return Err(ConfigError::ReadOnlyKey(key.to_string()));
        }
        self.document
            .root_mut()
            .set(key, Node::Scalar(value.to_string()));
        Ok(())
    }
}

/// Configuration in the legacy layout.
///
/// The whole top-level mapping is the hosts block. Legacy files never
/// carried other settings, so the editor is always unset and the protocol
/// is always the default.
#[derive(Debug)]
pub struct LegacyConfig {
    document: Document,
    resolved: Resolved,
}

impl LegacyConfig {
    /// Wraps a document in the legacy layout.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            resolved: Resolved::default(),
        }
    }

    /// The underlying document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl Config for LegacyConfig {
    fn format(&self) -> ConfigFormat {
        ConfigFormat::Legacy
    }

    fn hosts(&self) -> Result<&[HostConfig]> {
        memoize(&self.resolved.hosts, || resolve_hosts(self.document.root()))
            .map(Vec::as_slice)
    }

    fn editor(&self) -> Result<Option<&str>> {
        Ok(None)
    }

    fn git_protocol(&self) -> Result<GitProtocol> {
        Ok(GitProtocol::default())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        match key {
            EDITOR_KEY | GIT_PROTOCOL_KEY => Ok(None),
            _ => scalar_setting(self.document.root(), key),
        }
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
        Err(ConfigError::MigrationRequired)
    }
}

/// Wraps a parsed document in the facade matching its layout.
#[must_use]
pub fn into_config(document: Document) -> Box<dyn Config> {
    match classify(document.root()) {
        ConfigFormat::Modern => Box::new(ModernConfig::new(document)),
        ConfigFormat::Legacy => Box::new(LegacyConfig::new(document)),
    }
}

/// Parses configuration from memory. Nothing is read or written on disk.
///
/// # Errors
///
/// Returns [`ConfigError::Malformed`] if the bytes are not a YAML mapping.
///
/// # Examples
///
/// ```
/// use gh_config::{Config, parse_config};
/// use gh_config::format::ConfigFormat;
///
/// let config = parse_config(b"github.com:\n- user: monalisa\n  oauth_token: OTOKEN\n").unwrap();
/// assert_eq!(config.format(), ConfigFormat::Legacy);
/// assert_eq!(config.default_host_config().unwrap().auths()[0].token(), "OTOKEN");
/// ```
pub fn parse_config(data: &[u8]) -> Result<Box<dyn Config>> {
    Ok(into_config(Document::parse(data)?))
}

/// Loads configuration files through an injected read capability.
///
/// # Examples
///
/// ```no_run
/// use gh_config::{Config, ConfigLoader};
///
/// # fn main() -> gh_config::Result<()> {
/// let config = ConfigLoader::new().load_default()?;
/// println!("git protocol: {}", config.git_protocol()?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader<R = FsReader> {
    reader: R,
}

impl ConfigLoader<FsReader> {
    /// Creates a loader that reads from the filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: ReadConfig> ConfigLoader<R> {
    /// Creates a loader that reads through `reader`.
    #[must_use]
    pub fn with_reader(reader: R) -> Self {
        Self { reader }
    }

    /// Loads the file at `path` without rewriting it.
    ///
    /// Legacy files are served as-is through [`LegacyConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file does not exist, or any
    /// read or parse error.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Box<dyn Config>> {
        let (_, document) = read_config(&self.reader, path.as_ref())?;
        Ok(into_config(document))
    }

    /// Loads the file at `path` for modification, migrating it first if it
    /// has the legacy layout.
    ///
    /// The migration itself always writes to the local filesystem; the file
    /// is then read again through this loader's reader.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Migration`] if the rewrite fails, or any read
    /// or parse error.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn load_for_write(&self, path: impl AsRef<Path>) -> Result<ModernConfig> {
        let path = path.as_ref();
        let (data, document) = read_config(&self.reader, path)?;

        if !migrate_config(path, &data, &document)?.migrated() {
            return Ok(ModernConfig::new(document));
        }

        let (_, document) = read_config(&self.reader, path)?;
        if classify(document.root()) != ConfigFormat::Modern {
            return Err(ConfigError::malformed(
                "config still has the legacy layout after migration",
            ));
        }
        Ok(ModernConfig::new(document))
    }

    /// Loads the file at the default location without rewriting it.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigLoader::load`], plus an error if the default
    /// location cannot be determined.
    pub fn load_default(&self) -> Result<Box<dyn Config>> {
        self.load(default_config_path()?)
    }

    /// Loads the file at the default location for modification.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigLoader::load_for_write`], plus an error if the
    /// default location cannot be determined.
    pub fn load_default_for_write(&self) -> Result<ModernConfig> {
        self.load_for_write(default_config_path()?)
    }
}
