//! Configuration file location and reading.
//!
//! # File Location
//!
//! The configuration lives in a single YAML file:
//!
//! 1. `$GH_CONFIG_DIR/config.yml` when `GH_CONFIG_DIR` is set
//! 2. `~/.config/gh/config.yml` otherwise
//!
//! # Reading
//!
//! Reads go through the [`ReadConfig`] capability handed to the loader, so
//! tests can serve bytes from memory. The file is read in full and closed
//! before anything is parsed.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::document::Document;
use crate::error::{ConfigError, Result};

/// Environment variable that overrides the configuration directory.
pub const CONFIG_DIR_ENV: &str = "GH_CONFIG_DIR";

/// Configuration file name inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "config.yml";

/// Capability to read a configuration file's raw bytes.
///
/// Implemented by [`FsReader`] for the real filesystem and by any closure
/// `Fn(&Path) -> io::Result<Vec<u8>>`.
///
/// # Examples
///
/// ```
/// use std::io;
/// use std::path::Path;
/// use gh_config::persistence::ReadConfig;
///
/// let in_memory = |_: &Path| -> io::Result<Vec<u8>> { Ok(b"hosts:\n".to_vec()) };
/// assert_eq!(in_memory.read(Path::new("ignored")).unwrap(), b"hosts:\n");
/// ```
pub trait ReadConfig {
    /// Reads the whole file at `path`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error; [`io::ErrorKind::NotFound`] means
    /// the file does not exist.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Reads configuration files from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl ReadConfig for FsReader {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

impl<F> ReadConfig for F
where
    F: Fn(&Path) -> io::Result<Vec<u8>>,
{
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self(path)
    }
}

/// Returns the configuration directory.
///
/// # Errors
///
/// Returns an error if `GH_CONFIG_DIR` is unset and the home directory
/// cannot be determined.
///
/// # Examples
///
/// ```no_run
/// use gh_config::persistence::config_dir;
///
/// let dir = config_dir().unwrap();
/// println!("Config dir: {}", dir.display());
/// ```
pub fn config_dir() -> Result<PathBuf> {
    resolve_config_dir(std::env::var_os(CONFIG_DIR_ENV), dirs::home_dir())
}

fn resolve_config_dir(env_override: Option<OsString>, home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = env_override.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    home.map(|h| h.join(".config").join("gh"))
        .ok_or(ConfigError::NoHomeDirectory)
}

/// Returns the default configuration file path.
///
/// # Errors
///
/// Returns an error if the configuration directory cannot be determined.
pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Reads and parses a configuration file.
///
/// Returns the raw bytes alongside the parsed document; the bytes are what
/// a migration rewrites.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] if the file does not exist,
/// [`ConfigError::ReadFile`] for other I/O failures, and
/// [`ConfigError::Malformed`] if the content is not a YAML mapping.
#[instrument(skip(reader))]
pub fn read_config(reader: &impl ReadConfig, path: &Path) -> Result<(Vec<u8>, Document)> {
    let data = reader.read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    debug!(bytes = data.len(), "read config file");

    let document = Document::parse(&data)?;
    Ok((data, document))
}
