//! One-time rewrite of legacy configuration files.
//!
//! A legacy file is rewritten in place by indenting every line under a new
//! `hosts:` key. The rewrite is textual so comments and formatting survive.
//! The original file is first renamed to `<path>.bak`.
//!
//! The rename and the rewrite are two separate steps. A crash between them
//! leaves only the backup behind.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::document::Document;
use crate::error::{ConfigError, Result};
use crate::format::{ConfigFormat, HOSTS_KEY, classify};

/// Suffix appended to the original path for the backup copy.
pub const BACKUP_SUFFIX: &str = ".bak";

const DOCUMENT_START: &str = "---";

const DIRECTIVE_PREFIX: char = '%';

/// What [`migrate_config`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The document already had the modern layout; nothing was touched.
    Skipped,
    /// The file was rewritten. It must be read again from disk.
    Migrated {
        /// Where the original content was saved.
        backup: PathBuf,
    },
}

impl MigrationOutcome {
    /// Returns whether the file on disk was rewritten.
    #[must_use]
    pub fn migrated(&self) -> bool {
        matches!(self, Self::Migrated { .. })
    }
}

/// Returns the backup path for a configuration file.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use gh_config::migration::backup_path;
///
/// assert_eq!(
///     backup_path(Path::new("/home/monalisa/.config/gh/config.yml")),
///     PathBuf::from("/home/monalisa/.config/gh/config.yml.bak"),
/// );
/// ```
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut backup = path.as_os_str().to_owned();
    backup.push(BACKUP_SUFFIX);
    PathBuf::from(backup)
}

/// Nests legacy file content under a top-level `hosts:` key.
///
/// Every line is indented by two spaces. Blank lines stay blank. Leading
/// comments, `%` directives, and the `---` document marker stay above the
/// new key.
///
/// # Examples
///
/// ```
/// use gh_config::migration::nest_under_hosts;
///
/// let nested = nest_under_hosts("github.com:\n- user: monalisa\n");
/// assert_eq!(nested, "hosts:\n  github.com:\n  - user: monalisa\n");
/// ```
#[must_use]
pub fn nest_under_hosts(content: &str) -> String {
    let mut lines = content.lines().peekable();
    let mut nested = String::with_capacity(content.len() * 2 + HOSTS_KEY.len() + 2);

    while let Some(line) = lines.next_if(|l| is_prelude(l)) {
        nested.push_str(line);
        nested.push('\n');
    }
    if lines.next_if(|l| l.trim_end() == DOCUMENT_START).is_some() {
        nested.push_str(DOCUMENT_START);
        nested.push('\n');
    }

    nested.push_str(HOSTS_KEY);
    nested.push_str(":\n");
    for line in lines {
        if !line.trim().is_empty() {
            nested.push_str("  ");
            nested.push_str(line);
        }
        nested.push('\n');
    }
    nested
}

/// Migrates a legacy configuration file to the modern layout.
///
/// `data` and `document` are the file's current raw bytes and parsed form.
/// Documents that already have a `hosts` key are left alone, so running
/// this twice never rewrites a file twice.
///
/// # Errors
///
/// Returns [`ConfigError::Migration`] if the nested content would not
/// parse or the backup rename fails (the original file is then left
/// untouched), if the file cannot be reopened for writing, or if the new
/// content cannot be written in full.
#[instrument(skip(data, document))]
pub fn migrate_config(path: &Path, data: &[u8], document: &Document) -> Result<MigrationOutcome> {
    if classify(document.root()) == ConfigFormat::Modern {
        debug!("config already has the modern layout");
        return Ok(MigrationOutcome::Skipped);
    }

    info!("migrating config from old to new format");

    let nested = nest_under_hosts(&String::from_utf8_lossy(data));
    if let Err(e) = Document::parse(nested.as_bytes()) {
        return Err(ConfigError::Migration {
            reason: "produce a readable migrated config",
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        });
    }
    let backup = backup_path(path);

    std::fs::rename(path, &backup).map_err(|source| ConfigError::Migration {
        reason: "back up existing config",
        source,
    })?;
    debug!(?backup, "backed up legacy config");

    let mut file = open_for_rewrite(path).map_err(|source| ConfigError::Migration {
        reason: "open new config file for writing",
        source,
    })?;
    write_fully(&mut file, nested.as_bytes()).map_err(|source| ConfigError::Migration {
        reason: "write migrated config",
        source,
    })?;

    Ok(MigrationOutcome::Migrated { backup })
}

fn open_for_rewrite(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

/// Lines that may precede the document body at column zero.
fn is_prelude(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#') || line.starts_with(DIRECTIVE_PREFIX)
}

/// Writes `buf` in a single call and treats a partial write as an error.
fn write_fully(file: &mut impl Write, buf: &[u8]) -> io::Result<()> {
    let written = file.write(buf)?;
    if written < buf.len() {
        return Err(io::Error::new(
            io::ErrorKind::WriteZero,
            format!("short write: {written} of {} bytes", buf.len()),
        ));
    }
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    const LEGACY: &str = "\
github.com:
- user: monalisa
  oauth_token: OTOKEN
";

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.yml");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn migrate_file(path: &Path) -> Result<MigrationOutcome> {
        let data = std::fs::read(path).unwrap();
        let document = Document::parse(&data).unwrap();
        migrate_config(path, &data, &document)
    }

    #[test]
    fn nests_every_line() {
        assert_eq!(
            nest_under_hosts(LEGACY),
            "hosts:\n  github.com:\n  - user: monalisa\n    oauth_token: OTOKEN\n"
        );
    }

    #[test]
    fn keeps_document_marker_and_blank_lines() {
        let nested = nest_under_hosts("---\n# comment\n\nexample.com:\n- user: m\n");
        assert_eq!(
            nested,
            "---\nhosts:\n  # comment\n\n  example.com:\n  - user: m\n"
        );
    }

    #[test]
    fn keeps_directives_above_hosts() {
        let nested = nest_under_hosts("%YAML 1.1\n---\ngithub.com:\n- user: m\n");
        assert_eq!(nested, "%YAML 1.1\n---\nhosts:\n  github.com:\n  - user: m\n");

        let document = Document::parse(nested.as_bytes()).unwrap();
        assert_eq!(classify(document.root()), ConfigFormat::Modern);
    }

    #[test]
    fn migrates_file_with_directive() {
        let dir = TempDir::new().unwrap();
        let content = "%YAML 1.1\n---\ngithub.com:\n- user: monalisa\n  oauth_token: OTOKEN\n";
        let path = write_config(&dir, content);

        assert!(migrate_file(&path).unwrap().migrated());
        let document = Document::parse(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(classify(document.root()), ConfigFormat::Modern);
        assert_eq!(std::fs::read_to_string(backup_path(&path)).unwrap(), content);
    }

    #[test]
    fn keeps_comment_before_directive_unindented() {
        let nested = nest_under_hosts("# hand written\n%YAML 1.1\n---\ngithub.com:\n- user: m\n");
        assert_eq!(
            nested,
            "# hand written\n%YAML 1.1\n---\nhosts:\n  github.com:\n  - user: m\n"
        );
        Document::parse(nested.as_bytes()).unwrap();
    }

    #[test]
    fn unreadable_result_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        // `...` only ends a document at column zero.
        let content = "github.com:\n- user: monalisa\n...\n";
        let path = write_config(&dir, content);

        let err = migrate_file(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Migration);
        assert!(err.to_string().starts_with("failed to produce a readable migrated config"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn migrates_legacy_file_with_backup() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, LEGACY);

        let outcome = migrate_file(&path).unwrap();
        let backup = backup_path(&path);
        assert_eq!(outcome, MigrationOutcome::Migrated { backup: backup.clone() });

        assert_eq!(std::fs::read_to_string(&backup).unwrap(), LEGACY);
        let rewritten = std::fs::read(&path).unwrap();
        let document = Document::parse(&rewritten).unwrap();
        assert_eq!(classify(document.root()), ConfigFormat::Modern);
    }

    #[test]
    fn second_run_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, LEGACY);

        assert!(migrate_file(&path).unwrap().migrated());
        let migrated = std::fs::read(&path).unwrap();
        let backup = std::fs::read(backup_path(&path)).unwrap();

        assert_eq!(migrate_file(&path).unwrap(), MigrationOutcome::Skipped);
        assert_eq!(std::fs::read(&path).unwrap(), migrated);
        assert_eq!(std::fs::read(backup_path(&path)).unwrap(), backup);
    }

    #[test]
    fn modern_file_is_untouched() {
        let dir = TempDir::new().unwrap();
        let content = "hosts:\n  github.com:\n  - user: monalisa\n";
        let path = write_config(&dir, content);

        assert_eq!(migrate_file(&path).unwrap(), MigrationOutcome::Skipped);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn failed_backup_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.yml");
        let document = Document::parse(LEGACY.as_bytes()).unwrap();

        let err = migrate_config(&path, LEGACY.as_bytes(), &document).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Migration);
        assert!(err.to_string().starts_with("failed to back up existing config"));
        assert!(!path.exists());
    }

    #[test]
    fn short_write_is_an_error() {
        struct OneByte;
        impl Write for OneByte {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                Ok(buf.len().min(1))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let err = write_fully(&mut OneByte, b"hosts:\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
    }

    #[cfg(unix)]
    #[test]
    fn rewritten_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, LEGACY);
        migrate_file(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
