//! Host credential records and their resolution from the `hosts` block.
//!
//! The `hosts` block maps a host name to a list of credential entries:
//!
//! ```yaml
//! github.com:
//!   - user: monalisa
//!     oauth_token: OTOKEN
//!   - user: hubot
//!     oauth_token: HTOKEN
//! ```
//!
//! Hosts and their entries are kept in document order. The first entry of
//! a host is the active one.

use secrecy::{ExposeSecret, SecretString};

use crate::document::{Mapping, Node};
use crate::error::{ConfigError, Result};

/// The host used when none is specified.
pub const DEFAULT_HOSTNAME: &str = "github.com";

/// A single user/token credential pair.
///
/// The token is held as a [`SecretString`] so it never shows up in `Debug`
/// output or logs.
///
/// # Examples
///
/// ```
/// use gh_config::AuthConfig;
///
/// let auth = AuthConfig::new("monalisa", "OTOKEN");
/// assert_eq!(auth.user(), "monalisa");
/// assert_eq!(auth.token(), "OTOKEN");
/// assert!(!format!("{auth:?}").contains("OTOKEN"));
/// ```
#[derive(Debug)]
pub struct AuthConfig {
    user: String,
    token: SecretString,
}

impl AuthConfig {
    /// Creates a credential entry.
    #[must_use]
    pub fn new(user: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            token: SecretString::from(token.into()),
        }
    }

    /// The user name. Empty when the entry has no `user` key.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// The OAuth token. Empty when the entry has no `oauth_token` key.
    #[must_use]
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

impl PartialEq for AuthConfig {
    fn eq(&self, other: &Self) -> bool {
        self.user == other.user && self.token() == other.token()
    }
}

impl Eq for AuthConfig {}

/// The credentials configured for one host.
#[derive(Debug, PartialEq, Eq)]
pub struct HostConfig {
    host: String,
    auths: Vec<AuthConfig>,
}

impl HostConfig {
    /// Creates a host entry.
    #[must_use]
    pub fn new(host: impl Into<String>, auths: Vec<AuthConfig>) -> Self {
        Self {
            host: host.into(),
            auths,
        }
    }

    /// The host name, e.g. `github.com`.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// All credential entries, in document order.
    #[must_use]
    pub fn auths(&self) -> &[AuthConfig] {
        &self.auths
    }

    /// The active credential entry, i.e. the first one.
    #[must_use]
    pub fn default_auth(&self) -> Option<&AuthConfig> {
        self.auths.first()
    }
}

/// Resolves host records from a `hosts` mapping.
///
/// Hosts with an empty name or a null value (a placeholder with no
/// credentials yet) are skipped. Unknown keys inside a credential entry are
/// ignored. Duplicate host names are all returned; lookups take the first.
///
/// # Errors
///
/// Returns [`ConfigError::Malformed`] if a host's value is not a list, or
/// if an entry of that list is not a mapping of plain values.
///
/// # Examples
///
/// ```
/// use gh_config::auth::resolve_hosts;
/// use gh_config::document::Document;
///
/// let doc = Document::parse(b"github.com:\n  - user: monalisa\n    oauth_token: OTOKEN\n").unwrap();
/// let hosts = resolve_hosts(doc.root()).unwrap();
/// assert_eq!(hosts[0].host(), "github.com");
/// assert_eq!(hosts[0].auths()[0].user(), "monalisa");
/// ```
pub fn resolve_hosts(hosts: &Mapping) -> Result<Vec<HostConfig>> {
    let mut resolved = Vec::with_capacity(hosts.len());

    for (host, value) in hosts.iter() {
        if host.is_empty() || value.is_null() {
            continue;
        }

        let Node::Sequence(entries) = value else {
            return Err(ConfigError::malformed(format!(
                "expected a list of credentials for host {host:?}, found a {}",
                value.kind_name()
            )));
        };

        let auths = entries
            .iter()
            .map(|entry| resolve_auth(host, entry))
            .collect::<Result<Vec<_>>>()?;

        resolved.push(HostConfig::new(host, auths));
    }

    Ok(resolved)
}

fn resolve_auth(host: &str, entry: &Node) -> Result<AuthConfig> {
    let Some(fields) = entry.as_mapping() else {
        return Err(ConfigError::malformed(format!(
            "expected a credential map for host {host:?}, found a {}",
            entry.kind_name()
        )));
    };

    let mut user = String::new();
    let mut token = String::new();
    for (key, value) in fields.iter() {
        let target = match key {
            "user" => &mut user,
            "oauth_token" => &mut token,
            _ => continue,
        };
        match value {
            Node::Scalar(text) => text.clone_into(target),
            Node::Null => target.clear(),
            other => {
                return Err(ConfigError::malformed(format!(
                    "{key} for host {host:?} should be a single value, found a {}",
                    other.kind_name()
                )));
            }
        }
    }

    Ok(AuthConfig {
        user,
        token: SecretString::from(token),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    fn hosts_of(yaml: &str) -> Result<Vec<HostConfig>> {
        let doc = Document::parse(yaml.as_bytes()).unwrap();
        resolve_hosts(doc.root())
    }

    #[test]
    fn resolves_multiple_auths_in_order() {
        let hosts = hosts_of(
            "github.com:\n  - user: monalisa\n    oauth_token: OTOKEN\n  - user: wronguser\n    oauth_token: NOTTHIS\n",
        )
        .unwrap();

        assert_eq!(hosts.len(), 1);
        let auths = hosts[0].auths();
        assert_eq!(auths.len(), 2);
        assert_eq!(auths[0].user(), "monalisa");
        assert_eq!(auths[0].token(), "OTOKEN");
        assert_eq!(auths[1].user(), "wronguser");
        assert_eq!(hosts[0].default_auth(), Some(&auths[0]));
    }

    #[test]
    fn ignores_unknown_keys() {
        let hosts =
            hosts_of("github.com:\n  - user: monalisa\n    scopes: repo\n    oauth_token: T\n")
                .unwrap();
        assert_eq!(hosts[0].auths()[0], AuthConfig::new("monalisa", "T"));
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let hosts = hosts_of("github.com:\n  - user: monalisa\n").unwrap();
        assert_eq!(hosts[0].auths()[0].token(), "");
    }

    #[test]
    fn skips_placeholder_hosts() {
        let hosts = hosts_of("enterprise.internal:\ngithub.com:\n  - user: m\n    oauth_token: t\n")
            .unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].host(), "github.com");
    }

    #[test]
    fn keeps_duplicate_hosts() {
        let mapping: Mapping = [
            ("github.com", Node::Sequence(vec![])),
            ("github.com", Node::Sequence(vec![])),
        ]
        .into_iter()
        .collect();
        assert_eq!(resolve_hosts(&mapping).unwrap().len(), 2);
    }

    #[test]
    fn rejects_non_list_host_value() {
        let err = hosts_of("github.com: monalisa\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert!(err.to_string().contains("github.com"));
    }

    #[test]
    fn rejects_non_map_credential() {
        let err = hosts_of("github.com:\n  - monalisa\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn rejects_nested_user() {
        let err = hosts_of("github.com:\n  - user: [a, b]\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    proptest! {
        #[test]
        fn preserves_host_order(names in proptest::collection::btree_set("[a-z]{1,8}\\.com", 1..6)) {
            let names: Vec<String> = names.into_iter().collect();
            let mapping: Mapping = names
                .iter()
                .map(|name| {
                    let auth: Mapping = [
                        ("user", Node::Scalar(format!("user-{name}"))),
                        ("oauth_token", Node::Scalar(format!("token-{name}"))),
                    ]
                    .into_iter()
                    .collect();
                    (name.clone(), Node::Sequence(vec![Node::Mapping(auth)]))
                })
                .collect();

            let hosts = resolve_hosts(&mapping).unwrap();
            let resolved: Vec<&str> = hosts.iter().map(HostConfig::host).collect();
            prop_assert_eq!(resolved, names.iter().map(String::as_str).collect::<Vec<_>>());
            for host in &hosts {
                prop_assert_eq!(host.auths()[0].user(), format!("user-{}", host.host()));
            }
        }
    }
}
