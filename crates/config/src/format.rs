//! Detection of the on-disk layout.
//!
//! Two layouts exist. The legacy one keeps host entries at the top level:
//!
//! ```yaml
//! github.com:
//!   - user: monalisa
//!     oauth_token: OTOKEN
//! ```
//!
//! The modern one nests them under `hosts`, which leaves room for other
//! top-level settings:
//!
//! ```yaml
//! hosts:
//!   github.com:
//!     - user: monalisa
//!       oauth_token: OTOKEN
//! editor: /usr/bin/vim
//! git_protocol: ssh
//! ```

use crate::document::Mapping;

/// Top-level key that marks the modern layout.
pub const HOSTS_KEY: &str = "hosts";

/// The layout of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// Host entries at the top level.
    Legacy,
    /// Host entries under `hosts`, plus optional settings.
    Modern,
}

/// Classifies a document by its top-level keys.
///
/// # Examples
///
/// ```
/// use gh_config::document::Document;
/// use gh_config::format::{ConfigFormat, classify};
///
/// let legacy = Document::parse(b"github.com:\n  - user: monalisa\n").unwrap();
/// assert_eq!(classify(legacy.root()), ConfigFormat::Legacy);
///
/// let modern = Document::parse(b"hosts:\n  github.com:\n").unwrap();
/// assert_eq!(classify(modern.root()), ConfigFormat::Modern);
/// ```
#[must_use]
pub fn classify(root: &Mapping) -> ConfigFormat {
    if root.contains_key(HOSTS_KEY) {
        ConfigFormat::Modern
    } else {
        ConfigFormat::Legacy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Node;
    use proptest::prelude::*;

    #[test]
    fn hosts_anywhere_at_top_level_is_modern() {
        let root: Mapping = [
            ("editor", Node::Scalar("/usr/bin/vim".into())),
            ("hosts", Node::Null),
        ]
        .into_iter()
        .collect();
        assert_eq!(classify(&root), ConfigFormat::Modern);
    }

    #[test]
    fn nested_hosts_key_is_still_legacy() {
        let inner: Mapping = [("hosts", Node::Null)].into_iter().collect();
        let root: Mapping = [("github.com", Node::Mapping(inner))].into_iter().collect();
        assert_eq!(classify(&root), ConfigFormat::Legacy);
    }

    #[test]
    fn empty_mapping_is_legacy() {
        assert_eq!(classify(&Mapping::new()), ConfigFormat::Legacy);
    }

    proptest! {
        #[test]
        fn modern_iff_hosts_key_present(keys in proptest::collection::vec("[a-z_]{1,10}", 0..8)) {
            let root: Mapping = keys.iter().map(|k| (k.clone(), Node::Null)).collect();
            let expected = if keys.iter().any(|k| k == HOSTS_KEY) {
                ConfigFormat::Modern
            } else {
                ConfigFormat::Legacy
            };
            prop_assert_eq!(classify(&root), expected);
        }
    }
}
