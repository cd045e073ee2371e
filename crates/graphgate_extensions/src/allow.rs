//! Per-graph namespace allow-lists.

use serde::{Deserialize, Serialize};

/// Namespaces a graph permits extensions from.
///
/// Default-deny: an empty list allows nothing. Entries are matched as:
///
/// - `*` allows every namespace
/// - `tp.*` allows `tp` and every namespace under it (`tp.gremlin`, `tp.a.b`)
/// - anything else must equal the namespace exactly
///
/// ```
/// use graphgate_extensions::AllowList;
///
/// let allow = AllowList::new(["tp.*", "acme.audit"]);
/// assert!(allow.allows("tp.gremlin"));
/// assert!(allow.allows("acme.audit"));
/// assert!(!allow.allows("acme.audit.deep"));
/// assert!(!AllowList::default().allows("tp"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowList {
    entries: Vec<String>,
}

impl AllowList {
    /// Creates an allow-list from its entries.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates an allow-list that permits every namespace.
    #[must_use]
    pub fn allow_all() -> Self {
        Self::new(["*"])
    }

    /// Returns true if `namespace` may be invoked.
    #[must_use]
    pub fn allows(&self, namespace: &str) -> bool {
        self.entries.iter().any(|entry| entry_matches(entry, namespace))
    }

    /// Returns the raw entries.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Returns true if nothing is allowed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn entry_matches(entry: &str, namespace: &str) -> bool {
    if entry == "*" {
        return true;
    }
    match entry.strip_suffix(".*") {
        Some(prefix) => {
            namespace == prefix
                || namespace
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('.'))
        }
        None => entry == namespace,
    }
}
