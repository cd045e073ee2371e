//! Extension request paths.

use core::fmt;

use crate::error::PathError;

/// A parsed `namespace/method` extension path.
///
/// The namespace is dotted (`tp.gremlin`), the method is a single token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtensionPath {
    namespace: String,
    method: String,
}

impl ExtensionPath {
    /// Parses a raw extension path.
    ///
    /// Leading and trailing `/` are ignored and the split happens at the
    /// last remaining `/`.
    ///
    /// ```
    /// use graphgate_extensions::ExtensionPath;
    ///
    /// let path = ExtensionPath::parse("/tp.gremlin/exec").unwrap();
    /// assert_eq!(path.namespace(), "tp.gremlin");
    /// assert_eq!(path.method(), "exec");
    ///
    /// assert!(ExtensionPath::parse("tp.gremlin").is_err());
    /// assert!(ExtensionPath::parse("tp/tp").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let trimmed = raw.trim_matches('/');
        let Some((namespace, method)) = trimmed.rsplit_once('/') else {
            return Err(if trimmed.is_empty() {
                PathError::EmptySegment(raw.to_owned())
            } else {
                PathError::MissingSeparator(raw.to_owned())
            });
        };

        if namespace.is_empty() || method.is_empty() {
            return Err(PathError::EmptySegment(raw.to_owned()));
        }
        if namespace.contains('/') {
            return Err(PathError::NestedNamespace(namespace.to_owned()));
        }
        if namespace.split('.').any(str::is_empty) {
            return Err(PathError::EmptyNamespacePart(namespace.to_owned()));
        }
        if namespace == method {
            return Err(PathError::SameSegment(raw.to_owned()));
        }

        Ok(Self {
            namespace: namespace.to_owned(),
            method: method.to_owned(),
        })
    }

    /// Returns the dotted namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the method name.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }
}

impl fmt::Display for ExtensionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dotted_namespace() {
        let path = ExtensionPath::parse("tp.sparql.v2/query").unwrap();
        assert_eq!(path.namespace(), "tp.sparql.v2");
        assert_eq!(path.method(), "query");
        assert_eq!(path.to_string(), "tp.sparql.v2/query");
    }

    #[test]
    fn ignores_surrounding_slashes() {
        let path = ExtensionPath::parse("//tp/ping/").unwrap();
        assert_eq!(path.namespace(), "tp");
        assert_eq!(path.method(), "ping");
    }

    #[test]
    fn rejects_malformed_paths() {
        assert_eq!(ExtensionPath::parse(""), Err(PathError::EmptySegment("".into())));
        assert_eq!(ExtensionPath::parse("///"), Err(PathError::EmptySegment("///".into())));
        assert_eq!(
            ExtensionPath::parse("tp.gremlin"),
            Err(PathError::MissingSeparator("tp.gremlin".into()))
        );
        assert_eq!(
            ExtensionPath::parse("a/b/c"),
            Err(PathError::NestedNamespace("a/b".into()))
        );
        assert_eq!(
            ExtensionPath::parse("tp..x/run"),
            Err(PathError::EmptyNamespacePart("tp..x".into()))
        );
        assert_eq!(
            ExtensionPath::parse(".tp/run"),
            Err(PathError::EmptyNamespacePart(".tp".into()))
        );
        assert_eq!(ExtensionPath::parse("run/run"), Err(PathError::SameSegment("run/run".into())));
    }
}
