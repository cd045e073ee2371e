//! The [`Extension`] trait for grouping methods under a namespace.

use crate::method::ExtensionMethod;

/// A namespace of related extension methods.
///
/// Register with [`ExtensionRegistry::register`](crate::ExtensionRegistry::register).
/// Methods of several extensions that share a namespace are merged into one
/// descriptor, as long as no two of them bind the same name at the same point.
pub trait Extension: Send + Sync + 'static {
    /// Returns the dotted namespace, for example `tp.gremlin`.
    fn namespace(&self) -> &str;

    /// Consumes the extension, returning its methods.
    fn methods(self) -> Vec<Box<dyn ExtensionMethod>>;
}
