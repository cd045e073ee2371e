//! The [`Resource`] trait and the [`Resources`] container.

use core::any::{Any, TypeId};
use hashbrown::HashMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Type-erased resource value.
type Erased = Box<dyn Any + Send + Sync>;

/// Shared state stored in a [`Resources`] container.
///
/// Every `Send + Sync + 'static` type is a resource.
pub trait Resource: Send + Sync + 'static {
    /// Returns the type name for debugging purposes.
    fn type_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

impl<T: Send + Sync + 'static> Resource for T {}

/// Marker trait for global, read-only resources.
///
/// Global resources live as long as the server and are shared by every
/// request. They are only reachable through shared references once the
/// server has finished building, so they are safe to read concurrently.
///
/// # Example
///
/// ```
/// use graphgate_system::resource::GlobalResource;
/// use graphgate_system::server::Server;
///
/// struct Banner(&'static str);
/// impl GlobalResource for Banner {}
///
/// let mut server = Server::new();
/// server.insert_global(Banner("graphgate"));
/// assert_eq!(server.get_global::<Banner>().unwrap().0, "graphgate");
/// ```
pub trait GlobalResource: Resource {}

/// Unique identifier for a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(TypeId);

impl ResourceId {
    /// Creates a `ResourceId` for the given type.
    #[must_use]
    pub fn of<T: Resource>() -> Self {
        Self(TypeId::of::<T>())
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.0
    }
}

/// Errors that can occur during resource operations.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// The requested resource type was not found in the container.
    #[error("resource not found: {0}")]
    NotFound(&'static str),

    /// The resource is currently borrowed in a conflicting way.
    #[error("resource already borrowed: {0}")]
    BorrowConflict(&'static str),
}

/// Container for storing resources by type.
///
/// Each entry sits behind its own `RwLock`, so many readers can hold the same
/// resource at once while a writer gets exclusive access. Accessors never
/// block: a conflicting borrow is reported as
/// [`ResourceError::BorrowConflict`].
///
/// # Example
///
/// ```
/// use graphgate_system::resource::Resources;
///
/// struct Hits(u64);
///
/// let mut resources = Resources::new();
/// resources.insert(Hits(0));
///
/// resources.get_mut::<Hits>().unwrap().0 += 1;
/// assert_eq!(resources.get::<Hits>().unwrap().0, 1);
/// ```
#[derive(Default)]
pub struct Resources {
    storage: HashMap<ResourceId, RwLock<Erased>>,
}

impl Resources {
    /// Creates a new empty resource container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: HashMap::new(),
        }
    }

    /// Inserts a resource, returning the previous value of the same type.
    pub fn insert<T: Resource>(&mut self, resource: T) -> Option<T> {
        self.storage
            .insert(ResourceId::of::<T>(), RwLock::new(Box::new(resource)))
            .and_then(|old| downcast_owned(old.into_inner()))
    }

    /// Returns `true` if a resource of type `T` exists.
    #[must_use]
    pub fn contains<T: Resource>(&self) -> bool {
        self.storage.contains_key(&ResourceId::of::<T>())
    }

    /// Borrows a resource immutably.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::NotFound`] if the resource type is not stored
    /// - [`ResourceError::BorrowConflict`] if the resource is mutably borrowed
    pub fn get<T: Resource>(&self) -> Result<ResourceRef<'_, T>, ResourceError> {
        let type_name = core::any::type_name::<T>();
        let guard = self
            .entry::<T>()?
            .try_read()
            .ok_or(ResourceError::BorrowConflict(type_name))?;

        Ok(ResourceRef {
            guard,
            _marker: core::marker::PhantomData,
        })
    }

    /// Borrows a resource mutably.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::NotFound`] if the resource type is not stored
    /// - [`ResourceError::BorrowConflict`] if the resource is borrowed at all
    pub fn get_mut<T: Resource>(&self) -> Result<ResourceRefMut<'_, T>, ResourceError> {
        let type_name = core::any::type_name::<T>();
        let guard = self
            .entry::<T>()?
            .try_write()
            .ok_or(ResourceError::BorrowConflict(type_name))?;

        Ok(ResourceRefMut {
            guard,
            _marker: core::marker::PhantomData,
        })
    }

    /// Removes a resource and returns it.
    pub fn remove<T: Resource>(&mut self) -> Option<T> {
        self.storage
            .remove(&ResourceId::of::<T>())
            .and_then(|entry| downcast_owned(entry.into_inner()))
    }

    /// Removes all resources.
    pub fn clear(&mut self) {
        self.storage.clear();
    }

    /// Returns the number of resources stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Returns `true` if no resources are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    fn entry<T: Resource>(&self) -> Result<&RwLock<Erased>, ResourceError> {
        self.storage
            .get(&ResourceId::of::<T>())
            .ok_or(ResourceError::NotFound(core::any::type_name::<T>()))
    }
}

fn downcast_owned<T: Resource>(erased: Erased) -> Option<T> {
    erased.downcast::<T>().ok().map(|boxed| *boxed)
}

/// RAII guard for immutable resource access.
pub struct ResourceRef<'a, T: Resource> {
    guard: RwLockReadGuard<'a, Erased>,
    _marker: core::marker::PhantomData<&'a T>,
}

impl<T: Resource> core::ops::Deref for ResourceRef<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // Entries are keyed by `ResourceId::of::<T>()`, so the box holds a `T`.
        self.guard
            .downcast_ref::<T>()
            .expect("resource type mismatch (this is a bug)")
    }
}

/// RAII guard for mutable resource access.
pub struct ResourceRefMut<'a, T: Resource> {
    guard: RwLockWriteGuard<'a, Erased>,
    _marker: core::marker::PhantomData<&'a mut T>,
}

impl<T: Resource> core::ops::Deref for ResourceRefMut<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.guard
            .downcast_ref::<T>()
            .expect("resource type mismatch (this is a bug)")
    }
}

impl<T: Resource> core::ops::DerefMut for ResourceRefMut<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.guard
            .downcast_mut::<T>()
            .expect("resource type mismatch (this is a bug)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct PageLimit(usize);

    #[derive(Debug, PartialEq)]
    struct GraphName(String);

    #[test]
    fn insert_returns_previous_value() {
        let mut resources = Resources::new();
        assert!(resources.insert(PageLimit(10)).is_none());
        assert_eq!(resources.insert(PageLimit(20)), Some(PageLimit(10)));
        assert_eq!(resources.get::<PageLimit>().unwrap().0, 20);
    }

    #[test]
    fn get_mut_modifies_in_place() {
        let mut resources = Resources::new();
        resources.insert(PageLimit(1));

        resources.get_mut::<PageLimit>().unwrap().0 += 4;

        assert_eq!(resources.get::<PageLimit>().unwrap().0, 5);
    }

    #[test]
    fn readers_share_but_writers_are_exclusive() {
        let mut resources = Resources::new();
        resources.insert(PageLimit(1));

        let first = resources.get::<PageLimit>().unwrap();
        let second = resources.get::<PageLimit>().unwrap();
        assert_eq!(first.0, second.0);
        assert!(matches!(
            resources.get_mut::<PageLimit>(),
            Err(ResourceError::BorrowConflict(_))
        ));

        drop(first);
        drop(second);
        let writer = resources.get_mut::<PageLimit>().unwrap();
        assert!(matches!(
            resources.get::<PageLimit>(),
            Err(ResourceError::BorrowConflict(_))
        ));
        drop(writer);
        assert!(resources.get::<PageLimit>().is_ok());
    }

    #[test]
    fn missing_resource_is_not_found() {
        let resources = Resources::new();
        let err = resources.get::<PageLimit>().err().unwrap();
        assert!(matches!(err, ResourceError::NotFound(name) if name.contains("PageLimit")));
    }

    #[test]
    fn remove_hands_back_ownership() {
        let mut resources = Resources::new();
        resources.insert(GraphName("tinker".into()));

        assert_eq!(
            resources.remove::<GraphName>(),
            Some(GraphName("tinker".into()))
        );
        assert!(resources.remove::<GraphName>().is_none());
        assert!(!resources.contains::<GraphName>());
    }

    #[test]
    fn len_tracks_distinct_types() {
        let mut resources = Resources::new();
        assert!(resources.is_empty());

        resources.insert(PageLimit(1));
        resources.insert(GraphName("g".into()));
        resources.insert(PageLimit(2));
        assert_eq!(resources.len(), 2);

        resources.clear();
        assert!(resources.is_empty());
    }

    #[test]
    fn resource_id_is_per_type() {
        assert_eq!(ResourceId::of::<PageLimit>(), ResourceId::of::<PageLimit>());
        assert_ne!(
            ResourceId::of::<PageLimit>().type_id(),
            ResourceId::of::<GraphName>().type_id()
        );
    }
}
