// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host objects that dynamic values can bind to.
//!
//! Hosts register their objects in an [`ObjectTable`] under a name. Each
//! object declares what it exposes explicitly through [`SourceObject`]:
//! itself as a value source, named members that are value sources, or a
//! numbered container of value sources.

use crate::source::{ValueSource, ValueSourceContainer};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased `Arc<dyn ValueSource<T>>`
#[derive(Clone)]
pub struct ErasedSource(Arc<dyn Any + Send + Sync>);

impl ErasedSource {
    /// Erase a typed source
    pub fn new<T: 'static>(source: Arc<dyn ValueSource<T>>) -> Self {
        Self(Arc::new(source))
    }

    /// Recover the typed source, `None` if it yields another type
    pub fn downcast<T: 'static>(&self) -> Option<Arc<dyn ValueSource<T>>> {
        self.0.downcast_ref::<Arc<dyn ValueSource<T>>>().cloned()
    }
}

impl fmt::Debug for ErasedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErasedSource")
    }
}

/// Type-erased `Arc<dyn ValueSourceContainer<T>>`
#[derive(Clone)]
pub struct ErasedContainer(Arc<dyn Any + Send + Sync>);

impl ErasedContainer {
    /// Erase a typed container
    pub fn new<T: 'static>(container: Arc<dyn ValueSourceContainer<T>>) -> Self {
        Self(Arc::new(container))
    }

    /// Recover the typed container, `None` if it holds another type
    pub fn downcast<T: 'static>(&self) -> Option<Arc<dyn ValueSourceContainer<T>>> {
        self.0.downcast_ref::<Arc<dyn ValueSourceContainer<T>>>().cloned()
    }
}

impl fmt::Debug for ErasedContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErasedContainer")
    }
}

/// An external object that dynamic values can reference
pub trait SourceObject: Send + Sync {
    /// The object itself as a value source
    fn as_value_source(&self) -> Option<ErasedSource> {
        None
    }

    /// A named member that is a value source
    fn member(&self, _name: &str) -> Option<ErasedSource> {
        None
    }

    /// The object as a container of value sources
    fn as_container(&self) -> Option<ErasedContainer> {
        None
    }
}

/// Named host objects available to the fixup pass
#[derive(Default, Clone)]
pub struct ObjectTable {
    objects: IndexMap<String, Arc<dyn SourceObject>>,
}

impl ObjectTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object, returning the one previously under `name`
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        object: impl SourceObject + 'static,
    ) -> Option<Arc<dyn SourceObject>> {
        self.objects.insert(name.into(), Arc::new(object))
    }

    /// Remove an object
    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn SourceObject>> {
        self.objects.shift_remove(name)
    }

    /// Look up an object by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn SourceObject>> {
        self.objects.get(name)
    }

    /// Whether an object is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    /// Number of registered objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl fmt::Debug for ObjectTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.objects.keys()).finish()
    }
}

/// General purpose [`SourceObject`] assembled from explicit registrations
#[derive(Debug, Default, Clone)]
pub struct ObjectRecord {
    source: Option<ErasedSource>,
    members: IndexMap<String, ErasedSource>,
    container: Option<ErasedContainer>,
}

impl ObjectRecord {
    /// Create an object exposing nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose the object itself as a value source
    pub fn with_source<T: 'static>(mut self, source: Arc<dyn ValueSource<T>>) -> Self {
        self.source = Some(ErasedSource::new(source));
        self
    }

    /// Expose a named value-source member
    pub fn with_member<T: 'static>(
        mut self,
        name: impl Into<String>,
        source: Arc<dyn ValueSource<T>>,
    ) -> Self {
        self.members.insert(name.into(), ErasedSource::new(source));
        self
    }

    /// Expose the object as a value-source container
    pub fn with_container<T: 'static>(mut self, container: Arc<dyn ValueSourceContainer<T>>) -> Self {
        self.container = Some(ErasedContainer::new(container));
        self
    }

    /// Rename a member, returning whether it existed
    pub fn rename_member(&mut self, from: &str, to: impl Into<String>) -> bool {
        match self.members.shift_remove(from) {
            Some(source) => {
                self.members.insert(to.into(), source);
                true
            }
            None => false,
        }
    }

    /// Remove a member, returning whether it existed
    pub fn remove_member(&mut self, name: &str) -> bool {
        self.members.shift_remove(name).is_some()
    }

    /// Member names in registration order
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }
}

impl SourceObject for ObjectRecord {
    fn as_value_source(&self) -> Option<ErasedSource> {
        self.source.clone()
    }

    fn member(&self, name: &str) -> Option<ErasedSource> {
        self.members.get(name).cloned()
    }

    fn as_container(&self) -> Option<ErasedContainer> {
        self.container.clone()
    }
}

/// A host-writable value shared with every binding that reads it
#[derive(Debug, Default)]
pub struct SharedValue<T>(Arc<RwLock<T>>);

impl<T> SharedValue<T> {
    /// Create a shared value
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Overwrite the value
    pub fn set(&self, value: T) {
        *self.0.write() = value;
    }
}

impl<T: Clone> SharedValue<T> {
    /// Read the value
    pub fn get(&self) -> T {
        self.0.read().clone()
    }
}

impl<T> Clone for SharedValue<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Clone + Send + Sync> ValueSource<T> for SharedValue<T> {
    fn value(&self) -> T {
        self.get()
    }
}

/// A numbered list of value sources
pub struct SourceList<T> {
    sources: Vec<Arc<dyn ValueSource<T>>>,
}

impl<T> SourceList<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Append a source, returning its index
    pub fn push(&mut self, source: Arc<dyn ValueSource<T>>) -> usize {
        self.sources.push(source);
        self.sources.len() - 1
    }
}

impl<T> Default for SourceList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ValueSourceContainer<T> for SourceList<T> {
    fn value_source(&self, index: usize) -> Option<Arc<dyn ValueSource<T>>> {
        self.sources.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.sources.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erased_source_downcast() {
        let source: Arc<dyn ValueSource<f32>> = Arc::new(SharedValue::new(2.0f32));
        let erased = ErasedSource::new(source);
        assert!(erased.downcast::<i32>().is_none());
        assert_eq!(erased.downcast::<f32>().map(|s| s.value()), Some(2.0));
    }

    #[test]
    fn test_shared_value_is_shared() {
        let value = SharedValue::new(1);
        let copy = value.clone();
        copy.set(7);
        assert_eq!(value.get(), 7);
    }

    #[test]
    fn test_object_table() {
        let mut objects = ObjectTable::new();
        assert!(objects.is_empty());
        objects.insert("a", ObjectRecord::new());
        assert!(objects.insert("a", ObjectRecord::new()).is_some());
        assert_eq!(objects.len(), 1);
        assert!(objects.contains("a"));
        assert!(objects.remove("a").is_some());
        assert!(!objects.contains("a"));
    }

    #[test]
    fn test_record_members() {
        let mut record = ObjectRecord::new()
            .with_member::<f32>("x", Arc::new(SharedValue::new(1.0)))
            .with_member::<f32>("y", Arc::new(SharedValue::new(2.0)));
        assert!(record.rename_member("x", "z"));
        assert!(!record.rename_member("x", "w"));
        assert!(record.member("x").is_none());
        assert!(record.member("z").is_some());
        assert!(record.remove_member("y"));
        assert_eq!(record.member_names().collect::<Vec<_>>(), vec!["z"]);
    }
}
