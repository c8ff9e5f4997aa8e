// SPDX-License-Identifier: MIT OR Apache-2.0
//! Value sources and the four-mode [`DynamicValue`].
//!
//! A [`DynamicValue`] is either a literal or an indirection to a value
//! source owned by a host object. Indirections are stored by name and
//! resolved into cached handles by [`DynamicValue::bind`]; reads never look
//! anything up by name. A binding that cannot be resolved reads as the
//! zero value of `T`.

use crate::objects::ObjectTable;
use crate::value::{GraphValue, Value, ValueType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Something that yields a `T` on demand
pub trait ValueSource<T>: Send + Sync {
    /// Produce the current value
    fn value(&self) -> T;
}

/// An object exposing a numbered set of interchangeable value sources
pub trait ValueSourceContainer<T>: Send + Sync {
    /// Get the source at `index`, `None` if out of range
    fn value_source(&self, index: usize) -> Option<Arc<dyn ValueSource<T>>>;

    /// Number of sources in the container
    fn len(&self) -> usize;

    /// Whether the container holds no sources
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolution strategy of a [`DynamicValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceMode {
    /// Literal value
    Static,
    /// The referenced object is itself a value source
    Object,
    /// A named member of the referenced object is a value source
    Member,
    /// An indexed entry of the referenced container object
    Indexed,
}

/// Indirection to an object that is itself a value source
pub struct ObjectRef<T> {
    object: String,
    source: Option<Arc<dyn ValueSource<T>>>,
}

/// Indirection to a named value-source member of an object
pub struct MemberRef<T> {
    object: String,
    member: String,
    field: Option<Arc<dyn ValueSource<T>>>,
}

/// Indirection to one entry of a value-source container
pub struct IndexedRef<T> {
    object: String,
    index: usize,
    container: Option<Arc<dyn ValueSourceContainer<T>>>,
}

/// A value that is either a literal or resolved through a host object
pub enum DynamicValue<T> {
    /// Literal value
    Static(T),
    /// Delegates to an object that is a value source
    Object(ObjectRef<T>),
    /// Delegates to a named member of an object
    Member(MemberRef<T>),
    /// Delegates to an entry of a container object
    Indexed(IndexedRef<T>),
}

impl<T: GraphValue> DynamicValue<T> {
    /// Create a literal value
    pub fn constant(value: T) -> Self {
        Self::Static(value)
    }

    /// Create an unbound reference to a value-source object
    pub fn object(object: impl Into<String>) -> Self {
        Self::Object(ObjectRef {
            object: object.into(),
            source: None,
        })
    }

    /// Create an unbound reference to a named member of an object
    pub fn member(object: impl Into<String>, member: impl Into<String>) -> Self {
        Self::Member(MemberRef {
            object: object.into(),
            member: member.into(),
            field: None,
        })
    }

    /// Create an unbound reference to an entry of a container object
    pub fn indexed(object: impl Into<String>, index: usize) -> Self {
        Self::Indexed(IndexedRef {
            object: object.into(),
            index,
            container: None,
        })
    }

    /// Current resolution strategy
    pub fn mode(&self) -> SourceMode {
        match self {
            Self::Static(_) => SourceMode::Static,
            Self::Object(_) => SourceMode::Object,
            Self::Member(_) => SourceMode::Member,
            Self::Indexed(_) => SourceMode::Indexed,
        }
    }

    /// Replace the value with a literal, dropping any binding
    pub fn set_static(&mut self, value: T) {
        *self = Self::Static(value);
    }

    /// Whether reads currently reach a live source.
    ///
    /// For indexed references this only checks the container handle; the
    /// index itself is looked up on every read.
    pub fn is_bound(&self) -> bool {
        match self {
            Self::Static(_) => true,
            Self::Object(r) => r.source.is_some(),
            Self::Member(r) => r.field.is_some(),
            Self::Indexed(r) => r.container.is_some(),
        }
    }

    /// Resolve the stored names into cached handles.
    ///
    /// Must be re-run whenever the objects in `objects` change. Returns
    /// whether the binding resolved; an unresolved binding reads as zero.
    pub fn bind(&mut self, objects: &ObjectTable) -> bool {
        match self {
            Self::Static(_) => true,
            Self::Object(r) => {
                r.source = objects
                    .get(&r.object)
                    .and_then(|o| o.as_value_source())
                    .and_then(|s| s.downcast::<T>());
                if r.source.is_none() {
                    tracing::warn!(
                        "Unresolved binding: object '{}' is not a {} source",
                        r.object,
                        T::VALUE_TYPE
                    );
                }
                r.source.is_some()
            }
            Self::Member(r) => {
                r.field = objects
                    .get(&r.object)
                    .and_then(|o| o.member(&r.member))
                    .and_then(|s| s.downcast::<T>());
                if r.field.is_none() {
                    tracing::warn!(
                        "Unresolved binding: member '{}.{}' is not a {} source",
                        r.object,
                        r.member,
                        T::VALUE_TYPE
                    );
                }
                r.field.is_some()
            }
            Self::Indexed(r) => {
                r.container = objects
                    .get(&r.object)
                    .and_then(|o| o.as_container())
                    .and_then(|c| c.downcast::<T>());
                if r.container.is_none() {
                    tracing::warn!(
                        "Unresolved binding: object '{}' is not a {} container",
                        r.object,
                        T::VALUE_TYPE
                    );
                }
                r.container.is_some()
            }
        }
    }

    /// Persisted form of this value
    pub fn record(&self) -> ValueRecord {
        let (value, source) = match self {
            Self::Static(v) => (v.clone().into_value(), SourceRef::Static),
            Self::Object(r) => (
                T::default().into_value(),
                SourceRef::Object {
                    object: r.object.clone(),
                },
            ),
            Self::Member(r) => (
                T::default().into_value(),
                SourceRef::Member {
                    object: r.object.clone(),
                    member: r.member.clone(),
                },
            ),
            Self::Indexed(r) => (
                T::default().into_value(),
                SourceRef::Indexed {
                    object: r.object.clone(),
                    index: r.index,
                },
            ),
        };
        ValueRecord { value, source }
    }

    /// Rebuild from a persisted record, unbound.
    ///
    /// Returns `None` if a static record holds a value of another type.
    pub fn from_record(record: &ValueRecord) -> Option<Self> {
        match &record.source {
            SourceRef::Static => T::from_value(&record.value).map(Self::Static),
            SourceRef::Object { object } => Some(Self::object(object.clone())),
            SourceRef::Member { object, member } => {
                Some(Self::member(object.clone(), member.clone()))
            }
            SourceRef::Indexed { object, index } => Some(Self::indexed(object.clone(), *index)),
        }
    }
}

impl<T: GraphValue> ValueSource<T> for DynamicValue<T> {
    fn value(&self) -> T {
        match self {
            Self::Static(v) => v.clone(),
            Self::Object(r) => r.source.as_ref().map(|s| s.value()).unwrap_or_default(),
            Self::Member(r) => r.field.as_ref().map(|s| s.value()).unwrap_or_default(),
            Self::Indexed(r) => r
                .container
                .as_ref()
                .and_then(|c| c.value_source(r.index))
                .map(|s| s.value())
                .unwrap_or_default(),
        }
    }
}

impl<T: GraphValue> Default for DynamicValue<T> {
    fn default() -> Self {
        Self::Static(T::default())
    }
}

impl<T: GraphValue> From<T> for DynamicValue<T> {
    fn from(value: T) -> Self {
        Self::Static(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(v) => f.debug_tuple("Static").field(v).finish(),
            Self::Object(r) => f
                .debug_struct("Object")
                .field("object", &r.object)
                .field("bound", &r.source.is_some())
                .finish(),
            Self::Member(r) => f
                .debug_struct("Member")
                .field("object", &r.object)
                .field("member", &r.member)
                .field("bound", &r.field.is_some())
                .finish(),
            Self::Indexed(r) => f
                .debug_struct("Indexed")
                .field("object", &r.object)
                .field("index", &r.index)
                .field("bound", &r.container.is_some())
                .finish(),
        }
    }
}

/// Object-safe view of a [`DynamicValue`] owned by a node.
///
/// Lets the graph bind, persist and overwrite node values without knowing
/// their concrete type.
pub trait DynamicField: Send {
    /// Type of the value
    fn value_type(&self) -> ValueType;

    /// Current resolution strategy
    fn mode(&self) -> SourceMode;

    /// See [`DynamicValue::bind`]
    fn bind(&mut self, objects: &ObjectTable) -> bool;

    /// Persisted form
    fn record(&self) -> ValueRecord;

    /// Replace with a persisted record, returning `false` on a type mismatch
    fn load(&mut self, record: &ValueRecord) -> bool;

    /// Replace with a literal, returning `false` on a type mismatch
    fn set_static_value(&mut self, value: &Value) -> bool;

    /// Resolve the current value
    fn current(&self) -> Value;
}

impl<T: GraphValue> DynamicField for DynamicValue<T> {
    fn value_type(&self) -> ValueType {
        T::VALUE_TYPE
    }

    fn mode(&self) -> SourceMode {
        DynamicValue::mode(self)
    }

    fn bind(&mut self, objects: &ObjectTable) -> bool {
        DynamicValue::bind(self, objects)
    }

    fn record(&self) -> ValueRecord {
        DynamicValue::record(self)
    }

    fn load(&mut self, record: &ValueRecord) -> bool {
        match Self::from_record(record) {
            Some(value) => {
                *self = value;
                true
            }
            None => false,
        }
    }

    fn set_static_value(&mut self, value: &Value) -> bool {
        match T::from_value(value) {
            Some(v) => {
                self.set_static(v);
                true
            }
            None => false,
        }
    }

    fn current(&self) -> Value {
        self.value().into_value()
    }
}

/// Persisted reference target of a [`DynamicValue`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SourceRef {
    /// Literal, see [`ValueRecord::value`]
    #[default]
    Static,
    /// Object that is itself a value source
    Object {
        /// Object name in the host [`ObjectTable`]
        object: String,
    },
    /// Named member of an object
    Member {
        /// Object name in the host [`ObjectTable`]
        object: String,
        /// Member name on the object
        member: String,
    },
    /// Entry of a container object
    Indexed {
        /// Object name in the host [`ObjectTable`]
        object: String,
        /// Entry index
        index: usize,
    },
}

/// Persisted form of a [`DynamicValue`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRecord {
    /// Literal value (zero of the value type for references)
    pub value: Value,
    /// Reference target
    #[serde(default)]
    pub source: SourceRef,
}
