//! Method tables: name → visibility, in definition order

use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;

/// Visibility of a method as seen by a caller.
///
/// `Unimplemented` doubles as an explicit undefinition marker in a table:
/// it stops ancestor lookup the way removing a method from a subclass would.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Callable from anywhere
    Public,
    /// Callable by name or from related types only
    Protected,
    /// Callable by name or from within the type only
    Private,
    /// Not implemented
    Unimplemented,
}

impl Visibility {
    /// Check if this is an actual implementation (any visibility).
    pub fn is_implemented(self) -> bool {
        self != Visibility::Unimplemented
    }

    /// Check if the method is implemented but hidden from ordinary calls.
    pub fn is_non_public(self) -> bool {
        matches!(self, Visibility::Protected | Visibility::Private)
    }

    /// Lowercase keyword used in diagnostics
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
            Visibility::Unimplemented => "unimplemented",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mutable, ordered method table.
///
/// Tables are shared through `Arc`ed classes and objects and may be
/// changed mid-test, so they use interior mutability. Lookups never cache.
#[derive(Debug, Default)]
pub struct MethodTable {
    methods: RwLock<IndexMap<String, Visibility>>,
}

impl MethodTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexMap<String, Visibility>> {
        self.methods.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexMap<String, Visibility>> {
        self.methods.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Define (or redefine) a method with the given visibility.
    pub fn define(&self, name: impl Into<String>, visibility: Visibility) {
        self.write().insert(name.into(), visibility);
    }

    /// Mark a method as undefined here, masking any ancestor definition.
    pub fn undefine(&self, name: impl Into<String>) {
        self.define(name, Visibility::Unimplemented);
    }

    /// Remove this table's entry so ancestor definitions show through again.
    pub fn remove(&self, name: &str) -> Option<Visibility> {
        self.write().shift_remove(name)
    }

    /// Look up this table's own entry for `name`.
    pub fn get(&self, name: &str) -> Option<Visibility> {
        self.read().get(name).copied()
    }

    /// Names of all entries, in definition order.
    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
