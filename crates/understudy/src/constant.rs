//! Named constants: the namespace doubles can be swapped into

mod stub;

pub use stub::{ConstantStub, StubOptions, TransferNested};

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dashmap::DashMap;
use indexmap::IndexMap;
use tracing::debug;

use crate::double::DoubleRef;
use crate::error::Result;
use crate::reference::source::reflect_source;
use crate::reference::{Class, Object};

/// What a constant path can be bound to.
#[derive(Clone)]
pub enum Constant {
    /// A real class or module
    Class(Arc<Class>),

    /// A real object
    Object(Arc<Object>),

    /// A double standing in for whatever was bound here
    Double(DoubleRef),
}

impl Constant {
    /// The nested constant table, if this constant can act as a namespace.
    ///
    /// Classes always can; doubles only when they present as a class.
    pub fn nested(&self) -> Option<&ConstantTable> {
        match self {
            Constant::Class(class) => Some(class.constants()),
            Constant::Object(_) => None,
            Constant::Double(double) => double.nested_constants(),
        }
    }

    /// Check if this constant can hold nested constants.
    pub fn is_class_like(&self) -> bool {
        self.nested().is_some()
    }

    /// Human-readable description
    pub fn describe(&self) -> String {
        match self {
            Constant::Class(class) => class.name().to_string(),
            Constant::Object(object) => object.description().to_string(),
            Constant::Double(double) => format!("#<Double {:?}>", double.label()),
        }
    }

    /// The bound class, if any
    pub fn as_class(&self) -> Option<&Arc<Class>> {
        match self {
            Constant::Class(class) => Some(class),
            _ => None,
        }
    }

    /// The bound double, if any
    pub fn as_double(&self) -> Option<&DoubleRef> {
        match self {
            Constant::Double(double) => Some(double),
            _ => None,
        }
    }

    /// Identity comparison: both sides bind the very same class, object or double.
    pub fn same_as(&self, other: &Constant) -> bool {
        match (self, other) {
            (Constant::Class(a), Constant::Class(b)) => Arc::ptr_eq(a, b),
            (Constant::Object(a), Constant::Object(b)) => Arc::ptr_eq(a, b),
            (Constant::Double(a), Constant::Double(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Class(class) => write!(f, "{:?}", class),
            Constant::Object(object) => write!(f, "{:?}", object),
            Constant::Double(double) => write!(f, "Double({})", double.label()),
        }
    }
}

impl From<Arc<Class>> for Constant {
    fn from(class: Arc<Class>) -> Self {
        Constant::Class(class)
    }
}

impl From<Arc<Object>> for Constant {
    fn from(object: Arc<Object>) -> Self {
        Constant::Object(object)
    }
}

impl From<DoubleRef> for Constant {
    fn from(double: DoubleRef) -> Self {
        Constant::Double(double)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Nested constant table
// ═══════════════════════════════════════════════════════════════════════

/// Ordered, mutable table of nested constants owned by a class-like value.
#[derive(Default)]
pub struct ConstantTable {
    constants: RwLock<IndexMap<String, Constant>>,
}

impl ConstantTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexMap<String, Constant>> {
        self.constants.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexMap<String, Constant>> {
        self.constants.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a nested constant.
    pub fn get(&self, name: &str) -> Option<Constant> {
        self.read().get(name).cloned()
    }

    /// Bind a nested constant, returning the previous binding.
    pub fn set(&self, name: impl Into<String>, value: Constant) -> Option<Constant> {
        self.write().insert(name.into(), value)
    }

    /// Remove a nested constant.
    pub fn remove(&self, name: &str) -> Option<Constant> {
        self.write().shift_remove(name)
    }

    /// Check if a nested constant is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Names of every nested constant, in binding order.
    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Number of nested constants.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl fmt::Debug for ConstantTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.read().keys()).finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Top-level registry
// ═══════════════════════════════════════════════════════════════════════

/// The top-level constant namespace.
///
/// Clones share the same namespace, so a registry can be handed to every
/// double that needs to stub a constant.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use understudy::{Class, ConstantRegistry};
///
/// let registry = ConstantRegistry::new();
/// let outer = Class::module("Outer");
/// outer.constants().set("Inner", Arc::new(Class::new("Outer::Inner")).into());
/// registry.define("Outer", Arc::new(outer).into());
///
/// assert!(registry.is_defined("Outer::Inner"));
/// assert!(!registry.is_defined("Outer::Missing"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConstantRegistry {
    top: Arc<DashMap<String, Constant>>,
}

impl ConstantRegistry {
    /// Create an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a top-level constant, returning the previous binding.
    pub fn define(&self, name: impl Into<String>, value: Constant) -> Option<Constant> {
        self.top.insert(name.into(), value)
    }

    /// Reflect Rust source and bind every top-level item it declares.
    ///
    /// Returns the names bound, in declaration order.
    pub fn load_source(&self, source: &str) -> Result<Vec<String>> {
        let items = reflect_source(source)?;
        let mut names = Vec::with_capacity(items.len());
        for (name, constant) in items {
            debug!(%name, "defining reflected constant");
            self.define(name.clone(), constant);
            names.push(name);
        }
        Ok(names)
    }

    /// Resolve a `::`-separated constant path.
    ///
    /// The first segment comes from the top level; each further segment is
    /// looked up in the previous constant's nested table.
    pub fn resolve(&self, path: &str) -> Option<Constant> {
        let mut segments = split_path(path);
        let first = segments.next()?;
        let mut current = self.top.get(first).map(|entry| entry.value().clone())?;
        for segment in segments {
            current = current.nested()?.get(segment)?;
        }
        Some(current)
    }

    /// Check if a constant path resolves.
    pub fn is_defined(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }

    /// Names bound at the top level (unordered).
    pub fn names(&self) -> Vec<String> {
        self.top.iter().map(|entry| entry.key().clone()).collect()
    }

    pub(crate) fn top_level(&self) -> &Arc<DashMap<String, Constant>> {
        &self.top
    }
}

/// Split a constant path into its non-empty segments (`::A::B` == `A::B`).
pub(crate) fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split("::").map(str::trim).filter(|s| !s.is_empty())
}
