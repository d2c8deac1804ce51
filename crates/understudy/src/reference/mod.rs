//! Reference targets: the real classes and objects doubles are checked against

mod class;
mod object;
pub mod source;
mod table;

pub use class::{Class, ClassKind};
pub use object::Object;
pub use table::{MethodTable, Visibility};

use std::sync::Arc;

/// The real class or object a verifying double stands in for.
///
/// Cloning shares the underlying target; the core never mutates it.
#[derive(Debug, Clone)]
pub enum ReferenceTarget {
    /// A class or module
    Class(Arc<Class>),

    /// A concrete object
    Object(Arc<Object>),
}

impl ReferenceTarget {
    /// Human-readable description used in labels and diagnostics.
    pub fn description(&self) -> &str {
        match self {
            ReferenceTarget::Class(class) => class.name(),
            ReferenceTarget::Object(object) => object.description(),
        }
    }

    /// The constant path this target is bound to, if it has one.
    ///
    /// Only class-like targets are named by a constant.
    pub fn const_to_replace(&self) -> Option<&str> {
        match self {
            ReferenceTarget::Class(class) => Some(class.name()),
            ReferenceTarget::Object(_) => None,
        }
    }

    /// Check if the target is a class or module.
    pub fn is_class_like(&self) -> bool {
        matches!(self, ReferenceTarget::Class(_))
    }

    /// The target as a class, if it is one.
    pub fn as_class(&self) -> Option<&Arc<Class>> {
        match self {
            ReferenceTarget::Class(class) => Some(class),
            ReferenceTarget::Object(_) => None,
        }
    }
}

impl From<Arc<Class>> for ReferenceTarget {
    fn from(class: Arc<Class>) -> Self {
        ReferenceTarget::Class(class)
    }
}

impl From<Arc<Object>> for ReferenceTarget {
    fn from(object: Arc<Object>) -> Self {
        ReferenceTarget::Object(object)
    }
}
