//! Plain objects: instances with their own singleton methods

use std::fmt;
use std::sync::Arc;

use super::{Class, MethodTable, Visibility};

/// A concrete object used as a reference target.
///
/// An object responds to its singleton methods first, then to its class's
/// instance API.
pub struct Object {
    description: String,
    class: Arc<Class>,
    singleton_methods: MethodTable,
}

impl Object {
    /// Create an instance of `class`, described as `#<ClassName>`.
    pub fn new(class: Arc<Class>) -> Self {
        let description = format!("#<{}>", class.name());
        Self {
            description,
            class,
            singleton_methods: MethodTable::new(),
        }
    }

    /// Override the description (builder pattern)
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a singleton method (builder pattern)
    pub fn with_singleton_method(self, name: impl Into<String>, visibility: Visibility) -> Self {
        self.singleton_methods.define(name, visibility);
        self
    }

    /// Human-readable description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The object's class
    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    /// Methods defined on this object alone
    pub fn singleton_methods(&self) -> &MethodTable {
        &self.singleton_methods
    }

    /// Resolve a method this exact object responds to.
    pub fn find_method(&self, name: &str) -> Option<Visibility> {
        self.singleton_methods
            .get(name)
            .or_else(|| self.class.find_instance_method(name))
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_sees_class_instance_api() {
        let class = Arc::new(Class::new("Widget").with_instance_method("spin", Visibility::Public));
        let obj = Object::new(class);
        assert_eq!(obj.description(), "#<Widget>");
        assert_eq!(obj.find_method("spin"), Some(Visibility::Public));
    }

    #[test]
    fn test_singleton_shadows_class() {
        let class = Arc::new(Class::new("Widget").with_instance_method("spin", Visibility::Public));
        let obj = Object::new(class)
            .with_description("obj")
            .with_singleton_method("spin", Visibility::Private)
            .with_singleton_method("secret", Visibility::Private);
        assert_eq!(obj.find_method("spin"), Some(Visibility::Private));
        assert_eq!(obj.find_method("secret"), Some(Visibility::Private));
        assert_eq!(obj.find_method("missing"), None);
        assert_eq!(format!("{:?}", obj), "Object(obj)");
    }
}
