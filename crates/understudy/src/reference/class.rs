//! Classes and modules: the class-like reference targets

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use super::{MethodTable, Visibility};
use crate::constant::{Constant, ConstantTable};

/// Whether a class-like target can be instantiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    /// A concrete type (`struct`/`enum`)
    Class,
    /// A mixin or namespace (`trait`/`mod`)
    Module,
}

/// A class or module as the reflection layer sees it.
///
/// Holds two method tables: the *instance* API (what an instance responds
/// to) and the *own* API (what the class itself responds to, i.e.
/// associated functions). Both walk the ancestor chain on lookup: this
/// table, included modules (most recently included first), then the
/// superclass.
pub struct Class {
    name: String,
    kind: ClassKind,
    superclass: Option<Arc<Class>>,
    includes: RwLock<Vec<Arc<Class>>>,
    instance_methods: MethodTable,
    own_methods: MethodTable,
    constants: ConstantTable,
}

impl Class {
    /// Create an empty class.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name, ClassKind::Class)
    }

    /// Create an empty module.
    pub fn module(name: impl Into<String>) -> Self {
        Self::with_kind(name, ClassKind::Module)
    }

    fn with_kind(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            superclass: None,
            includes: RwLock::new(Vec::new()),
            instance_methods: MethodTable::new(),
            own_methods: MethodTable::new(),
            constants: ConstantTable::new(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Builder
    // ═══════════════════════════════════════════════════════════════════

    /// Set the superclass (builder pattern)
    pub fn with_superclass(mut self, superclass: Arc<Class>) -> Self {
        self.superclass = Some(superclass);
        self
    }

    /// Include a module (builder pattern)
    pub fn with_include(self, module: Arc<Class>) -> Self {
        self.include(module);
        self
    }

    /// Add an instance method (builder pattern)
    pub fn with_instance_method(self, name: impl Into<String>, visibility: Visibility) -> Self {
        self.instance_methods.define(name, visibility);
        self
    }

    /// Add an own (associated) method (builder pattern)
    pub fn with_own_method(self, name: impl Into<String>, visibility: Visibility) -> Self {
        self.own_methods.define(name, visibility);
        self
    }

    /// Add a nested constant (builder pattern)
    pub fn with_constant(self, name: impl Into<String>, value: Constant) -> Self {
        self.constants.set(name, value);
        self
    }

    // ═══════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════

    /// The class's name, which is also the constant it is bound to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Class or module.
    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    /// The superclass, if any.
    pub fn superclass(&self) -> Option<&Arc<Class>> {
        self.superclass.as_ref()
    }

    /// Included modules, in inclusion order.
    pub fn includes(&self) -> Vec<Arc<Class>> {
        self.includes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Include a module after construction.
    pub fn include(&self, module: Arc<Class>) {
        self.includes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(module);
    }

    /// This class's own instance method table (ancestors excluded).
    pub fn instance_methods(&self) -> &MethodTable {
        &self.instance_methods
    }

    /// This class's own associated method table (ancestors excluded).
    pub fn own_methods(&self) -> &MethodTable {
        &self.own_methods
    }

    /// Nested constants.
    pub fn constants(&self) -> &ConstantTable {
        &self.constants
    }

    // ═══════════════════════════════════════════════════════════════════
    // Ancestor-chain lookup
    // ═══════════════════════════════════════════════════════════════════

    /// Resolve an instance method through the ancestor chain.
    ///
    /// Returns the first entry found, which may be an undefinition marker.
    pub fn find_instance_method(&self, name: &str) -> Option<Visibility> {
        self.find(&|class: &Class| class.instance_methods.get(name))
    }

    /// Resolve an own (associated) method through the ancestor chain.
    pub fn find_own_method(&self, name: &str) -> Option<Visibility> {
        self.find(&|class: &Class| class.own_methods.get(name))
    }

    fn find(&self, table: &dyn Fn(&Class) -> Option<Visibility>) -> Option<Visibility> {
        self.find_unvisited(table, &mut HashSet::new())
    }

    /// Each class is searched at most once, so cyclic includes terminate.
    fn find_unvisited(
        &self,
        table: &dyn Fn(&Class) -> Option<Visibility>,
        visited: &mut HashSet<*const Class>,
    ) -> Option<Visibility> {
        if !visited.insert(self as *const Class) {
            return None;
        }
        if let Some(found) = table(self) {
            return Some(found);
        }
        for module in self.includes().iter().rev() {
            if let Some(found) = module.find_unvisited(table, visited) {
                return Some(found);
            }
        }
        self.superclass
            .as_ref()
            .and_then(|s| s.find_unvisited(table, visited))
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ClassKind::Class => write!(f, "Class({})", self.name),
            ClassKind::Module => write!(f, "Module({})", self.name),
        }
    }
}
