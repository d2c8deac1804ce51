//! The three double shapes: instance, object and class

use std::fmt;
use std::sync::{Arc, Weak};

use super::{DoubleRef, InFlightMessage, TestDouble, VerifyingDouble};
use crate::constant::{Constant, ConstantRegistry, ConstantStub, ConstantTable, StubOptions};
use crate::context::MockContext;
use crate::error::{DoubleError, Result};
use crate::method_reference::ReferenceApi;
use crate::proxy::VerifyingProxy;
use crate::reference::{Class, ReferenceTarget};

/// Implements the state accessors of [`VerifyingDouble`] and a short Debug.
macro_rules! verifying_double_state {
    ($ty:ident $(, nested = $field:ident)?) => {
        impl VerifyingDouble for $ty {
            fn test_double(&self) -> &TestDouble {
                &self.double
            }

            fn proxy(&self) -> &VerifyingProxy {
                &self.proxy
            }

            fn in_flight(&self) -> &InFlightMessage {
                &self.in_flight
            }

            $(
                fn nested_constants(&self) -> Option<&ConstantTable> {
                    Some(&self.$field)
                }
            )?
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($ty), self.double.label())
            }
        }
    };
}

// ═══════════════════════════════════════════════════════════════════════
// Instance double
// ═══════════════════════════════════════════════════════════════════════

/// Stands in for an *instance* of a class; checked against its instance API.
pub struct InstanceDouble {
    double: TestDouble,
    proxy: VerifyingProxy,
    in_flight: InFlightMessage,
}

impl InstanceDouble {
    /// Create a double for an instance of `class`, labelled
    /// `"<class> (instance)"`.
    pub fn new(class: Arc<Class>, ctx: &MockContext) -> Arc<Self> {
        let label = format!("{} (instance)", class.name());
        Arc::new_cyclic(|this: &Weak<Self>| {
            let this: Weak<dyn VerifyingDouble> = this.clone();
            Self {
                proxy: VerifyingProxy::new(
                    label.clone(),
                    ReferenceTarget::Class(class),
                    ReferenceApi::Instance,
                    ctx,
                ),
                double: TestDouble::new(label, this),
                in_flight: InFlightMessage::new(),
            }
        })
    }
}

verifying_double_state!(InstanceDouble);

// ═══════════════════════════════════════════════════════════════════════
// Object double
// ═══════════════════════════════════════════════════════════════════════

/// Stands in for one concrete object (or a class treated as an object);
/// checked against that object's own API.
pub struct ObjectDouble {
    double: TestDouble,
    proxy: VerifyingProxy,
    in_flight: InFlightMessage,
}

impl ObjectDouble {
    /// Create a double for `target`, labelled with its description.
    pub fn new(target: impl Into<ReferenceTarget>, ctx: &MockContext) -> Arc<Self> {
        let target = target.into();
        let label = target.description().to_string();
        Arc::new_cyclic(|this: &Weak<Self>| {
            let this: Weak<dyn VerifyingDouble> = this.clone();
            Self {
                proxy: VerifyingProxy::new(label.clone(), target, ReferenceApi::Own, ctx),
                double: TestDouble::new(label, this),
                in_flight: InFlightMessage::new(),
            }
        })
    }
}

verifying_double_state!(ObjectDouble);

// ═══════════════════════════════════════════════════════════════════════
// Class double
// ═══════════════════════════════════════════════════════════════════════

/// Stands in for a class or module; checked against its own (associated)
/// API.
///
/// Unlike [`ObjectDouble`], a class double carries its own nested constant
/// table, so constants nested under a stubbed class path keep resolving
/// when they are transferred onto it.
pub struct ClassDouble {
    double: TestDouble,
    proxy: VerifyingProxy,
    in_flight: InFlightMessage,
    constants: ConstantTable,
}

impl ClassDouble {
    /// Create a double for `class`, labelled with the class name.
    pub fn new(class: Arc<Class>, ctx: &MockContext) -> Arc<Self> {
        let label = class.name().to_string();
        Arc::new_cyclic(|this: &Weak<Self>| {
            let this: Weak<dyn VerifyingDouble> = this.clone();
            Self {
                proxy: VerifyingProxy::new(
                    label.clone(),
                    ReferenceTarget::Class(class),
                    ReferenceApi::Own,
                    ctx,
                ),
                double: TestDouble::new(label, this),
                in_flight: InFlightMessage::new(),
                constants: ConstantTable::new(),
            }
        })
    }
}

verifying_double_state!(ClassDouble, nested = constants);

// ═══════════════════════════════════════════════════════════════════════
// Constant replacement
// ═══════════════════════════════════════════════════════════════════════

/// Doubles that can take the place of their target's constant.
pub trait ConstantReplacement: VerifyingDouble + Sized + 'static {
    /// Bind this double to the target's constant path until the returned
    /// guard is dropped. `options` are passed to the registry untouched.
    ///
    /// # Errors
    ///
    /// - `NoConstantToReplace` if the target is not named by a constant
    /// - any error from [`ConstantRegistry::stub`]
    fn as_stubbed_const(
        self: &Arc<Self>,
        registry: &ConstantRegistry,
        options: &StubOptions,
    ) -> Result<ConstantStub> {
        let target = self.proxy().target();
        let Some(path) = target.const_to_replace() else {
            return Err(DoubleError::NoConstantToReplace {
                target: target.description().to_string(),
            });
        };
        let handle: DoubleRef = Arc::clone(self) as DoubleRef;
        registry.stub(path, Constant::Double(handle), options)
    }
}

impl ConstantReplacement for ObjectDouble {}

impl ConstantReplacement for ClassDouble {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{Object, Visibility};

    fn widget() -> Arc<Class> {
        Arc::new(
            Class::new("Widget")
                .with_instance_method("spin", Visibility::Public)
                .with_own_method("build", Visibility::Public),
        )
    }

    #[test]
    fn test_labels() {
        let ctx = MockContext::new();
        assert_eq!(InstanceDouble::new(widget(), &ctx).label(), "Widget (instance)");
        assert_eq!(ClassDouble::new(widget(), &ctx).label(), "Widget");
        let object = Arc::new(Object::new(widget()).with_description("the widget"));
        assert_eq!(ObjectDouble::new(object, &ctx).label(), "the widget");
    }

    #[test]
    fn test_variants_select_api() {
        let ctx = MockContext::new();
        assert_eq!(
            InstanceDouble::new(widget(), &ctx).proxy().api(),
            ReferenceApi::Instance
        );
        assert_eq!(ClassDouble::new(widget(), &ctx).proxy().api(), ReferenceApi::Own);
        assert_eq!(ObjectDouble::new(widget(), &ctx).proxy().api(), ReferenceApi::Own);
    }

    #[test]
    fn test_only_class_double_presents_as_namespace() {
        let ctx = MockContext::new();
        assert!(InstanceDouble::new(widget(), &ctx).nested_constants().is_none());
        assert!(ObjectDouble::new(widget(), &ctx).nested_constants().is_none());
        assert!(ClassDouble::new(widget(), &ctx).nested_constants().is_some());
    }

    #[test]
    fn test_self_handle_points_at_constructed_double() {
        let ctx = MockContext::new();
        let instance = InstanceDouble::new(widget(), &ctx);
        let object = ObjectDouble::new(widget(), &ctx);
        let class = ClassDouble::new(widget(), &ctx);

        let handles = [
            (instance.test_double().handle(), Arc::as_ptr(&instance) as *const ()),
            (object.test_double().handle(), Arc::as_ptr(&object) as *const ()),
            (class.test_double().handle(), Arc::as_ptr(&class) as *const ()),
        ];
        for (handle, expected) in handles {
            let handle = handle.expect("double is alive");
            assert_eq!(Arc::as_ptr(&handle) as *const (), expected);
        }
    }

    #[test]
    fn test_construction_leaves_marker_idle() {
        let ctx = MockContext::new();
        let double = ClassDouble::new(widget(), &ctx);
        assert!(double.in_flight().is_idle());
        assert!(!double.is_null_object());
    }

    #[test]
    fn test_debug_uses_label() {
        let ctx = MockContext::new();
        let double = InstanceDouble::new(widget(), &ctx);
        assert_eq!(format!("{:?}", double), "InstanceDouble(Widget (instance))");
    }

    #[test]
    fn test_object_target_cannot_stub_const() {
        let ctx = MockContext::new();
        let object = Arc::new(Object::new(widget()));
        let double = ObjectDouble::new(object, &ctx);
        let err = double
            .as_stubbed_const(&ConstantRegistry::new(), &StubOptions::new())
            .unwrap_err();
        assert!(matches!(err, DoubleError::NoConstantToReplace { .. }));
    }
}
