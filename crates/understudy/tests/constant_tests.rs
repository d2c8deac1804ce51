//! Constant stubbing tests: doubles swapped into the namespace

use std::sync::Arc;

use anyhow::Result;
use pretty_assertions::assert_eq;
use understudy::*;

/// `Widget` with a nested `Gear` and `Spring`, bound at the top level.
fn setup() -> (ConstantRegistry, Arc<Class>, Arc<Class>) {
    let gear = Arc::new(Class::new("Widget::Gear"));
    let widget = Arc::new(
        Class::new("Widget")
            .with_own_method("build", Visibility::Public)
            .with_constant("Gear", gear.clone().into())
            .with_constant("Spring", Arc::new(Class::new("Widget::Spring")).into()),
    );
    let registry = ConstantRegistry::new();
    registry.define("Widget", widget.clone().into());
    (registry, widget, gear)
}

// ═══════════════════════════════════════════════════════════════════════
// Binding and restoring
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_class_double_replaces_constant_for_scope() -> Result<()> {
    let (registry, widget, _) = setup();
    let double = ClassDouble::new(widget.clone(), &MockContext::new());
    double.stub("build", Response::returns(42i64))?;

    {
        let _stub = double.as_stubbed_const(&registry, &StubOptions::new())?;
        let bound = registry.resolve("Widget").expect("Widget is bound");
        let answer = bound.as_double().expect("bound to a double").receive("build", &[])?;
        assert_eq!(answer, Value::I64(42));
    }

    let restored = registry.resolve("Widget").expect("Widget is bound");
    assert!(restored.same_as(&Constant::Class(widget)));
    Ok(())
}

#[test]
fn test_explicit_reset_restores() -> Result<()> {
    let (registry, widget, _) = setup();
    let double = ClassDouble::new(widget.clone(), &MockContext::new());

    let stub = double.as_stubbed_const(&registry, &StubOptions::new())?;
    assert_eq!(stub.path(), "Widget");
    assert!(stub.was_defined());
    stub.reset();

    assert!(registry
        .resolve("Widget")
        .is_some_and(|c| c.same_as(&Constant::Class(widget))));
    Ok(())
}

#[test]
fn test_stubbing_undefined_constant_unbinds_afterwards() -> Result<()> {
    let registry = ConstantRegistry::new();
    let ghost = Arc::new(Class::new("Ghost").with_own_method("boo", Visibility::Public));
    let double = ObjectDouble::new(ghost, &MockContext::new());

    {
        let stub = double.as_stubbed_const(&registry, &StubOptions::new())?;
        assert!(!stub.was_defined());
        assert!(registry.is_defined("Ghost"));
    }
    assert!(!registry.is_defined("Ghost"));
    Ok(())
}

#[test]
fn test_object_double_of_class_can_replace_constant() -> Result<()> {
    let (registry, widget, _) = setup();
    let double = ObjectDouble::new(widget, &MockContext::new());
    double.as_null_object();

    let _stub = double.as_stubbed_const(&registry, &StubOptions::new())?;
    let bound = registry.resolve("Widget").expect("Widget is bound");
    assert!(bound.as_double().expect("bound to a double").receive("build", &[])?.is_double());
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Nested constants
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_nested_constants_hidden_by_default() -> Result<()> {
    let (registry, widget, _) = setup();
    let double = ClassDouble::new(widget, &MockContext::new());

    let _stub = double.as_stubbed_const(&registry, &StubOptions::new())?;
    assert!(!registry.is_defined("Widget::Gear"));
    Ok(())
}

#[test]
fn test_transfer_all_nested_constants() -> Result<()> {
    let (registry, widget, gear) = setup();
    let double = ClassDouble::new(widget, &MockContext::new());

    {
        let _stub = double.as_stubbed_const(&registry, &StubOptions::new().transfer_all())?;
        let resolved = registry.resolve("Widget::Gear").expect("Gear transferred");
        assert!(resolved.same_as(&Constant::Class(gear.clone())));
        assert!(registry.is_defined("Widget::Spring"));
    }

    // Back on the original class
    assert!(registry
        .resolve("Widget::Gear")
        .is_some_and(|c| c.same_as(&Constant::Class(gear))));
    Ok(())
}

#[test]
fn test_transfer_selected_nested_constants() -> Result<()> {
    let (registry, widget, _) = setup();
    let double = ClassDouble::new(widget, &MockContext::new());

    let options = StubOptions::from_json(r#"{ "transfer_nested_constants": ["Gear"] }"#)?;
    let _stub = double.as_stubbed_const(&registry, &options)?;
    assert!(registry.is_defined("Widget::Gear"));
    assert!(!registry.is_defined("Widget::Spring"));
    Ok(())
}

#[test]
fn test_transfer_of_missing_nested_constant_fails() {
    let (registry, widget, _) = setup();
    let double = ClassDouble::new(widget.clone(), &MockContext::new());

    let err = double
        .as_stubbed_const(&registry, &StubOptions::new().transfer_only(["Axle"]))
        .unwrap_err();
    assert!(matches!(err, DoubleError::CannotTransferNestedConstants { .. }));
    // Nothing was rebound
    assert!(registry
        .resolve("Widget")
        .is_some_and(|c| c.same_as(&Constant::Class(widget))));
}

#[test]
fn test_transfer_onto_object_double_fails() {
    let (registry, widget, _) = setup();
    let double = ObjectDouble::new(widget, &MockContext::new());

    let err = double
        .as_stubbed_const(&registry, &StubOptions::new().transfer_all())
        .unwrap_err();
    assert!(err.to_string().contains("not a class or module"));
}

// ═══════════════════════════════════════════════════════════════════════
// Nested paths
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_stub_nested_path_from_reflected_source() -> Result<()> {
    let registry = ConstantRegistry::new();
    registry.load_source(
        r#"
        pub mod shop {
            pub struct Till;
            impl Till {
                pub fn open() -> Self { Till }
            }
        }
        "#,
    )?;
    let till = registry
        .resolve("shop::Till")
        .and_then(|c| c.as_class().cloned())
        .expect("reflected Till");
    assert_eq!(till.name(), "shop::Till");

    let double = ClassDouble::new(till.clone(), &MockContext::new());
    double.stub("open", Response::returns("opened"))?;
    {
        let _stub = double.as_stubbed_const(&registry, &StubOptions::new())?;
        let bound = registry.resolve("shop::Till").expect("Till is bound");
        assert_eq!(
            bound.as_double().expect("bound to a double").receive("open", &[])?,
            Value::string("opened")
        );
    }
    assert!(registry
        .resolve("shop::Till")
        .is_some_and(|c| c.same_as(&Constant::Class(till))));
    Ok(())
}

#[test]
fn test_stub_under_missing_parent_fails() {
    let registry = ConstantRegistry::new();
    let inner = Arc::new(Class::new("Nowhere::Inner"));
    let double = ClassDouble::new(inner, &MockContext::new());

    match double.as_stubbed_const(&registry, &StubOptions::new()) {
        Err(DoubleError::UndefinedConstant { path }) => assert_eq!(path, "Nowhere"),
        other => panic!("expected UndefinedConstant, got {:?}", other),
    }
}
