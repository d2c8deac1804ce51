//! Method lookup tests: ancestor chains and live method tables

use std::sync::Arc;

use pretty_assertions::assert_eq;
use understudy::*;

fn machine() -> Arc<Class> {
    Arc::new(
        Class::new("Machine")
            .with_instance_method("start", Visibility::Public)
            .with_instance_method("lubricate", Visibility::Private)
            .with_own_method("catalog", Visibility::Public),
    )
}

fn loud() -> Arc<Class> {
    Arc::new(Class::module("Loud").with_instance_method("start", Visibility::Protected))
}

// ═══════════════════════════════════════════════════════════════════════
// Ancestor chain
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_superclass_methods_resolve() {
    let press = Arc::new(Class::new("Press").with_superclass(machine()));
    let target = ReferenceTarget::from(press);

    assert_eq!(
        MethodReference::instance(&target, "lubricate").visibility(),
        Visibility::Private
    );
    assert!(MethodReference::own(&target, "catalog").is_implemented());
}

#[test]
fn test_included_module_wins_over_superclass() {
    let press = Arc::new(
        Class::new("Press")
            .with_superclass(machine())
            .with_include(loud()),
    );
    let target = ReferenceTarget::from(press);
    assert_eq!(
        MethodReference::instance(&target, "start").visibility(),
        Visibility::Protected
    );
}

#[test]
fn test_own_definition_wins_over_includes() {
    let press = Arc::new(
        Class::new("Press")
            .with_include(loud())
            .with_instance_method("start", Visibility::Public),
    );
    let target = ReferenceTarget::from(press);
    assert_eq!(
        MethodReference::instance(&target, "start").visibility(),
        Visibility::Public
    );
}

#[test]
fn test_undefine_masks_and_remove_reveals() {
    let press = Arc::new(Class::new("Press").with_superclass(machine()));
    let target = ReferenceTarget::from(press.clone());

    press.instance_methods().undefine("start");
    assert!(MethodReference::instance(&target, "start").is_unimplemented());

    press.instance_methods().remove("start");
    assert!(MethodReference::instance(&target, "start").is_implemented());
}

// ═══════════════════════════════════════════════════════════════════════
// Live lookups
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_lookup_is_repeatable() {
    let target = ReferenceTarget::from(machine());
    let first = MethodReference::instance(&target, "start");
    let second = MethodReference::instance(&target, "start");
    assert_eq!(first, second);
}

#[test]
fn test_late_include_is_seen() {
    let press = Arc::new(Class::new("Press"));
    let target = ReferenceTarget::from(press.clone());
    assert!(MethodReference::instance(&target, "start").is_unimplemented());

    press.include(loud());
    assert_eq!(
        MethodReference::instance(&target, "start").visibility(),
        Visibility::Protected
    );
}

#[test]
fn test_singleton_methods_shadow_class_api() {
    let object = Arc::new(
        Object::new(machine())
            .with_description("the press")
            .with_singleton_method("start", Visibility::Private),
    );
    let target = ReferenceTarget::from(object.clone());

    assert_eq!(target.description(), "the press");
    assert_eq!(
        MethodReference::own(&target, "start").visibility(),
        Visibility::Private
    );
    assert_eq!(
        MethodReference::instance(&target, "start").visibility(),
        Visibility::Public
    );

    object.singleton_methods().remove("start");
    assert_eq!(
        MethodReference::own(&target, "start").visibility(),
        Visibility::Public
    );
}
