//! Reflect reference targets out of Rust source
//!
//! Parses a Rust file with `syn` and builds one [`Class`] per declared type:
//!
//! - `struct` / `enum` become classes, `trait` and inline `mod` become modules
//! - an `fn` with a receiver is an instance method, one without is an own
//!   (associated) method
//! - `pub` maps to public, any restricted `pub(..)` to protected, and
//!   inherited visibility to private
//! - methods from `impl Trait for Type` are public, and a trait declared in
//!   the same scope is included into the type so its default methods resolve
//! - items of an inline `mod` become nested constants of that module
//!
//! Impls for types declared outside the scope being reflected are ignored.

use std::sync::Arc;

use indexmap::IndexMap;
use quote::ToTokens;
use tracing::trace;

use super::{Class, Visibility};
use crate::constant::Constant;
use crate::error::Result;

/// Reflect every top-level item of `source`, in declaration order.
///
/// # Example
///
/// ```
/// use understudy::reference::source::reflect_source;
///
/// let items = reflect_source("pub struct Widget; impl Widget { pub fn spin(&self) {} }").unwrap();
/// assert_eq!(items[0].0, "Widget");
/// ```
pub fn reflect_source(source: &str) -> Result<Vec<(String, Constant)>> {
    let file = syn::parse_file(source)?;
    Ok(reflect_scope(&file.items, None))
}

/// Map a Rust visibility onto a method visibility.
pub fn visibility_of(vis: &syn::Visibility) -> Visibility {
    match vis {
        syn::Visibility::Public(_) => Visibility::Public,
        syn::Visibility::Restricted(_) => Visibility::Protected,
        syn::Visibility::Inherited => Visibility::Private,
    }
}

fn qualify(prefix: Option<&str>, ident: &syn::Ident) -> String {
    match prefix {
        Some(prefix) => format!("{}::{}", prefix, ident),
        None => ident.to_string(),
    }
}

/// Reflect one scope (a file or an inline module body).
fn reflect_scope(items: &[syn::Item], prefix: Option<&str>) -> Vec<(String, Constant)> {
    // Traits first: impls include them but never modify them
    let mut traits: IndexMap<String, Arc<Class>> = IndexMap::new();
    for item in items {
        if let syn::Item::Trait(item) = item {
            traits.insert(item.ident.to_string(), Arc::new(reflect_trait(item, prefix)));
        }
    }

    let mut types: IndexMap<String, Class> = IndexMap::new();
    for item in items {
        match item {
            syn::Item::Struct(item) => {
                types.insert(item.ident.to_string(), Class::new(qualify(prefix, &item.ident)));
            }
            syn::Item::Enum(item) => {
                types.insert(item.ident.to_string(), Class::new(qualify(prefix, &item.ident)));
            }
            syn::Item::Mod(item) => {
                types.insert(item.ident.to_string(), reflect_mod(item, prefix));
            }
            _ => {}
        }
    }

    for item in items {
        if let syn::Item::Impl(item) = item {
            apply_impl(item, &types, &traits);
        }
    }

    // Re-emit in source order
    let mut out = Vec::new();
    for item in items {
        let ident = match item {
            syn::Item::Struct(item) => &item.ident,
            syn::Item::Enum(item) => &item.ident,
            syn::Item::Mod(item) => &item.ident,
            syn::Item::Trait(item) => &item.ident,
            _ => continue,
        };
        let name = ident.to_string();
        if let Some(class) = types.shift_remove(&name) {
            out.push((name, Constant::Class(Arc::new(class))));
        } else if let Some(module) = traits.get(&name) {
            out.push((name, Constant::Class(Arc::clone(module))));
        }
    }
    out
}

fn reflect_trait(item: &syn::ItemTrait, prefix: Option<&str>) -> Class {
    let module = Class::module(qualify(prefix, &item.ident));
    for trait_item in &item.items {
        if let syn::TraitItem::Fn(f) = trait_item {
            let name = f.sig.ident.to_string();
            if f.sig.receiver().is_some() {
                module.instance_methods().define(name, Visibility::Public);
            } else {
                module.own_methods().define(name, Visibility::Public);
            }
        }
    }
    module
}

fn reflect_mod(item: &syn::ItemMod, prefix: Option<&str>) -> Class {
    let path = qualify(prefix, &item.ident);
    let module = Class::module(path.clone());
    if let Some((_, nested)) = &item.content {
        for (name, constant) in reflect_scope(nested, Some(&path)) {
            module.constants().set(name, constant);
        }
    }
    module
}

fn apply_impl(
    item: &syn::ItemImpl,
    types: &IndexMap<String, Class>,
    traits: &IndexMap<String, Arc<Class>>,
) {
    let Some(type_name) = last_segment(&item.self_ty) else {
        trace!(self_ty = %item.self_ty.to_token_stream(), "skipping impl for non-path type");
        return;
    };
    let Some(class) = types.get(&type_name) else {
        trace!(%type_name, "skipping impl for type declared elsewhere");
        return;
    };

    let trait_name = item
        .trait_
        .as_ref()
        .and_then(|(_, path, _)| path.segments.last())
        .map(|segment| segment.ident.to_string());

    if let Some(module) = trait_name.as_ref().and_then(|name| traits.get(name)) {
        class.include(Arc::clone(module));
    }

    for impl_item in &item.items {
        let syn::ImplItem::Fn(f) = impl_item else {
            continue;
        };
        let visibility = if trait_name.is_some() {
            Visibility::Public
        } else {
            visibility_of(&f.vis)
        };
        let name = f.sig.ident.to_string();
        if f.sig.receiver().is_some() {
            class.instance_methods().define(name, visibility);
        } else {
            class.own_methods().define(name, visibility);
        }
    }
}

fn last_segment(ty: &syn::Type) -> Option<String> {
    match ty {
        syn::Type::Path(path) if path.qself.is_none() => path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string()),
        syn::Type::Paren(inner) => last_segment(&inner.elem),
        syn::Type::Group(inner) => last_segment(&inner.elem),
        _ => None,
    }
}
