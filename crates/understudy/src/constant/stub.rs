//! Scoped constant rebinding with automatic restoration

use std::sync::Arc;

use dashmap::DashMap;
use serde::Deserialize;
use tracing::debug;

use super::{split_path, Constant, ConstantRegistry, ConstantTable};
use crate::error::{DoubleError, Result};

/// Which nested constants of the original to copy onto the replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "TransferRepr")]
pub enum TransferNested {
    /// Copy nothing
    #[default]
    None,
    /// Copy every nested constant
    All,
    /// Copy only the named constants
    Only(Vec<String>),
}

/// JSON shape: `false`, `true`, or a list of names.
#[derive(Deserialize)]
#[serde(untagged)]
enum TransferRepr {
    Flag(bool),
    Names(Vec<String>),
}

impl From<TransferRepr> for TransferNested {
    fn from(repr: TransferRepr) -> Self {
        match repr {
            TransferRepr::Flag(false) => TransferNested::None,
            TransferRepr::Flag(true) => TransferNested::All,
            TransferRepr::Names(names) => TransferNested::Only(names),
        }
    }
}

/// Options for a constant stub. Doubles pass these through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StubOptions {
    /// Nested constants to carry over from the original binding
    pub transfer_nested_constants: TransferNested,
}

impl StubOptions {
    /// Create default options (no transfer).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from JSON.
    ///
    /// ```
    /// use understudy::{StubOptions, TransferNested};
    ///
    /// let options = StubOptions::from_json(r#"{ "transfer_nested_constants": ["Config"] }"#).unwrap();
    /// assert_eq!(options.transfer_nested_constants, TransferNested::Only(vec!["Config".into()]));
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builder: transfer every nested constant.
    pub fn transfer_all(mut self) -> Self {
        self.transfer_nested_constants = TransferNested::All;
        self
    }

    /// Builder: transfer only the named nested constants.
    pub fn transfer_only<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transfer_nested_constants =
            TransferNested::Only(names.into_iter().map(Into::into).collect());
        self
    }
}

/// Where a stubbed name lives: the top level or a class-like parent.
enum Scope {
    TopLevel(Arc<DashMap<String, Constant>>),
    Nested(Constant),
}

impl Scope {
    fn table(&self) -> Option<&ConstantTable> {
        match self {
            Scope::TopLevel(_) => None,
            Scope::Nested(parent) => parent.nested(),
        }
    }

    fn get(&self, name: &str) -> Option<Constant> {
        match self {
            Scope::TopLevel(top) => top.get(name).map(|entry| entry.value().clone()),
            Scope::Nested(_) => self.table().and_then(|table| table.get(name)),
        }
    }

    fn set(&self, name: &str, value: Constant) {
        match self {
            Scope::TopLevel(top) => {
                top.insert(name.to_string(), value);
            }
            Scope::Nested(_) => {
                if let Some(table) = self.table() {
                    table.set(name, value);
                }
            }
        }
    }

    fn remove(&self, name: &str) {
        match self {
            Scope::TopLevel(top) => {
                top.remove(name);
            }
            Scope::Nested(_) => {
                if let Some(table) = self.table() {
                    table.remove(name);
                }
            }
        }
    }
}

/// RAII guard for a stubbed constant.
///
/// Restores the previous binding (or unbinds the name if there was none)
/// when dropped or [`reset`](ConstantStub::reset). Guards for the same path
/// must be released in reverse order of creation.
pub struct ConstantStub {
    path: String,
    name: String,
    scope: Scope,
    original: Option<Constant>,
    restored: bool,
}

impl ConstantStub {
    /// The full constant path that was stubbed.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The binding that will be restored, if the constant was defined.
    pub fn original(&self) -> Option<&Constant> {
        self.original.as_ref()
    }

    /// Check if the constant existed before stubbing.
    pub fn was_defined(&self) -> bool {
        self.original.is_some()
    }

    /// Restore the previous binding now.
    pub fn reset(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        match self.original.take() {
            Some(original) => self.scope.set(&self.name, original),
            None => self.scope.remove(&self.name),
        }
        debug!(path = %self.path, "restored constant");
    }
}

impl Drop for ConstantStub {
    fn drop(&mut self) {
        self.restore();
    }
}

impl std::fmt::Debug for ConstantStub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConstantStub({})", self.path)
    }
}

impl ConstantRegistry {
    /// Bind `path` to `replacement` until the returned guard is dropped.
    ///
    /// # Errors
    ///
    /// - `UndefinedConstant` if the parent of a nested path does not resolve
    ///   to a class-like constant
    /// - `CannotTransferNestedConstants` if the requested transfer is impossible
    pub fn stub(
        &self,
        path: &str,
        replacement: Constant,
        options: &StubOptions,
    ) -> Result<ConstantStub> {
        let segments: Vec<&str> = split_path(path).collect();
        let Some((name, parents)) = segments.split_last() else {
            return Err(DoubleError::UndefinedConstant {
                path: path.to_string(),
            });
        };

        let scope = if parents.is_empty() {
            Scope::TopLevel(Arc::clone(self.top_level()))
        } else {
            let parent_path = parents.join("::");
            match self.resolve(&parent_path) {
                Some(parent) if parent.is_class_like() => Scope::Nested(parent),
                _ => return Err(DoubleError::UndefinedConstant { path: parent_path }),
            }
        };

        let original = scope.get(name);
        transfer_nested_constants(
            path,
            original.as_ref(),
            &replacement,
            &options.transfer_nested_constants,
        )?;

        debug!(%path, replacement = %replacement.describe(), defined = original.is_some(), "stubbing constant");
        scope.set(name, replacement);

        Ok(ConstantStub {
            path: path.to_string(),
            name: name.to_string(),
            scope,
            original,
            restored: false,
        })
    }
}

fn transfer_nested_constants(
    path: &str,
    original: Option<&Constant>,
    replacement: &Constant,
    mode: &TransferNested,
) -> Result<()> {
    let only = match mode {
        TransferNested::None => return Ok(()),
        TransferNested::All => None,
        TransferNested::Only(names) => Some(names),
    };
    let fail = |reason: String| DoubleError::CannotTransferNestedConstants {
        path: path.to_string(),
        reason,
    };

    let Some(original) = original else {
        return Err(fail("the constant is not defined".to_string()));
    };
    let Some(source) = original.nested() else {
        return Err(fail(format!(
            "{} is not a class or module",
            original.describe()
        )));
    };
    let Some(target) = replacement.nested() else {
        return Err(fail(format!(
            "the replacement {} is not a class or module",
            replacement.describe()
        )));
    };

    let names = match only {
        None => source.names(),
        Some(names) => {
            if let Some(missing) = names.iter().find(|name| !source.contains(name)) {
                return Err(fail(format!(
                    "{} has no nested constant {}",
                    original.describe(),
                    missing
                )));
            }
            names.clone()
        }
    };

    for name in names {
        if let Some(constant) = source.get(&name) {
            target.set(name, constant);
        }
    }
    Ok(())
}
