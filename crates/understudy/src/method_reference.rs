//! Method references: does the reference target implement a message, and how?

use tracing::trace;

use crate::reference::{ReferenceTarget, Visibility};

/// Which API of a reference target a lookup resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceApi {
    /// Would an *instance* of the target class respond to the message?
    ///
    /// For an object target, the object's class is used.
    Instance,

    /// Does this exact object or class respond to the message?
    ///
    /// Objects: singleton methods, then the class's instance API.
    /// Classes: associated methods through the ancestor chain.
    Own,
}

/// Result of looking a message up on a reference target.
///
/// References are computed fresh on every query and never cached, so they
/// always reflect the target's method tables at the time of the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodReference {
    name: String,
    api: ReferenceApi,
    visibility: Visibility,
}

impl MethodReference {
    /// Look `name` up on `target` through the given API. Never fails.
    pub fn lookup(api: ReferenceApi, target: &ReferenceTarget, name: &str) -> Self {
        let found = match (api, target) {
            (ReferenceApi::Instance, ReferenceTarget::Class(class)) => {
                class.find_instance_method(name)
            }
            (ReferenceApi::Instance, ReferenceTarget::Object(object)) => {
                object.class().find_instance_method(name)
            }
            (ReferenceApi::Own, ReferenceTarget::Class(class)) => class.find_own_method(name),
            (ReferenceApi::Own, ReferenceTarget::Object(object)) => object.find_method(name),
        };
        let visibility = found.unwrap_or(Visibility::Unimplemented);
        trace!(reference = target.description(), ?api, method = name, %visibility, "method lookup");
        Self {
            name: name.to_string(),
            api,
            visibility,
        }
    }

    /// Instance-API lookup.
    pub fn instance(target: &ReferenceTarget, name: &str) -> Self {
        Self::lookup(ReferenceApi::Instance, target, name)
    }

    /// Own-API lookup.
    pub fn own(target: &ReferenceTarget, name: &str) -> Self {
        Self::lookup(ReferenceApi::Own, target, name)
    }

    /// The message that was looked up.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The API the lookup resolved against.
    pub fn api(&self) -> ReferenceApi {
        self.api
    }

    /// Visibility of the implementation, or `Unimplemented`.
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Check if the target implements the message at any visibility.
    pub fn is_implemented(&self) -> bool {
        self.visibility.is_implemented()
    }

    /// Check if the target does not implement the message.
    pub fn is_unimplemented(&self) -> bool {
        !self.is_implemented()
    }
}
