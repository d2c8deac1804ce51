//! The verifying proxy: gatekeeper for stubs and null-object dispatch

use std::sync::Arc;

use tracing::debug;

use crate::context::MockContext;
use crate::error::{DoubleError, Result};
use crate::method_reference::{MethodReference, ReferenceApi};
use crate::order::OrderGroup;
use crate::reference::{ReferenceTarget, Visibility};

/// Validates messages against one double's reference target.
///
/// Created once per double. Construction registers the proxy with the
/// context's order group; every expectation declared later registers there
/// too.
#[derive(Debug)]
pub struct VerifyingProxy {
    double: String,
    target: ReferenceTarget,
    api: ReferenceApi,
    order_group: Arc<OrderGroup>,
    relaxed_protected_visibility: bool,
}

impl VerifyingProxy {
    /// Create a proxy for the double labelled `double`.
    pub fn new(
        double: impl Into<String>,
        target: ReferenceTarget,
        api: ReferenceApi,
        ctx: &MockContext,
    ) -> Self {
        let double = double.into();
        ctx.order_group.register_proxy(&double);
        Self {
            double,
            target,
            api,
            order_group: Arc::clone(&ctx.order_group),
            relaxed_protected_visibility: ctx.relaxed_protected_visibility(),
        }
    }

    /// The reference target messages are checked against.
    pub fn target(&self) -> &ReferenceTarget {
        &self.target
    }

    /// The API lookups resolve against.
    pub fn api(&self) -> ReferenceApi {
        self.api
    }

    /// The order group this proxy registered with.
    pub fn order_group(&self) -> &Arc<OrderGroup> {
        &self.order_group
    }

    /// Whether protected methods count as respondable on null objects.
    pub fn relaxed_protected_visibility(&self) -> bool {
        self.relaxed_protected_visibility
    }

    /// Look `message` up on the reference target (never cached).
    pub fn method_reference(&self, message: &str) -> MethodReference {
        MethodReference::lookup(self.api, &self.target, message)
    }

    /// The visibility a stub for `message` should carry.
    pub fn visibility_for(&self, message: &str) -> Visibility {
        self.method_reference(message).visibility()
    }

    /// Fail unless the target implements `message` at any visibility.
    ///
    /// Used for stub declarations and by-name dispatch.
    pub fn ensure_implemented(&self, message: &str) -> Result<()> {
        if self.method_reference(message).is_unimplemented() {
            debug!(double = %self.double, reference = self.target.description(), method = message, "unimplemented method");
            return Err(DoubleError::UnimplementedMethod {
                target: self.target.description().to_string(),
                message: message.to_string(),
            });
        }
        Ok(())
    }

    /// Fail unless the target implements `message` publicly.
    ///
    /// Used for ordinary dispatch to a null object. `double` is the label of
    /// the receiving double, reported in the error.
    pub fn ensure_publicly_implemented(&self, message: &str, double: &str) -> Result<()> {
        self.ensure_implemented(message)?;
        let visibility = self.visibility_for(message);
        if visibility.is_non_public() {
            debug!(double, reference = self.target.description(), method = message, %visibility, "non-public method");
            return Err(DoubleError::NonPublicMethod {
                target: self.target.description().to_string(),
                double: double.to_string(),
                message: message.to_string(),
                visibility,
            });
        }
        Ok(())
    }

    /// Record an expectation on `message` with the order group.
    pub fn register_expectation(&self, message: &str) {
        self.order_group.register_expectation(&self.double, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::Class;

    fn proxy(ctx: &MockContext) -> VerifyingProxy {
        let class = Class::new("Widget")
            .with_instance_method("spin", Visibility::Public)
            .with_instance_method("tune", Visibility::Protected)
            .with_instance_method("wind", Visibility::Private);
        VerifyingProxy::new(
            "Widget (instance)",
            ReferenceTarget::Class(Arc::new(class)),
            ReferenceApi::Instance,
            ctx,
        )
    }

    #[test]
    fn test_construction_registers_with_order_group() {
        let ctx = MockContext::new();
        let _proxy = proxy(&ctx);
        assert_eq!(ctx.order_group.proxies(), vec!["Widget (instance)".to_string()]);
    }

    #[test]
    fn test_ensure_implemented() {
        let ctx = MockContext::new();
        let proxy = proxy(&ctx);
        assert!(proxy.ensure_implemented("spin").is_ok());
        assert!(proxy.ensure_implemented("wind").is_ok());
        let err = proxy.ensure_implemented("levitate").unwrap_err();
        assert_eq!(err.to_string(), "Widget does not implement: levitate");
    }

    #[test]
    fn test_ensure_publicly_implemented() {
        let ctx = MockContext::new();
        let proxy = proxy(&ctx);
        assert!(proxy.ensure_publicly_implemented("spin", "d").is_ok());
        assert!(matches!(
            proxy.ensure_publicly_implemented("wind", "d"),
            Err(DoubleError::NonPublicMethod { visibility: Visibility::Private, .. })
        ));
        assert!(matches!(
            proxy.ensure_publicly_implemented("tune", "d"),
            Err(DoubleError::NonPublicMethod { visibility: Visibility::Protected, .. })
        ));
        assert!(matches!(
            proxy.ensure_publicly_implemented("levitate", "d"),
            Err(DoubleError::UnimplementedMethod { .. })
        ));
    }

    #[test]
    fn test_register_expectation_uses_double_label() {
        let ctx = MockContext::new();
        let proxy = proxy(&ctx);
        proxy.register_expectation("spin");
        let expectations = ctx.order_group.expectations();
        assert_eq!(expectations[0].double, "Widget (instance)");
        assert_eq!(expectations[0].message, "spin");
    }
}
