//! Verifying doubles and their dynamic-dispatch interceptor

mod dispatch;
mod variants;

pub use dispatch::{InFlightGuard, InFlightMessage};
pub use variants::{ClassDouble, ConstantReplacement, InstanceDouble, ObjectDouble};

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::constant::ConstantTable;
use crate::error::{DoubleError, Result};
use crate::proxy::VerifyingProxy;
use crate::reference::Visibility;
use crate::value::{format_args_list, Value};

/// Shared handle to any verifying double.
pub type DoubleRef = Arc<dyn VerifyingDouble>;

/// Type alias for stub response functions
pub type ResponseFn = Arc<dyn Fn(&[Value]) -> std::result::Result<Value, String> + Send + Sync>;

/// How a stub answers.
#[derive(Clone)]
pub enum Response {
    /// Return a fixed value
    Value(Value),

    /// Compute the answer from the arguments
    Call(ResponseFn),
}

impl Response {
    /// Answer with a fixed value.
    pub fn returns(value: impl Into<Value>) -> Self {
        Response::Value(value.into())
    }

    /// Answer by calling `f` with the message arguments.
    pub fn call<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        Response::Call(Arc::new(f))
    }

    fn respond(&self, message: &str, args: &[Value]) -> Result<Value> {
        match self {
            Response::Value(value) => Ok(value.clone()),
            Response::Call(f) => f(args).map_err(|reason| DoubleError::Handler {
                message: message.to_string(),
                reason,
            }),
        }
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Value(value) => write!(f, "Response::Value({:?})", value),
            Response::Call(_) => write!(f, "Response::Call(..)"),
        }
    }
}

impl From<Value> for Response {
    fn from(value: Value) -> Self {
        Response::Value(value)
    }
}

/// An explicit handler for one message.
#[derive(Debug, Clone)]
pub struct Stub {
    /// How the stub answers
    pub response: Response,

    /// Visibility of the method the stub replaces
    pub visibility: Visibility,
}

// ═══════════════════════════════════════════════════════════════════════
// Base double state
// ═══════════════════════════════════════════════════════════════════════

/// State every double carries: label, null-object flag and stub table.
pub struct TestDouble {
    label: String,
    null_object: AtomicBool,
    stubs: RwLock<IndexMap<String, Stub>>,
    this: Weak<dyn VerifyingDouble>,
}

impl TestDouble {
    /// Create base state for a double. `this` points back at the owning
    /// double so null objects can answer with themselves.
    pub fn new(label: impl Into<String>, this: Weak<dyn VerifyingDouble>) -> Self {
        Self {
            label: label.into(),
            null_object: AtomicBool::new(false),
            stubs: RwLock::new(IndexMap::new()),
            this,
        }
    }

    /// The double's label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Check if the double is a null object.
    pub fn is_null_object(&self) -> bool {
        self.null_object.load(Ordering::Relaxed)
    }

    /// Turn null-object behavior on or off.
    pub fn set_null_object(&self, null_object: bool) {
        self.null_object.store(null_object, Ordering::Relaxed);
    }

    /// The stub for `message`, if one was declared.
    pub fn stub_for(&self, message: &str) -> Option<Stub> {
        self.stubs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(message)
            .cloned()
    }

    /// Check if a stub exists for `message`.
    pub fn has_stub(&self, message: &str) -> bool {
        self.stub_for(message).is_some()
    }

    /// Messages with a declared stub, in declaration order.
    pub fn stubbed_messages(&self) -> Vec<String> {
        self.stubs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Store a stub, replacing any earlier one for the same message.
    pub fn insert_stub(&self, message: impl Into<String>, stub: Stub) {
        self.stubs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(message.into(), stub);
    }

    /// Drop every stub.
    pub fn reset(&self) {
        self.stubs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// A handle to the owning double, while it is alive.
    pub fn handle(&self) -> Option<DoubleRef> {
        self.this.upgrade()
    }

    /// The synthesized answer of a null object: the double itself.
    pub fn null_response(&self) -> Value {
        self.handle().map(Value::Double).unwrap_or(Value::Unit)
    }

    /// The default failure for a message with no handler.
    pub fn unexpected_message(&self, message: &str, args: &[Value]) -> DoubleError {
        DoubleError::UnexpectedMessage {
            double: self.label.clone(),
            message: message.to_string(),
            args: format_args_list(args),
        }
    }
}

impl fmt::Debug for TestDouble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestDouble")
            .field("label", &self.label)
            .field("null_object", &self.is_null_object())
            .field("stubs", &self.stubbed_messages())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// The verifying capability
// ═══════════════════════════════════════════════════════════════════════

/// A double whose stubs and messages are checked against a reference target.
///
/// Implementors provide the three pieces of state; the dispatch logic is
/// shared through the provided methods:
///
/// - [`stub`](Self::stub) / [`expect`](Self::expect) validate eagerly
/// - [`receive`](Self::receive) is ordinary dispatch, [`send`](Self::send)
///   dispatch by explicit name
/// - [`unhandled_message`](Self::unhandled_message) runs only when no stub
///   exists, and is where null objects are validated lazily
pub trait VerifyingDouble: Send + Sync {
    /// Base double state
    fn test_double(&self) -> &TestDouble;

    /// The proxy validating this double
    fn proxy(&self) -> &VerifyingProxy;

    /// The single-slot by-name marker
    fn in_flight(&self) -> &InFlightMessage;

    /// Nested constants, for doubles that present as a class or module.
    fn nested_constants(&self) -> Option<&ConstantTable> {
        None
    }

    /// The double's label
    fn label(&self) -> &str {
        self.test_double().label()
    }

    /// Check if the double is a null object.
    fn is_null_object(&self) -> bool {
        self.test_double().is_null_object()
    }

    /// Make the double answer every valid message it has no stub for.
    fn as_null_object(&self) {
        self.test_double().set_null_object(true);
    }

    /// Declare a stub. Fails at once if the target does not implement
    /// `message`; the stub keeps the visibility of the method it replaces.
    fn stub(&self, message: &str, response: Response) -> Result<()> {
        let proxy = self.proxy();
        proxy.ensure_implemented(message)?;
        let visibility = proxy.visibility_for(message);
        debug!(double = self.label(), method = message, %visibility, "stub declared");
        self.test_double()
            .insert_stub(message, Stub { response, visibility });
        Ok(())
    }

    /// Declare an expectation: a validated stub also recorded with the
    /// order group.
    fn expect(&self, message: &str, response: Response) -> Result<()> {
        self.stub(message, response)?;
        self.proxy().register_expectation(message);
        Ok(())
    }

    /// Would this double answer `message`?
    ///
    /// Non-null doubles answer their stubs only. Null objects answer
    /// anything the target does not prove unanswerable: unimplemented and
    /// public methods yes, private only when `include_non_public`, protected
    /// also when protected visibility is relaxed.
    fn respond_to(&self, message: &str, include_non_public: bool) -> bool {
        if !self.is_null_object() {
            return self
                .test_double()
                .stub_for(message)
                .is_some_and(|stub| include_non_public || !stub.visibility.is_non_public());
        }

        match self.proxy().method_reference(message).visibility() {
            Visibility::Public | Visibility::Unimplemented => true,
            Visibility::Private => include_non_public,
            Visibility::Protected => {
                include_non_public || self.proxy().relaxed_protected_visibility()
            }
        }
    }

    /// Ordinary dispatch.
    fn receive(&self, message: &str, args: &[Value]) -> Result<Value> {
        let Some(stub) = self.test_double().stub_for(message) else {
            return self.unhandled_message(message, args);
        };
        if stub.visibility.is_non_public() && !self.in_flight().is(message) {
            return Err(DoubleError::NonPublicMethod {
                target: self.proxy().target().description().to_string(),
                double: self.label().to_string(),
                message: message.to_string(),
                visibility: stub.visibility,
            });
        }
        stub.response.respond(message, args)
    }

    /// Reached only when no stub exists for `message`.
    ///
    /// Non-null doubles fail with `UnexpectedMessage`. Null objects require
    /// an implementation when the message is the one in flight by name, a
    /// public implementation otherwise, and then answer with themselves.
    fn unhandled_message(&self, message: &str, args: &[Value]) -> Result<Value> {
        let double = self.test_double();
        if !double.is_null_object() {
            return Err(double.unexpected_message(message, args));
        }

        if self.in_flight().is(message) {
            self.proxy().ensure_implemented(message)?;
        } else {
            self.proxy()
                .ensure_publicly_implemented(message, double.label())?;
        }
        trace!(double = double.label(), method = message, "null object answering");
        Ok(double.null_response())
    }

    /// Dispatch by explicit name. Non-public methods are reachable this way.
    ///
    /// The message is marked in flight for the duration of the call and the
    /// marker is cleared on every exit path.
    fn send(&self, message: &str, args: &[Value]) -> Result<Value> {
        let _guard = self.in_flight().enter(message);
        self.receive(message, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_value_and_call() {
        let fixed = Response::returns(3i64);
        assert_eq!(fixed.respond("m", &[]).unwrap(), Value::I64(3));

        let summed = Response::call(|args| {
            let total: i64 = args.iter().filter_map(Value::as_i64).sum();
            Ok(Value::I64(total))
        });
        assert_eq!(
            summed.respond("m", &[Value::I64(2), Value::I64(5)]).unwrap(),
            Value::I64(7)
        );
    }

    #[test]
    fn test_response_failure_names_message() {
        let failing = Response::call(|_| Err("boom".to_string()));
        let err = failing.respond("spin", &[]).unwrap_err();
        assert_eq!(err.to_string(), "stub for `spin` failed: boom");
    }
}
