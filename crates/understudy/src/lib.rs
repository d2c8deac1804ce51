//! # Understudy
//!
//! Verifying test doubles.
//!
//! A double stands in for a real class, instance or object during a test.
//! A *verifying* double additionally checks every stub, expectation and
//! received message against the API of the thing it stands in for, so a
//! renamed or misspelled method fails the test instead of silently passing.
//!
//! ## Architecture
//!
//! - **Reference model**: classes, modules and objects with method tables
//!   (built by hand or reflected from Rust source)
//! - **Method references**: per-query lookups against the instance API or
//!   the own API of a reference target
//! - **Verifying proxy**: validates stub declarations eagerly and null-object
//!   dispatch lazily
//! - **Doubles**: instance, object and class doubles sharing one dispatch
//!   interceptor
//! - **Constants**: a namespace doubles can be swapped into for a scope
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use understudy::*;
//!
//! let widget = Arc::new(Class::new("Widget").with_instance_method("spin", Visibility::Public));
//! let ctx = MockContext::new();
//! let double = InstanceDouble::new(widget, &ctx);
//!
//! double.stub("spin", Response::returns(3i64)).unwrap();
//! assert_eq!(double.receive("spin", &[]).unwrap(), Value::I64(3));
//!
//! // Typos are caught when the stub is declared
//! assert!(double.stub("spinn", Response::returns(())).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constant;
pub mod context;
pub mod double;
pub mod error;
pub mod method_reference;
pub mod order;
pub mod proxy;
pub mod reference;
pub mod value;

// Re-export main types
pub use constant::{
    Constant, ConstantRegistry, ConstantStub, ConstantTable, StubOptions, TransferNested,
};
pub use context::{MockConfig, MockContext};
pub use double::{
    ClassDouble, ConstantReplacement, DoubleRef, InFlightGuard, InFlightMessage, InstanceDouble,
    ObjectDouble, Response, ResponseFn, Stub, TestDouble, VerifyingDouble,
};
pub use error::{DoubleError, Result};
pub use method_reference::{MethodReference, ReferenceApi};
pub use order::{ExpectationEntry, OrderGroup};
pub use proxy::VerifyingProxy;
pub use reference::{Class, ClassKind, MethodTable, Object, ReferenceTarget, Visibility};
pub use value::Value;

/// Understudy version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
