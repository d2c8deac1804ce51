//! Runtime values carried by message arguments and responses

mod display;
mod impls;

pub(crate) use display::format_args_list;

use std::sync::Arc;

use crate::double::DoubleRef;

/// A dynamic value passed to, or returned from, a double.
///
/// Doubles answer messages at runtime, so arguments and responses are
/// untyped. Compound payloads are `Arc`-wrapped so cloning a response out
/// of a stub table is cheap.
#[derive(Clone)]
pub enum Value {
    /// The unit value `()`
    Unit,

    /// Boolean
    Bool(bool),

    /// 64-bit signed integer
    I64(i64),

    /// 64-bit floating point
    F64(f64),

    /// Heap-allocated string
    String(Arc<String>),

    /// Ordered list of values
    Vec(Arc<Vec<Value>>),

    /// A handle to a double (null objects answer with themselves)
    Double(DoubleRef),
}
