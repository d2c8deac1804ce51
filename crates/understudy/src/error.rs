//! Error types for verifying doubles

use thiserror::Error;

use crate::reference::Visibility;

/// Main error type for double declaration and dispatch.
#[derive(Error, Debug)]
pub enum DoubleError {
    /// No method of that name exists on the reference target.
    #[error("{target} does not implement: {message}")]
    UnimplementedMethod {
        /// Description of the reference target
        target: String,
        /// The message that was stubbed or received
        message: String,
    },

    /// The method exists on the reference target but is not public.
    #[error("{visibility} method `{message}` called on {double} (verified against {target})")]
    NonPublicMethod {
        /// Description of the reference target
        target: String,
        /// Label of the double that received the message
        double: String,
        /// The message that was received
        message: String,
        /// The actual visibility of the method on the target
        visibility: Visibility,
    },

    /// A non-null double received a message it has no stub for.
    #[error("{double} received unexpected message `{message}` with ({args})")]
    UnexpectedMessage {
        /// Label of the double
        double: String,
        /// The message that was received
        message: String,
        /// Rendered argument list
        args: String,
    },

    /// A stub's response function reported a failure.
    #[error("stub for `{message}` failed: {reason}")]
    Handler {
        /// The stubbed message
        message: String,
        /// Failure reported by the response function
        reason: String,
    },

    /// A constant path did not resolve.
    #[error("uninitialized constant {path}")]
    UndefinedConstant {
        /// The full constant path
        path: String,
    },

    /// The reference target has no constant name to rebind.
    #[error("cannot stub a constant for {target}: it has no constant name")]
    NoConstantToReplace {
        /// Description of the reference target
        target: String,
    },

    /// Nested constants could not be transferred to the replacement.
    #[error("cannot transfer nested constants for {path}: {reason}")]
    CannotTransferNestedConstants {
        /// The constant path being stubbed
        path: String,
        /// Why the transfer is impossible
        reason: String,
    },

    /// Rust source handed to the reflection layer did not parse.
    #[error("failed to parse reference source: {0}")]
    Parse(#[from] syn::Error),

    /// Configuration could not be deserialized.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl DoubleError {
    /// Whether this error reports a verification failure against the
    /// reference target (as opposed to a setup or configuration problem).
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            DoubleError::UnimplementedMethod { .. } | DoubleError::NonPublicMethod { .. }
        )
    }
}

/// Result type alias for double operations
pub type Result<T> = std::result::Result<T, DoubleError>;
