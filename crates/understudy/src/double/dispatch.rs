//! RAII marker for by-name dispatch

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Single slot recording which message is being dispatched by name.
///
/// Models one unnested by-name call per double: `IDLE → IN_FLIGHT(message)
/// → IDLE`. A by-name call made while another is in flight overwrites the
/// slot, and its exit leaves the slot empty for the outer call too.
///
/// # Example
///
/// ```
/// use understudy::InFlightMessage;
///
/// let slot = InFlightMessage::new();
/// {
///     let _guard = slot.enter("spin");
///     assert!(slot.is("spin"));
/// }
/// // guard dropped, slot cleared
/// assert!(slot.is_idle());
/// ```
#[derive(Debug, Default)]
pub struct InFlightMessage {
    slot: Mutex<Option<String>>,
}

impl InFlightMessage {
    /// Create an empty (idle) marker.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark `message` in flight until the returned guard is dropped.
    pub fn enter(&self, message: &str) -> InFlightGuard<'_> {
        *self.slot() = Some(message.to_string());
        InFlightGuard { marker: self }
    }

    /// The message currently in flight, if any.
    pub fn current(&self) -> Option<String> {
        self.slot().clone()
    }

    /// Check if `message` is the one in flight.
    pub fn is(&self, message: &str) -> bool {
        self.slot().as_deref() == Some(message)
    }

    /// Check if nothing is in flight.
    pub fn is_idle(&self) -> bool {
        self.slot().is_none()
    }

    fn clear(&self) {
        *self.slot() = None;
    }
}

/// Guard that clears the in-flight marker when dropped.
pub struct InFlightGuard<'a> {
    marker: &'a InFlightMessage,
}

impl<'a> Drop for InFlightGuard<'a> {
    fn drop(&mut self) {
        self.marker.clear();
    }
}
