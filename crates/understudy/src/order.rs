//! Order group: the collaborator proxies and expectations register with
//!
//! Call counting and sequencing are enforced elsewhere; this type only
//! records who registered and in which order expectations were declared.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// An expectation declared on a double, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectationEntry {
    /// Label of the double the expectation was declared on
    pub double: String,

    /// The expected message
    pub message: String,
}

#[derive(Debug, Default)]
struct OrderState {
    proxies: Vec<String>,
    expectations: Vec<ExpectationEntry>,
}

/// Shared registry of proxies and declared expectations.
#[derive(Debug, Default)]
pub struct OrderGroup {
    state: Mutex<OrderState>,
}

impl OrderGroup {
    /// Create an empty order group.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, OrderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a proxy by the label of the double it serves.
    pub fn register_proxy(&self, double: &str) {
        self.state().proxies.push(double.to_string());
    }

    /// Record an expectation declaration.
    pub fn register_expectation(&self, double: &str, message: &str) {
        self.state().expectations.push(ExpectationEntry {
            double: double.to_string(),
            message: message.to_string(),
        });
    }

    /// Labels of every registered proxy, in registration order.
    pub fn proxies(&self) -> Vec<String> {
        self.state().proxies.clone()
    }

    /// Every declared expectation, in declaration order.
    pub fn expectations(&self) -> Vec<ExpectationEntry> {
        self.state().expectations.clone()
    }

    /// Forget everything (between tests).
    pub fn clear(&self) {
        let mut state = self.state();
        state.proxies.clear();
        state.expectations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_group_records_in_order() {
        let group = OrderGroup::new();
        group.register_proxy("Widget (instance)");
        group.register_expectation("Widget (instance)", "spin");
        group.register_expectation("Widget (instance)", "stop");

        assert_eq!(group.proxies(), vec!["Widget (instance)".to_string()]);
        let messages: Vec<_> = group
            .expectations()
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(messages, vec!["spin", "stop"]);
    }

    #[test]
    fn test_order_group_clear() {
        let group = OrderGroup::new();
        group.register_proxy("a");
        group.register_expectation("a", "b");
        group.clear();
        assert!(group.proxies().is_empty());
        assert!(group.expectations().is_empty());
    }
}
