//! Double construction context and configuration

use std::sync::Arc;

use serde::Deserialize;

use crate::error::Result;
use crate::order::OrderGroup;

/// Verification settings shared by every double built from one context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MockConfig {
    /// Treat protected methods as respondable on null objects even when the
    /// caller did not ask to include non-public methods.
    pub relaxed_protected_visibility: bool,
}

impl MockConfig {
    /// Create the default configuration (strict visibility).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON. Missing keys take their defaults.
    ///
    /// ```
    /// use understudy::MockConfig;
    ///
    /// let config = MockConfig::from_json(r#"{ "relaxed_protected_visibility": true }"#).unwrap();
    /// assert!(config.relaxed_protected_visibility);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builder: set the protected-visibility relaxation flag.
    pub fn with_relaxed_protected_visibility(mut self, relaxed: bool) -> Self {
        self.relaxed_protected_visibility = relaxed;
        self
    }
}

/// Configuration and collaborators handed to every double constructor.
///
/// Cloning is cheap; clones share the same [`OrderGroup`].
#[derive(Debug, Clone, Default)]
pub struct MockContext {
    /// Verification settings
    pub config: MockConfig,

    /// Order-enforcement collaborator every proxy registers with
    pub order_group: Arc<OrderGroup>,
}

impl MockContext {
    /// Create a context with default settings and a fresh order group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with custom settings.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Whether protected visibility is relaxed for null-object queries.
    pub fn relaxed_protected_visibility(&self) -> bool {
        self.config.relaxed_protected_visibility
    }
}
