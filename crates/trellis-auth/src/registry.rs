//! Strategy registry.
//!
//! The registry is built before any router is constructed and is read-only
//! afterwards. Passing a finalized registry into router construction (rather
//! than mutating server state) makes the "registered before build" invariant
//! a property of the types instead of a runtime ordering rule.

use crate::strategy::{AuthenticationStrategy, StrategyRef};
use std::collections::HashMap;
use std::sync::Arc;

/// A finalized name-to-strategy mapping.
///
/// # Example
///
/// ```
/// use trellis_auth::{AuthRegistry, JwtStrategy};
///
/// let registry = AuthRegistry::builder()
///     .register("jwt", JwtStrategy::new(b"secret"))
///     .build();
///
/// assert!(registry.get("jwt").is_some());
/// assert!(registry.get("saml").is_none());
/// ```
#[derive(Clone, Default)]
pub struct AuthRegistry {
    strategies: HashMap<String, StrategyRef>,
}

impl AuthRegistry {
    /// Starts building a registry.
    #[must_use]
    pub fn builder() -> AuthRegistryBuilder {
        AuthRegistryBuilder::default()
    }

    /// Creates a registry with no strategies.
    ///
    /// Suitable for servers whose controllers declare no authentication.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Looks up a strategy by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<StrategyRef> {
        self.strategies.get(name).cloned()
    }

    /// Returns whether a strategy is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Returns the registered strategy names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.strategies.keys().map(String::as_str)
    }
}

/// Builder for [`AuthRegistry`].
#[derive(Default)]
pub struct AuthRegistryBuilder {
    strategies: HashMap<String, StrategyRef>,
}

impl AuthRegistryBuilder {
    /// Registers a strategy under a name.
    ///
    /// Registering the same name twice keeps the later strategy.
    #[must_use]
    pub fn register<S: AuthenticationStrategy>(
        mut self,
        name: impl Into<String>,
        strategy: S,
    ) -> Self {
        self.strategies.insert(name.into(), Arc::new(strategy));
        self
    }

    /// Finalizes the registry.
    #[must_use]
    pub fn build(self) -> AuthRegistry {
        AuthRegistry {
            strategies: self.strategies,
        }
    }
}
