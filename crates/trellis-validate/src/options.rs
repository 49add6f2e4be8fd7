//! Validation configuration.

/// Options controlling how a payload is transformed and validated.
///
/// When a caller supplies no options the strict configuration applies:
/// undeclared fields are stripped *and* reported, and payloads of an
/// unrecognized shape are rejected outright.
///
/// # Example
///
/// ```
/// use trellis_validate::ValidationOptions;
///
/// // Strip undeclared fields without reporting them.
/// let options = ValidationOptions::permissive().with_whitelist(true);
/// assert!(options.whitelist);
/// assert!(!options.forbid_non_whitelisted);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Strip fields the schema does not declare.
    pub whitelist: bool,
    /// Report an error for each field the schema does not declare.
    pub forbid_non_whitelisted: bool,
    /// Reject payloads whose shape the schema cannot recognize at all.
    pub forbid_unknown_values: bool,
}

impl ValidationOptions {
    /// The strict configuration: all three flags on.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            whitelist: true,
            forbid_non_whitelisted: true,
            forbid_unknown_values: true,
        }
    }

    /// The permissive configuration: all three flags off.
    #[must_use]
    pub const fn permissive() -> Self {
        Self {
            whitelist: false,
            forbid_non_whitelisted: false,
            forbid_unknown_values: false,
        }
    }

    /// Sets the whitelist flag.
    #[must_use]
    pub const fn with_whitelist(mut self, on: bool) -> Self {
        self.whitelist = on;
        self
    }

    /// Sets the forbid-non-whitelisted flag.
    #[must_use]
    pub const fn with_forbid_non_whitelisted(mut self, on: bool) -> Self {
        self.forbid_non_whitelisted = on;
        self
    }

    /// Sets the forbid-unknown-values flag.
    #[must_use]
    pub const fn with_forbid_unknown_values(mut self, on: bool) -> Self {
        self.forbid_unknown_values = on;
        self
    }
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self::strict()
    }
}
