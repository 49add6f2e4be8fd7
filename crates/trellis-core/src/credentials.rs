//! Verified caller credentials.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Credentials attached to the request context by an authentication stage.
///
/// A strategy's `verify_token` produces these from the token claims, and
/// `verify_credentials` checks them against the roles a route requires.
/// Whatever the strategy attaches is what the `auth-user` parameter source
/// injects into handlers, so extra claims (issuer, expiry, tenant, ...)
/// are carried through verbatim.
///
/// # Example
///
/// ```
/// use trellis_core::Credentials;
///
/// let creds = Credentials::new("user-1", "alice@example.com").with_role("admin");
/// assert_eq!(creds.role.as_deref(), Some("admin"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// Stable caller identifier.
    pub id: String,
    /// Caller email address.
    pub email: String,
    /// Role used for required-role checks, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Additional claims carried through from the token.
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

impl Credentials {
    /// Creates credentials with an id and email and no role.
    #[must_use]
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role: None,
            claims: Map::new(),
        }
    }

    /// Sets the caller role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Adds an extra claim.
    #[must_use]
    pub fn with_claim(mut self, name: impl Into<String>, value: Value) -> Self {
        self.claims.insert(name.into(), value);
        self
    }

    /// Serializes the credentials to the JSON value injected for the
    /// auth-user parameter source.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
