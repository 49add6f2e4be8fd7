//! HS256 JWT strategy.

use crate::strategy::AuthenticationStrategy;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use trellis_core::{AuthError, BoxFuture, Credentials};

/// An [`AuthenticationStrategy`] signing and verifying HS256 tokens.
///
/// Tokens carry the [`Credentials`] as claims; extra claims survive the
/// round trip via the credentials' claim map. Expiry is not enforced here —
/// deployments that need it put an `exp` claim in the credentials and check
/// it in a custom `verify_credentials`.
///
/// # Example
///
/// ```
/// use trellis_auth::{AuthenticationStrategy, JwtStrategy};
/// use trellis_core::Credentials;
///
/// # tokio_test::block_on(async {
/// let strategy = JwtStrategy::new(b"secret");
/// let token = strategy
///     .generate_token(Credentials::new("u1", "a@b.c").with_role("admin"))
///     .await
///     .unwrap();
///
/// let verified = strategy.verify_token(token).await.unwrap();
/// assert_eq!(verified.role.as_deref(), Some("admin"));
/// # });
/// ```
pub struct JwtStrategy {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtStrategy {
    /// Creates a strategy from shared secret material.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Credentials are free-form claims; registered-claim checks are the
        // caller's concern.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl AuthenticationStrategy for JwtStrategy {
    fn generate_token(
        &self,
        credentials: Credentials,
    ) -> BoxFuture<'static, Result<String, AuthError>> {
        let result = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &credentials, &self.encoding)
            .map_err(|err| AuthError::Rejected(format!("failed to sign token: {err}")));
        Box::pin(async move { result })
    }

    fn verify_token(&self, token: String) -> BoxFuture<'static, Result<Credentials, AuthError>> {
        let result = jsonwebtoken::decode::<Credentials>(&token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| AuthError::InvalidToken(err.to_string()));
        Box::pin(async move { result })
    }
}
