/// Bearer token signing and verification
///
/// Tokens are JWTs signed with HS256 and carry identity only: the user id
/// (`sub`), the issuer, and the issue time. They deliberately have **no
/// expiry claim**: a token stays valid until its session row is deleted,
/// so revocation is a server-side set-membership check, not a signature
/// property. See [`crate::auth::session`].
///
/// # Example
///
/// ```
/// use taskhub_shared::auth::jwt::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let token = create_token(&Claims::new(user_id), "secret-at-least-32-bytes-long!!")?;
/// let claims = validate_token(&token, "secret-at-least-32-bytes-long!!")?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim stamped into every token
const ISSUER: &str = "taskhub";

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),
}

/// JWT claims
///
/// Identity only: validity over time is decided by the sessions table,
/// not by the token itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: Uuid,

    /// Issuer - always "taskhub"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// Creates claims for a user
    pub fn new(user_id: Uuid) -> Self {
        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: Utc::now().timestamp(),
        }
    }
}

/// Signs a token for the given claims with HS256
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Verifies a token's signature and issuer, returning its claims
///
/// Expiry is intentionally not validated; these tokens carry no `exp`
/// claim. Callers must still check session membership before trusting
/// the identity.
///
/// # Errors
///
/// Returns `JwtError::ValidationError` if the signature or issuer is invalid
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();
    validation.set_issuer(&[ISSUER]);

    let token_data = decode::<Claims>(token, &key, &validation)
        .map_err(|e| JwtError::ValidationError(format!("Token validation failed: {}", e)))?;

    Ok(token_data.claims)
}
