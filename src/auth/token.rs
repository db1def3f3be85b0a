use crate::error::AppError;
use crate::models::user::{Role, User};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token lifetime. Sessions are exactly as long as the token; there is no
/// server-side session table and no revocation before expiry.
const TOKEN_LIFETIME_SECS: i64 = 60 * 60;

/// Represents the claims encoded within a session JWT.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's unique identifier.
    pub sub: Uuid,
    /// Role claim, checked by the admin gate.
    pub role: Role,
    /// Email claim, informational.
    pub email: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Signs a session token for the given user.
///
/// The token binds the user's id, role, and email and expires in one hour.
/// It requires the `JWT_SECRET` environment variable to be set for signing.
///
/// # Returns
/// A `Result` containing the JWT string if successful.
/// Returns `AppError::Internal` if `JWT_SECRET` is not set or if encoding fails.
pub fn generate_token(user: &User) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let expiration = now
        .checked_add_signed(chrono::Duration::seconds(TOKEN_LIFETIME_SECS))
        .ok_or_else(|| AppError::Internal("Token expiry out of range".into()))?;

    let claims = Claims {
        sub: user.id,
        role: user.role,
        email: user.email.clone(),
        iat: now.timestamp() as usize,
        exp: expiration.timestamp() as usize,
    };

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal("JWT_SECRET not set".into()))?;

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
}

/// Verifies a session token and decodes its claims.
///
/// Checks the signature and expiry only; no store access. A malformed,
/// tampered, or expired token is an authentication failure.
pub fn verify_token(token: &str) -> Result<Claims, AppError> {
    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal("JWT_SECRET not set".into()))?;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Authentication(format!("Invalid token: {}", e)))
}
