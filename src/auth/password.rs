use crate::error::AppError;
use actix_web::web;
use bcrypt::{hash, verify};

/// bcrypt work factor. High enough to resist offline brute force, low
/// enough to keep interactive login latency acceptable.
const HASH_COST: u32 = 12;

/// Hashes a password with a per-call salt.
///
/// bcrypt is CPU-bound (tens of milliseconds at this cost), so the work is
/// offloaded to the blocking thread pool rather than run on an HTTP worker.
pub async fn hash_password(password: String) -> Result<String, AppError> {
    web::block(move || hash(password, HASH_COST))
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
        .map_err(AppError::from)
}

/// Verifies a plaintext candidate against a stored digest, using the salt
/// embedded in the digest. A malformed digest is an internal error, not a
/// failed verification.
pub async fn verify_password(password: String, hashed_password: String) -> Result<bool, AppError> {
    web::block(move || verify(password, &hashed_password))
        .await
        .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))?
        .map_err(AppError::from)
}
