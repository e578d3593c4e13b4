use crate::error::{AppError, Result};
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

/// Argon2id v19, m = 19 MiB, t = 2, p = 1.
fn hasher() -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::DEFAULT)
}

/// Hash of random bytes nobody knows. Lookups that miss verify against it
/// so they cost the same as a wrong password.
static DECOY_HASH: Lazy<Option<String>> = Lazy::new(|| {
    let mut filler = Zeroizing::new([0u8; 32]);
    OsRng.fill_bytes(&mut filler[..]);
    hash_bytes(&filler[..]).ok()
});

fn hash_bytes(secret: &[u8]) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    hasher()
        .hash_password(secret, &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| AppError::Internal(format!("Argon2 hash error: {}", e)))
}

/// Hashes a password into a PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String> {
    hash_bytes(password.as_bytes())
}

/// Checks a password against a stored PHC string.
///
/// Cost parameters come from the string itself. A mismatch is `Ok(false)`;
/// a hash that cannot be parsed is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Hash parse error: {}", e)))?;

    match hasher().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(format!("Argon2 verify error: {}", e))),
    }
}

/// Runs a full verification against the decoy hash. Never matches.
pub fn verify_decoy(password: &str) -> Result<bool> {
    let hash = DECOY_HASH
        .as_deref()
        .ok_or_else(|| AppError::Internal("Decoy hash unavailable".to_string()))?;
    verify_password(password, hash)
}
