// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password hashing and verification (Argon2id, PHC strings).
//!
//! A mismatch is an ordinary `Ok(false)`. Only a hash that cannot be parsed
//! or evaluated is an error, so callers can tell a wrong password (401)
//! from a corrupted credential (500).

use crate::error::{AppError, Result};
use argon2::password_hash::{
    Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use ring::rand::{SecureRandom, SystemRandom};

const SALT_LEN: usize = 16;

/// A well-formed hash with the default Argon2 parameters that no password
/// matches. Logins for unknown users verify against it so they cost the
/// same as a wrong password.
pub const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$cGFydGl1LWZpdC1kdW1teQ$XmAXAnQ35ZXscq3uBxjXjwks3aqNMQSMnVui7WR97V4";

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(plaintext: &str) -> Result<String> {
    let mut salt_bytes = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt_bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System entropy source failed")))?;

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Salt encoding failed: {}", e)))?;

    let hash = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Check `plaintext` against a stored PHC hash.
pub fn verify_password(hash: &str, plaintext: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Malformed password hash: {}", e)))?;

    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(anyhow::anyhow!(
            "Password verification failed: {}",
            e
        ))),
    }
}

/// [`hash_password`] on the blocking pool, keeping request workers free.
pub async fn spawn_hash(plaintext: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plaintext))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Hashing task failed: {}", e)))?
}

/// [`verify_password`] on the blocking pool.
pub async fn spawn_verify(hash: String, plaintext: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&hash, &plaintext))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Verification task failed: {}", e)))?
}
