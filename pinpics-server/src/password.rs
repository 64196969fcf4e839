use anyhow::{Context, Result};

/// Hash a plaintext password with bcrypt at the given cost
pub fn hash_password(plaintext: &str, cost: u32) -> Result<String> {
    bcrypt::hash(plaintext, cost).context("Failed to hash password")
}

/// Check a plaintext password against a stored bcrypt hash
///
/// Malformed hashes count as a mismatch.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    bcrypt::verify(plaintext, hash).unwrap_or(false)
}

/// Hash on the blocking pool so request handlers don't stall the runtime
pub async fn hash_password_blocking(plaintext: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plaintext, cost))
        .await
        .context("Password hashing task panicked")?
}

pub async fn verify_password_blocking(plaintext: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&plaintext, &hash))
        .await
        .context("Password verification task panicked")
}
