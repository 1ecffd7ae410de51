//! Password hashing with Argon2.
//!
//! Passwords are stored only as salted Argon2 hashes in the PHC string
//! format; verification parses the stored string, so parameters can evolve
//! without invalidating existing hashes.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};

/// Hash a raw password with a freshly generated salt.
pub fn hash_password(raw: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(raw.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| format!("Failed to hash password: {}", e))
}

/// Check a raw password against a stored PHC hash string.
///
/// An unparseable stored hash counts as a mismatch rather than an error;
/// login treats both the same way.
pub fn verify_password(raw: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(raw.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
