//! Argon2id password hashing for stored users.
//!
//! Hashes are PHC strings, so the algorithm parameters and salt travel with
//! the hash itself.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;

use crate::errors::{PokedexError, PokedexResult};

/// Hash a plaintext password with a random salt.
pub fn hash_password(password: &str) -> PokedexResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PokedexError::PasswordHash(e.to_string()))
}
