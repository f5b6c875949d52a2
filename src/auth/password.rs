use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Stored credential pair. The salt is kept alongside the hash so it can be
/// rotated on password change.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub hashed_password: String,
    pub salt: String,
}

pub fn hash_password(plain: &str) -> anyhow::Result<Credentials> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(Credentials {
        hashed_password: hash,
        salt: salt.as_str().to_string(),
    })
}
