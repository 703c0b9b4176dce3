use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
        rand_core::{OsRng, RngCore},
    },
};

use std::sync::Arc;

use crate::config::PasswordConfig;
use crate::error::AppError;

/// Argon2id hashing with configurable cost. Work runs on the blocking pool.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Hash of a random secret with the configured cost; verified against
    /// when the username is unknown so both failure paths cost the same.
    decoy: Arc<str>,
}

impl PasswordHasher {
    pub fn new(cfg: &PasswordConfig) -> Result<Self, AppError> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| AppError::Config(format!("invalid argon2 parameters: {e}")))?;
        let mut secret = [0u8; 32];
        OsRng.fill_bytes(&mut secret);
        let salt = SaltString::generate(&mut OsRng);
        let decoy = Self::argon2(params.clone())
            .hash_password(&secret, &salt)
            .map_err(|e| AppError::PasswordHash(e.to_string()))?
            .to_string();
        Ok(Self {
            params,
            decoy: decoy.into(),
        })
    }

    fn argon2(params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }

    /// Hash `password` into a salted PHC string.
    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_owned();
        let params = self.params.clone();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Self::argon2(params)
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| AppError::PasswordHash(e.to_string()))
        })
        .await
        .map_err(|e| AppError::PasswordHash(format!("hashing task failed: {e}")))?
    }

    /// Check `password` against a stored PHC string. A hash that cannot be
    /// parsed never verifies.
    pub async fn verify(&self, password: &str, stored: &str) -> Result<bool, AppError> {
        let password = password.to_owned();
        let stored = stored.to_owned();
        let params = self.params.clone();
        tokio::task::spawn_blocking(move || {
            let Ok(parsed) = PasswordHash::new(&stored) else {
                return false;
            };
            Self::argon2(params)
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .await
        .map_err(|e| AppError::PasswordHash(format!("verification task failed: {e}")))
    }

    /// Spend one verification on the decoy hash. Always fails.
    pub async fn verify_unknown_user(&self, password: &str) -> Result<bool, AppError> {
        let decoy = Arc::clone(&self.decoy);
        self.verify(password, &decoy).await?;
        Ok(false)
    }
}
