use axum_extra::extract::cookie::Key;
use base64::Engine;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::error::AppError;

const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "ROSTER_";

/// Runtime configuration.
///
/// Sources, lowest precedence first:
/// - compiled defaults
/// - `config.toml` in the working directory (optional)
/// - `ROSTER_*` environment variables, nested with `__` (e.g. `ROSTER_BASIC__LISTEN_ADDR`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub basic: BasicConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub password: PasswordConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub database_url: String,
    pub loglevel: String,
    /// Base64 of at least 64 bytes used to encrypt cookies.
    pub cookie_key: Option<String>,
    pub secure_cookie: bool,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:5005".to_string(),
            database_url: "sqlite:students.db".to_string(),
            loglevel: "info".to_string(),
            cookie_key: None,
            secure_cookie: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub idle_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 1800,
        }
    }
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Resolve the cookie encryption key.
    ///
    /// Falls back to a random key when none is configured, which invalidates
    /// every session on restart.
    pub fn cookie_key(&self) -> Result<Key, AppError> {
        let Some(encoded) = self.basic.cookie_key.as_deref() else {
            warn!("no cookie_key configured; generated an ephemeral key");
            return Ok(Key::generate());
        };
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| AppError::Config(format!("cookie_key is not valid base64: {e}")))?;
        Key::try_from(bytes.as_slice())
            .map_err(|_| AppError::Config("cookie_key must decode to at least 64 bytes".into()))
    }
}
