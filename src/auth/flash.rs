//! One-shot user notices carried across a redirect in a private cookie.

use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

pub const FLASH_COOKIE: &str = "flash";
/// Oldest messages are dropped past this many, keeping the cookie well under 4 KB.
pub const MAX_PENDING: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Danger,
    Warning,
    Info,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Danger => "danger",
            FlashLevel::Warning => "warning",
            FlashLevel::Info => "info",
        }
    }
}

impl fmt::Display for FlashLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

/// Append a message to whatever is already pending for this client.
/// A repeat of the newest pending message is not stored twice.
pub fn push(jar: PrivateCookieJar, level: FlashLevel, message: impl Into<String>) -> PrivateCookieJar {
    let mut pending = read(&jar);
    let msg = FlashMessage {
        level,
        message: message.into(),
    };
    if pending.last() == Some(&msg) {
        return jar;
    }
    pending.push(msg);
    if pending.len() > MAX_PENDING {
        pending.drain(..pending.len() - MAX_PENDING);
    }
    match serde_json::to_string(&pending) {
        Ok(value) => jar.add(build_cookie(value)),
        Err(e) => {
            warn!(error = %e, "failed to encode flash messages");
            jar
        }
    }
}

/// Drain pending messages, clearing the cookie when there were any.
pub fn take(jar: PrivateCookieJar) -> (PrivateCookieJar, Vec<FlashMessage>) {
    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, Vec::new());
    }
    let pending = read(&jar);
    (jar.remove(build_cookie(String::new())), pending)
}

fn read(jar: &PrivateCookieJar) -> Vec<FlashMessage> {
    jar.get(FLASH_COOKIE)
        .and_then(|c| serde_json::from_str(c.value()).ok())
        .unwrap_or_default()
}

fn build_cookie(value: String) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
