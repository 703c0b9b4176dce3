use argon2::password_hash::rand_core::{OsRng, RngCore};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use base64::Engine;
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, info};

use crate::db::SessionStore;
use crate::db::models::{User, UserId};
use crate::error::AppError;

pub const SESSION_COOKIE: &str = "session";
const TOKEN_BYTES: usize = 32;

/// Identity resolved for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
}

/// Binds a private session cookie to a row in the session store and
/// enforces the sliding idle timeout.
#[derive(Clone)]
pub struct SessionManager {
    store: SessionStore,
    idle_timeout: Duration,
    secure_cookie: bool,
}

impl SessionManager {
    pub fn new(store: SessionStore, idle_timeout: Duration, secure_cookie: bool) -> Self {
        Self {
            store,
            idle_timeout,
            secure_cookie,
        }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &SessionStore {
        &self.store
    }

    fn idle_secs(&self) -> i64 {
        i64::try_from(self.idle_timeout.as_secs()).unwrap_or(i64::MAX)
    }

    fn cutoff(&self, now: i64) -> i64 {
        now.saturating_sub(self.idle_secs())
    }

    /// Start a session for `user`, replacing any cookie the client still holds.
    pub async fn establish(
        &self,
        jar: PrivateCookieJar,
        user: &User,
    ) -> Result<PrivateCookieJar, AppError> {
        let now = Utc::now().timestamp();
        let purged = self.store.purge_expired(self.cutoff(now)).await?;
        if purged > 0 {
            debug!(purged, "purged idle sessions");
        }

        if let Some(stale) = jar.get(SESSION_COOKIE) {
            self.store.delete(stale.value()).await?;
        }

        let token = new_token();
        self.store
            .insert(&token, user.id, &user.username, now)
            .await?;
        info!(user_id = user.id, username = %user.username, "session established");
        Ok(jar.add(self.session_cookie(token)))
    }

    /// Resolve the identity bound to this request, renewing its idle window.
    /// Unknown or expired tokens yield `None` and the cookie is cleared.
    pub async fn current_user(
        &self,
        jar: PrivateCookieJar,
    ) -> Result<(PrivateCookieJar, Option<CurrentUser>), AppError> {
        let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) else {
            return Ok((jar, None));
        };

        let now = Utc::now().timestamp();
        match self.store.touch(&token, now, self.cutoff(now)).await? {
            Some(rec) => {
                let user = CurrentUser {
                    id: rec.user_id,
                    username: rec.username,
                };
                Ok((jar.add(self.session_cookie(token)), Some(user)))
            }
            None => {
                if self.store.delete(&token).await? > 0 {
                    info!("session expired after idle timeout");
                }
                Ok((jar.remove(clear_cookie()), None))
            }
        }
    }

    /// Invalidate the server-side session and tell the client to drop its cookie.
    pub async fn destroy(&self, jar: PrivateCookieJar) -> Result<PrivateCookieJar, AppError> {
        if let Some(cookie) = jar.get(SESSION_COOKIE) {
            self.store.delete(cookie.value()).await?;
        }
        Ok(jar.remove(clear_cookie()))
    }

    fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
            .max_age(time::Duration::seconds(self.idle_secs()))
            .build()
    }
}

fn new_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn clear_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CredentialStore, memory_pool};
    use axum_extra::extract::cookie::Key;

    async fn setup(idle: Duration) -> (SessionManager, User) {
        let pool = memory_pool().await;
        let creds = CredentialStore::new(pool.clone());
        let id = creds.create("alice", "hash").await.unwrap();
        let user = creds.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        (
            SessionManager::new(SessionStore::new(pool), idle, false),
            user,
        )
    }

    #[tokio::test]
    async fn establish_then_resolve() {
        let (mgr, user) = setup(Duration::from_secs(1800)).await;
        let jar = mgr
            .establish(PrivateCookieJar::new(Key::generate()), &user)
            .await
            .unwrap();

        let cookie = jar.get(SESSION_COOKIE).unwrap();
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(1800)));

        let (_, current) = mgr.current_user(jar).await.unwrap();
        assert_eq!(
            current,
            Some(CurrentUser {
                id: user.id,
                username: "alice".into()
            })
        );
    }

    #[tokio::test]
    async fn destroy_invalidates_token() {
        let (mgr, user) = setup(Duration::from_secs(1800)).await;
        let jar = mgr
            .establish(PrivateCookieJar::new(Key::generate()), &user)
            .await
            .unwrap();
        let token = jar.get(SESSION_COOKIE).unwrap().value().to_owned();
        let replay = jar.clone();

        let jar = mgr.destroy(jar).await.unwrap();
        assert!(jar.get(SESSION_COOKIE).is_none());
        assert!(mgr.store().get(&token).await.unwrap().is_none());

        let (_, current) = mgr.current_user(replay).await.unwrap();
        assert!(current.is_none());
    }

    #[tokio::test]
    async fn idle_expired_session_is_absent_and_removed() {
        let (mgr, user) = setup(Duration::from_secs(1800)).await;
        let jar = mgr
            .establish(PrivateCookieJar::new(Key::generate()), &user)
            .await
            .unwrap();
        let token = jar.get(SESSION_COOKIE).unwrap().value().to_owned();

        // age the row past the idle window
        let stale = Utc::now().timestamp() - 1801;
        mgr.store().delete(&token).await.unwrap();
        mgr.store()
            .insert(&token, user.id, &user.username, stale)
            .await
            .unwrap();

        let (jar, current) = mgr.current_user(jar).await.unwrap();
        assert!(current.is_none());
        assert!(jar.get(SESSION_COOKIE).is_none());
        assert!(mgr.store().get(&token).await.unwrap().is_none());
    }

    #[test]
    fn tokens_are_unique_and_url_safe() {
        let a = new_token();
        let b = new_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
