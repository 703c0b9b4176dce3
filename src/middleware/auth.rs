use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::PrivateCookieJar;
use tracing::debug;

use crate::auth::flash::{self, FlashLevel};
use crate::auth::session::CurrentUser;
use crate::error::AppError;
use crate::server::router::RosterState;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Guard for every data-viewing and data-mutating route.
///
/// Anonymous requests get a notice and a redirect to the login page; the
/// wrapped handler never runs. Authenticated requests carry a `CurrentUser`
/// in their extensions and get a renewed session cookie.
pub async fn require_login(
    State(state): State<RosterState>,
    jar: PrivateCookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (jar, user) = state.sessions.current_user(jar).await?;
    let Some(user) = user else {
        debug!(path = %req.uri().path(), "rejected anonymous request");
        let jar = flash::push(jar, FlashLevel::Warning, AppError::Unauthenticated.to_string());
        return Ok((jar, Redirect::to(LOGIN_PATH)).into_response());
    };

    req.extensions_mut().insert(user);
    let resp = next.run(req).await;
    Ok((jar, resp).into_response())
}

/// Guard for login and registration: an authenticated client goes straight
/// to the listing instead.
pub async fn redirect_if_authenticated(
    State(state): State<RosterState>,
    jar: PrivateCookieJar,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (jar, user) = state.sessions.current_user(jar).await?;
    if user.is_some() {
        return Ok((jar, Redirect::to(HOME_PATH)).into_response());
    }
    // The handler may issue a fresh session cookie; a stale one is left for it to replace.
    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthenticated)
    }
}
