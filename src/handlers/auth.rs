use axum::{
    Form,
    extract::State,
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use tracing::{info, warn};

use crate::auth::flash::{self, FlashLevel};
use crate::db::models::{User, UserId};
use crate::error::AppError;
use crate::middleware::auth::{HOME_PATH, LOGIN_PATH};
use crate::server::router::RosterState;
use crate::templates::{LoginTemplate, RegisterTemplate, render};
use crate::types::forms::CredentialsForm;

pub const REGISTER_PATH: &str = "/register";

/// GET /register
pub async fn register_form(jar: PrivateCookieJar) -> Result<(PrivateCookieJar, Html<String>), AppError> {
    let (jar, flashes) = flash::take(jar);
    Ok((jar, render(&RegisterTemplate { flashes })?))
}

/// POST /register -> create the account, then send the user to log in.
pub async fn register(
    State(state): State<RosterState>,
    jar: PrivateCookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<(PrivateCookieJar, Redirect), AppError> {
    match register_user(&state, form).await {
        Ok(id) => {
            info!(user_id = id, "user registered");
            let jar = flash::push(jar, FlashLevel::Success, "Registration successful! Please log in.");
            Ok((jar, Redirect::to(LOGIN_PATH)))
        }
        Err(err @ (AppError::Validation(_) | AppError::DuplicateUsername)) => {
            let jar = flash::push(jar, FlashLevel::Danger, err.to_string());
            Ok((jar, Redirect::to(REGISTER_PATH)))
        }
        Err(err) => Err(err),
    }
}

async fn register_user(state: &RosterState, form: CredentialsForm) -> Result<UserId, AppError> {
    let creds = form.validate()?;
    // Fast path for the common case; the UNIQUE constraint still decides races.
    if state.users.find_by_username(&creds.username).await?.is_some() {
        return Err(AppError::DuplicateUsername);
    }
    let hash = state.hasher.hash(&creds.password).await?;
    state.users.create(&creds.username, &hash).await
}

/// GET /login
pub async fn login_form(jar: PrivateCookieJar) -> Result<(PrivateCookieJar, Html<String>), AppError> {
    let (jar, flashes) = flash::take(jar);
    Ok((jar, render(&LoginTemplate { flashes })?))
}

/// POST /login -> establish a session on valid credentials.
pub async fn login(
    State(state): State<RosterState>,
    jar: PrivateCookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<(PrivateCookieJar, Redirect), AppError> {
    match authenticate(&state, form).await {
        Ok(user) => {
            let jar = state.sessions.establish(jar, &user).await?;
            let jar = flash::push(jar, FlashLevel::Success, "Login successful!");
            Ok((jar, Redirect::to(HOME_PATH)))
        }
        Err(err @ (AppError::Validation(_) | AppError::AuthenticationFailure)) => {
            let jar = flash::push(jar, FlashLevel::Danger, err.to_string());
            Ok((jar, Redirect::to(LOGIN_PATH)))
        }
        Err(err) => Err(err),
    }
}

/// Unknown usernames and wrong passwords fail identically.
async fn authenticate(state: &RosterState, form: CredentialsForm) -> Result<User, AppError> {
    let creds = form.validate()?;
    let Some(user) = state.users.find_by_username(&creds.username).await? else {
        state.hasher.verify_unknown_user(&creds.password).await?;
        warn!(username = %creds.username, "login failed");
        return Err(AppError::AuthenticationFailure);
    };
    if !state.hasher.verify(&creds.password, &user.password_hash).await? {
        warn!(username = %creds.username, "login failed");
        return Err(AppError::AuthenticationFailure);
    }
    Ok(user)
}

/// GET /logout -> drop the session server-side and clear the cookie.
pub async fn logout(
    State(state): State<RosterState>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Redirect), AppError> {
    let jar = state.sessions.destroy(jar).await?;
    info!("logged out");
    let jar = flash::push(jar, FlashLevel::Info, "You have been logged out.");
    Ok((jar, Redirect::to(LOGIN_PATH)))
}
