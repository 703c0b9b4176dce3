use axum::{
    Router,
    extract::FromRef,
    middleware,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use tower_http::trace::TraceLayer;

use crate::auth::{PasswordHasher, SessionManager};
use crate::config::Config;
use crate::db::{CredentialStore, SessionStore, SqlitePool, StudentRepository};
use crate::error::AppError;
use crate::handlers::{auth, students};
use crate::middleware::auth::{redirect_if_authenticated, require_login};
use crate::middleware::no_cache;

/// Shared application state; every field is cheap to clone.
#[derive(Clone)]
pub struct RosterState {
    pub users: CredentialStore,
    pub students: StudentRepository,
    pub sessions: SessionManager,
    pub hasher: PasswordHasher,
    key: Key,
}

impl RosterState {
    pub fn new(pool: SqlitePool, cfg: &Config, key: Key) -> Result<Self, AppError> {
        Ok(Self {
            users: CredentialStore::new(pool.clone()),
            students: StudentRepository::new(pool.clone()),
            sessions: SessionManager::new(
                SessionStore::new(pool),
                cfg.session.idle_timeout(),
                cfg.basic.secure_cookie,
            ),
            hasher: PasswordHasher::new(&cfg.password)?,
            key,
        })
    }
}

impl FromRef<RosterState> for Key {
    fn from_ref(state: &RosterState) -> Self {
        state.key.clone()
    }
}

pub fn roster_router(state: RosterState) -> Router {
    // Everything that shows or changes student data sits behind the login gate.
    let protected = Router::new()
        .route("/", get(students::list))
        .route("/add", post(students::add))
        .route(
            "/edit/{id}",
            get(students::edit_form).post(students::edit_submit),
        )
        .route("/delete/{id}", get(students::delete))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_login));

    let guest = Router::new()
        .route(
            auth::REGISTER_PATH,
            get(auth::register_form).post(auth::register),
        )
        .route("/login", get(auth::login_form).post(auth::login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            redirect_if_authenticated,
        ));

    let router = Router::new()
        .merge(protected)
        .merge(guest)
        .route("/logout", get(auth::logout));

    no_cache::apply(router)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
