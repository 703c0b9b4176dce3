pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod templates;
pub mod types;

pub use config::Config;
pub use error::AppError;
pub use server::router::{RosterState, roster_router};
