pub mod auth;
pub mod no_cache;
