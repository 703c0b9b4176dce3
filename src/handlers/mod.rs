//! Request handlers. Each one orchestrates the stores and returns a view or
//! a redirect; recoverable failures become flash notices.

pub mod auth;
pub mod students;
