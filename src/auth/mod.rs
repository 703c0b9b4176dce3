//! Identity: password hashing, login sessions and flash notices.

pub mod flash;
pub mod password;
pub mod session;

pub use flash::{FlashLevel, FlashMessage};
pub use password::PasswordHasher;
pub use session::{CurrentUser, SessionManager};
