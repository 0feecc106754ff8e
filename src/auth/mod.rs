//! Authentication module: credentials, tokens and the user model

pub mod clock;
pub mod password;
pub mod service;
pub mod token;
pub mod user;

// Re-export main components
pub use clock::{Clock, ManualClock, SystemClock};
pub use service::{AuthService, IssuedToken};
pub use token::{extract_bearer_token, Claims, TokenManager};
pub use user::{User, UserView};
