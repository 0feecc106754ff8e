use std::error::Error;
use std::fmt;
use std::sync::PoisonError;

use warp::http::StatusCode;

#[derive(Debug)]
pub enum TokenGateError {
    // Input errors
    ValidationError(String),

    // Auth errors
    InvalidCredentials,
    MissingToken,
    InvalidToken(String),
    ExpiredToken,

    // User store errors
    UserAlreadyExists(String),
    StoreUnavailable(String),

    // System errors
    SystemError(String),

    // Configuration errors
    ConfigError(String),
}

impl TokenGateError {
    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials
            | Self::MissingToken
            | Self::InvalidToken(_)
            | Self::ExpiredToken => StatusCode::UNAUTHORIZED,
            Self::UserAlreadyExists(_) => StatusCode::CONFLICT,
            Self::StoreUnavailable(_) | Self::SystemError(_) | Self::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code exposed to clients.
    ///
    /// All authentication failures share one code so callers cannot tell an
    /// unknown user from a wrong password, or a forged token from an expired one.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => "validation_error",
            Self::InvalidCredentials
            | Self::MissingToken
            | Self::InvalidToken(_)
            | Self::ExpiredToken => "unauthorized",
            Self::UserAlreadyExists(_) => "user_already_exists",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::SystemError(_) | Self::ConfigError(_) => "internal_error",
        }
    }

    /// Message safe to return to the client
    pub fn public_message(&self) -> String {
        match self {
            Self::ValidationError(msg) => msg.clone(),
            Self::InvalidCredentials
            | Self::MissingToken
            | Self::InvalidToken(_)
            | Self::ExpiredToken => "Unauthorized".to_string(),
            Self::UserAlreadyExists(username) => format!("User '{}' already exists", username),
            Self::StoreUnavailable(_) => "User store is unavailable".to_string(),
            Self::SystemError(_) | Self::ConfigError(_) => "Internal server error".to_string(),
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        self.status_code() == StatusCode::UNAUTHORIZED
    }
}

impl fmt::Display for TokenGateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::InvalidCredentials => write!(f, "Invalid credentials"),
            Self::MissingToken => write!(f, "Missing bearer token"),
            Self::InvalidToken(msg) => write!(f, "Invalid token: {}", msg),
            Self::ExpiredToken => write!(f, "Token expired"),
            Self::UserAlreadyExists(username) => write!(f, "User already exists: {}", username),
            Self::StoreUnavailable(msg) => write!(f, "User store unavailable: {}", msg),
            Self::SystemError(msg) => write!(f, "System error: {}", msg),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for TokenGateError {}

impl warp::reject::Reject for TokenGateError {}

// Converting from PoisonError to facilitate poisoned mutex handling
impl<T> From<PoisonError<T>> for TokenGateError {
    fn from(err: PoisonError<T>) -> Self {
        TokenGateError::StoreUnavailable(format!("Mutex poisoned: {}", err))
    }
}

impl From<rusqlite::Error> for TokenGateError {
    fn from(err: rusqlite::Error) -> Self {
        TokenGateError::StoreUnavailable(err.to_string())
    }
}

impl From<tokio::task::JoinError> for TokenGateError {
    fn from(err: tokio::task::JoinError) -> Self {
        TokenGateError::SystemError(format!("Blocking task failed: {}", err))
    }
}

// Generic result type for token-gate
pub type Result<T> = std::result::Result<T, TokenGateError>;
