//! Request handlers for the API endpoints

pub mod auth;
pub mod health;
pub mod ping;
pub mod rejection;
pub mod token;
pub mod user;

use serde::de::DeserializeOwned;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

use crate::auth::AuthService;
use crate::constants::MAX_BODY_BYTES;

// Re-export the gate
pub use auth::{authenticate_request, with_auth, AuthContext};
pub use rejection::handle_rejection;

/// Request body as JSON or as an urlencoded form, bounded in size
pub fn json_or_form<T>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
where
    T: DeserializeOwned + Send + 'static,
{
    warp::body::content_length_limit(MAX_BODY_BYTES)
        .and(warp::body::json::<T>().or(warp::body::form::<T>()).unify())
}

// Helper function to include the auth service in a request
pub fn with_service(
    service: Arc<AuthService>,
) -> impl Filter<Extract = (Arc<AuthService>,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}
