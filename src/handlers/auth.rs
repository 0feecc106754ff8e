//! Auth gate for protected routes
//!
//! `authenticate_request` is the whole decision; `with_auth` lifts it into a
//! warp filter whose extracted `AuthContext` is what protected handlers take
//! as an argument. A handler that needs an `AuthContext` cannot be mounted
//! without the gate in front of it.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use warp::http::header::AUTHORIZATION;
use warp::http::HeaderMap;
use warp::Filter;

use crate::auth::token::{extract_bearer_token, TokenManager};
use crate::error::{Result, TokenGateError};

/// Verified identity of the caller, scoped to one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: String,
    pub username: String,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Authenticate a request from its raw `Authorization` header value
pub fn authenticate_request(
    auth_header: Option<&str>,
    token_manager: &TokenManager,
) -> Result<AuthContext> {
    let token = auth_header
        .and_then(extract_bearer_token)
        .ok_or(TokenGateError::MissingToken)?;

    let claims = token_manager.verify(token)?;

    Ok(AuthContext {
        user_id: claims.sub,
        username: claims.username,
        issued_at: DateTime::from_timestamp(claims.iat, 0),
        expires_at: DateTime::from_timestamp(claims.exp, 0),
    })
}

/// The `Authorization` header as text. A value that is not visible ASCII is
/// an invalid credential, not a malformed request.
pub fn authorization_header(headers: &HeaderMap) -> Result<Option<&str>> {
    headers
        .get(AUTHORIZATION)
        .map(|value| {
            value.to_str().map_err(|_| {
                TokenGateError::InvalidToken("authorization header is not valid text".to_string())
            })
        })
        .transpose()
}

/// Filter that rejects unauthenticated requests and extracts the caller
pub fn with_auth(
    token_manager: Arc<TokenManager>,
) -> impl Filter<Extract = (AuthContext,), Error = warp::Rejection> + Clone {
    warp::header::headers_cloned().and_then(move |headers: HeaderMap| {
        let token_manager = token_manager.clone();
        async move {
            let result = authorization_header(&headers)
                .and_then(|header| authenticate_request(header, &token_manager));
            match result {
                Ok(context) => {
                    log::debug!("Authenticated request for {}", context.user_id);
                    Ok(context)
                }
                Err(e) => {
                    log::warn!(target: "token_gate::security", "Rejected request: {}", e);
                    Err(warp::reject::custom(e))
                }
            }
        }
    })
}
