//! `POST /api/token`

use serde::Deserialize;
use std::sync::Arc;
use warp::Reply;

use crate::auth::AuthService;

/// Credentials presented to the token endpoint
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

pub async fn issue_token(
    request: TokenRequest,
    service: Arc<AuthService>,
) -> Result<impl Reply, warp::Rejection> {
    let issued = service
        .issue(&request.username, &request.password)
        .await
        .map_err(warp::reject::custom)?;

    Ok(warp::reply::json(&issued))
}
