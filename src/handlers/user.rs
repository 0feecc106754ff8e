//! `POST /api/user/register`

use serde::Deserialize;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Reply;

use crate::auth::AuthService;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
}

pub async fn register_user(
    request: RegisterRequest,
    service: Arc<AuthService>,
) -> Result<impl Reply, warp::Rejection> {
    let user = service
        .register(&request.username, &request.password, request.email.as_deref())
        .await
        .map_err(warp::reject::custom)?;

    Ok(warp::reply::with_status(
        warp::reply::json(&user.view()),
        StatusCode::CREATED,
    ))
}
