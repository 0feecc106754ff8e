use serde::Serialize;
use std::convert::Infallible;
use warp::Reply;

use super::auth::AuthContext;

#[derive(Debug, Serialize)]
struct Pong<'a> {
    message: &'static str,
    user_id: &'a str,
}

/// `GET /api/secured/ping`, only reachable through the auth gate
pub async fn ping(context: AuthContext) -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&Pong {
        message: "pong",
        user_id: &context.user_id,
    }))
}
