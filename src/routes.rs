//! Route table
//!
//! ```text
//! POST /api/token            public
//! POST /api/user/register    public
//! GET  /api/secured/ping     behind the auth gate
//! GET  /health               public
//! ```

use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, Reply};

use crate::auth::AuthService;
use crate::constants::{API_PREFIX, HEALTH_PATH};
use crate::handlers::{self, handle_rejection, json_or_form, with_auth, with_service};
use crate::security::with_api_security_headers;

/// Build every route with error recovery, security headers and access logging
pub fn routes(service: Arc<AuthService>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let api = warp::path(API_PREFIX);

    let token = api
        .and(warp::path("token"))
        .and(warp::path::end())
        .and(warp::post())
        .and(json_or_form())
        .and(with_service(service.clone()))
        .and_then(handlers::token::issue_token);

    let register = api
        .and(warp::path!("user" / "register"))
        .and(warp::post())
        .and(json_or_form())
        .and(with_service(service.clone()))
        .and_then(handlers::user::register_user);

    let ping = api
        .and(warp::path!("secured" / "ping"))
        .and(warp::get())
        .and(with_auth(service.tokens().clone()))
        .and_then(handlers::ping::ping);

    let health = warp::path(HEALTH_PATH)
        .and(warp::path::end())
        .and(warp::get())
        .and(with_service(service))
        .and_then(handlers::health::health);

    token
        .or(register)
        .or(ping)
        .or(health)
        .recover(handle_rejection)
        .map(|reply| with_api_security_headers(reply))
        .with(warp::log("token_gate::access"))
}
