use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Reply;

use crate::auth::AuthService;
use crate::error::TokenGateError;

/// `GET /health`: liveness plus a round trip to the user store
pub async fn health(service: Arc<AuthService>) -> Result<impl Reply, Infallible> {
    let users = service.users();
    let status = match users.health_check().await {
        Ok(true) => users.count_users().await,
        Ok(false) => Err(TokenGateError::StoreUnavailable(
            "backend reported unhealthy".to_string(),
        )),
        Err(e) => Err(e),
    };

    match status {
        Ok(count) => Ok(warp::reply::with_status(
            warp::reply::json(&json!({
                "status": "ok",
                "backend": users.backend_name(),
                "users": count,
            })),
            StatusCode::OK,
        )),
        Err(e) => {
            log::error!("Health check failed: {}", e);
            Ok(warp::reply::with_status(
                warp::reply::json(&json!({ "status": "unavailable" })),
                StatusCode::SERVICE_UNAVAILABLE,
            ))
        }
    }
}
