//! Turns every rejection into a structured JSON error response

use serde::Serialize;
use std::convert::Infallible;
use warp::filters::body::BodyDeserializeError;
use warp::http::header::{HeaderValue, WWW_AUTHENTICATE};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Rejection, Reply};

use crate::error::TokenGateError;

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

fn error_response(status: StatusCode, code: &str, message: String) -> Response {
    let body = ErrorBody {
        error: code.to_string(),
        message,
    };
    let mut response = warp::reply::with_status(warp::reply::json(&body), status).into_response();

    if status == StatusCode::UNAUTHORIZED {
        response
            .headers_mut()
            .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }

    response
}

pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    if err.is_not_found() {
        return Ok(error_response(
            StatusCode::NOT_FOUND,
            "not_found",
            "Not found".to_string(),
        ));
    }

    if let Some(e) = err.find::<TokenGateError>() {
        if e.status_code().is_server_error() {
            log::error!("Request failed: {}", e);
        }
        return Ok(error_response(e.status_code(), e.code(), e.public_message()));
    }

    let (status, code, message) = if let Some(e) = err.find::<BodyDeserializeError>() {
        (
            StatusCode::BAD_REQUEST,
            "validation_error",
            format!("Invalid request body: {}", e),
        )
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            "payload_too_large",
            "Request body is too large".to_string(),
        )
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (
            StatusCode::LENGTH_REQUIRED,
            "length_required",
            "Content-Length header is required".to_string(),
        )
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "unsupported_media_type",
            "Use application/json or application/x-www-form-urlencoded".to_string(),
        )
    } else if err.find::<warp::reject::InvalidHeader>().is_some() {
        (
            StatusCode::BAD_REQUEST,
            "invalid_header",
            "Malformed request header".to_string(),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "method_not_allowed",
            "Method not allowed".to_string(),
        )
    } else {
        log::error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal server error".to_string(),
        )
    };

    Ok(error_response(status, code, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_auth_rejection_has_challenge() {
        let response = handle_rejection(warp::reject::custom(TokenGateError::ExpiredToken))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");
    }

    #[tokio::test]
    async fn test_not_found() {
        let response = handle_rejection(warp::reject::not_found()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_conflict() {
        let err = TokenGateError::UserAlreadyExists("alice".to_string());
        let response = handle_rejection(warp::reject::custom(err)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(!response.headers().contains_key(WWW_AUTHENTICATE));
    }
}
