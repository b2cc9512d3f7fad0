//! Request extractors.
//!
//! Both map shape failures to `VALID_001` responses instead of axum's
//! default plain-text rejections. Content validation happens in the service.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use fleet_core::{limits::MAX_REQUEST_BODY_BYTES, parse_body};
use observability::metrics;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::response::ApiError;

/// JSON body with a size cap.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        if body.len() > MAX_REQUEST_BODY_BYTES {
            metrics().validation_failures.inc();
            return Err(ApiError::bad_request(format!(
                "Payload size {}KB exceeds {}KB limit",
                body.len() / 1024,
                MAX_REQUEST_BODY_BYTES / 1024
            )));
        }

        parse_body(&body).map(ApiJson).map_err(|e| {
            metrics().validation_failures.inc();
            debug!(error = %e, "Rejected request body");
            ApiError::from(e)
        })
    }
}

/// Query string parameters.
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::try_from_uri(&parts.uri)
            .map(|Query(value)| ApiQuery(value))
            .map_err(|e| {
                metrics().validation_failures.inc();
                ApiError::validation(
                    fleet_core::ValidationErrorCode::InvalidFormat.code(),
                    "Invalid query parameters",
                    vec![e.body_text()],
                )
            })
    }
}
