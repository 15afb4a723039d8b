//! Handler error type and its HTTP mapping.
//!
//! Data-layer calls return `anyhow::Error`; the conversion below downcasts
//! the typed errors that deserve a specific status and treats everything
//! else as a 500. Internal details are logged, never sent to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use emb_db::NotFound;
use emb_status::InvalidStatus;
use tracing::error;

use crate::api_types::ErrorResponse;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Forbidden(String),
    NotFound(String),
    PreconditionFailed(String),
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(nf) = err.downcast_ref::<NotFound>() {
            return ApiError::NotFound(nf.to_string());
        }
        if let Some(inv) = err.downcast_ref::<InvalidStatus>() {
            return ApiError::BadRequest(inv.to_string());
        }
        ApiError::Internal(err)
    }
}

impl From<InvalidStatus> for ApiError {
    fn from(err: InvalidStatus) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = match self {
            ApiError::BadRequest(m)
            | ApiError::Forbidden(m)
            | ApiError::NotFound(m)
            | ApiError::PreconditionFailed(m) => m,
            ApiError::Internal(err) => {
                error!(error = %format!("{err:#}"), "internal server error");
                "internal server error".to_string()
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: msg,
                status: status.as_u16(),
            }),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use emb_status::EntityKind;

    #[test]
    fn typed_errors_survive_anyhow() {
        let e: anyhow::Error = NotFound::new("order", "abc").into();
        assert_eq!(ApiError::from(e).status(), StatusCode::NOT_FOUND);

        let e: anyhow::Error = InvalidStatus::new(EntityKind::Job, "bogus").into();
        assert_eq!(ApiError::from(e).status(), StatusCode::BAD_REQUEST);

        let e = anyhow::anyhow!("connection refused");
        assert_eq!(ApiError::from(e).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn context_does_not_hide_not_found() {
        use anyhow::Context;
        let res: anyhow::Result<()> = Err(NotFound::new("job", "x").into());
        let e = res.context("loading job").unwrap_err();
        assert_eq!(ApiError::from(e).status(), StatusCode::NOT_FOUND);
    }
}
