use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use erc20_token_contract::ErrorKind;
use serde::Serialize;
use thiserror::Error;

use crate::invoke::InvokeError;
use crate::world_state::CommitError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::Internal(_) => "INTERNAL_SERVER_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Conflict(_) => "CONFLICT",
        }
    }
}

impl From<InvokeError> for AppError {
    fn from(err: InvokeError) -> Self {
        let message = err.to_string();
        match err {
            InvokeError::UnknownFunction(_) | InvokeError::Arity { .. } => {
                Self::BadRequest(message)
            }
            InvokeError::Contract(e) => match e.kind() {
                ErrorKind::NotFound => Self::NotFound(message),
                ErrorKind::InvalidArgument => Self::BadRequest(message),
                ErrorKind::PermissionDenied => Self::Forbidden(message),
                ErrorKind::InsufficientFunds => Self::Conflict(message),
                ErrorKind::Internal => Self::Internal(message),
            },
            InvokeError::Commit(CommitError::MvccConflict(_)) => Self::Conflict(message),
            InvokeError::Commit(CommitError::Poisoned) => Self::Internal(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        let body = Json(ErrorResponse {
            error: self.error_type().to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erc20_token_contract::ContractError;

    #[test]
    fn test_contract_errors_map_to_status() {
        let cases = [
            (ContractError::AttributeNotFound("Token name"), StatusCode::NOT_FOUND),
            (ContractError::Unauthorized, StatusCode::FORBIDDEN),
            (ContractError::InsufficientAllowance, StatusCode::CONFLICT),
            (
                ContractError::InvalidArgument("invalid transfer amount".to_string()),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, status) in cases {
            let app: AppError = InvokeError::Contract(err).into();
            assert_eq!(app.status_code(), status);
        }
    }

    #[test]
    fn test_mvcc_conflict_is_conflict() {
        let app: AppError = InvokeError::Commit(CommitError::MvccConflict("k".into())).into();
        assert_eq!(app.status_code(), StatusCode::CONFLICT);
        assert_eq!(app.error_type(), "CONFLICT");
    }

    #[test]
    fn test_not_found_message_is_preserved() {
        let err = ContractError::AttributeNotFound("Token name");
        let app: AppError = InvokeError::Contract(err).into();
        assert_eq!(app.to_string(), "Not found: Sorry ! Token name not found");
    }
}
