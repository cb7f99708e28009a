use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    client::ApiError,
    lifecycle::LifecycleError,
    response::ApiResponse,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("Order API unavailable: {0}")]
    Upstream(#[from] ApiError),
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Lifecycle(err) => match err {
                LifecycleError::OrderNotFound(_) => StatusCode::NOT_FOUND,
                LifecycleError::IllegalTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                LifecycleError::ConfirmationRequired { .. } => StatusCode::BAD_REQUEST,
                LifecycleError::TransitionInProgress(_) => StatusCode::CONFLICT,
                LifecycleError::RemoteUpdateFailed { .. } => StatusCode::BAD_GATEWAY,
            },
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        // the cause of a failed remote update is useful to the operator
        let error = match &self {
            AppError::Lifecycle(LifecycleError::RemoteUpdateFailed { source, .. }) => {
                source.to_string()
            }
            _ => message.clone(),
        };

        let body = ApiResponse::failure(message, ErrorData { error });

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
