use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ImportError;

/// Error type for the HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The body was not JSON or did not match the expected shape
    #[error("Invalid payload")]
    InvalidJsonBody(#[from] JsonRejection),

    /// A required field failed manual validation
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Import(#[from] ImportError),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResp {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJsonBody(_) | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Import(err) if err.is_validation() => StatusCode::BAD_REQUEST,
            ApiError::Import(ImportError::RecipeNotFound) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Import(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ApiErrorResp {
        let (error, details) = match self {
            ApiError::InvalidJsonBody(rejection) => {
                ("Invalid payload".to_string(), Some(rejection.body_text()))
            }
            ApiError::InvalidRequest(message) => (message.clone(), None),
            ApiError::Import(ImportError::MissingUrl) => ("URL is required".to_string(), None),
            ApiError::Import(ImportError::InvalidUrl(_)) => {
                ("Invalid URL provided".to_string(), None)
            }
            ApiError::Import(ImportError::RecipeNotFound) => {
                ("Could not extract recipe data.".to_string(), None)
            }
            ApiError::Import(ImportError::Render(err)) => {
                ("Failed to fetch the URL".to_string(), Some(err.to_string()))
            }
            ApiError::Import(ImportError::Notify(message)) => (message.clone(), None),
            ApiError::Import(err) => ("Internal server error".to_string(), Some(err.to_string())),
        };
        ApiErrorResp { error, details }
    }
}

// Render failures carry their details to the caller as a debugging aid; the
// shape of `details` is not a stable contract.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        } else {
            warn!("Rejected request ({}): {}", status, self);
        }

        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Import(ImportError::MissingUrl).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Import(ImportError::InvalidUrl("x".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Import(ImportError::RecipeNotFound).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Import(ImportError::Render(RenderError::Timeout(Duration::from_secs(30))))
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::InvalidRequest("Email is required".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_render_error_includes_details() {
        let body = ApiError::Import(ImportError::Render(RenderError::Navigation(
            "net::ERR_NAME_NOT_RESOLVED".to_string(),
        )))
        .body();
        assert_eq!(body.error, "Failed to fetch the URL");
        assert!(body.details.unwrap().contains("ERR_NAME_NOT_RESOLVED"));
    }
}
