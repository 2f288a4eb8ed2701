use crate::error::SofError;
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Analysis(#[from] SofError),

    #[error("Malformed upload: {0}")]
    Upload(#[from] MultipartError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Upload(e) => e.status(),
            ApiError::Analysis(e) => status_for(e),
        }
    }
}

/// HTTP status for a library error.
pub fn status_for(error: &SofError) -> StatusCode {
    match error {
        SofError::NoDocuments
        | SofError::InvalidInput { .. }
        | SofError::UnreadableDocument { .. } => StatusCode::BAD_REQUEST,
        SofError::StatementTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        SofError::MalformedModelResponse { .. } | SofError::LlmApiError { .. } => {
            StatusCode::BAD_GATEWAY
        }
        SofError::ApiTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        SofError::ProviderNotConfigured { .. } | SofError::PdfEngineUnavailable(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = match &self {
            ApiError::Analysis(e) => match e.raw_response() {
                Some(raw) => json!({ "error": self.to_string(), "raw_response": raw }),
                None => json!({ "error": self.to_string() }),
            },
            ApiError::Upload(_) => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(ApiError::from(SofError::NoDocuments).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(SofError::MalformedModelResponse {
                raw_text: "nope".into(),
                detail: "expected value".into(),
            })
            .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(SofError::StatementTooLarge { chars: 10, limit: 5 }).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }
}
