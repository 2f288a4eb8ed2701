use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use serde_json::{json, Value};
use tracing::warn;

use super::error::{ApiError, Result};
use super::form::{self, FormValues};
use super::page::{render_page, Outcome, PARSE_FAILURE_MESSAGE};
use super::AppState;
use crate::analyze::analyze;
use crate::error::SofError;
use crate::output::{PDF_FILE_NAME, PDF_MIME_TYPE};

/// Response header carrying the shortfall discrepancy, when there is one.
pub const RECONCILIATION_HEADER: &str = "x-reconciliation-difference";

/// GET /
/// The empty form
pub async fn index() -> Html<String> {
    Html(render_page(&FormValues::default(), &Outcome::Blank))
}

/// POST /analyze
/// Run one analysis and show the report, or the failure, under the form
pub async fn analyze_form(
    State(state): State<AppState>,
    multipart: Multipart,
) -> (StatusCode, Html<String>) {
    let upload = match form::read_upload(multipart).await {
        Ok(upload) => upload,
        Err(e) => return failure_page(&FormValues::default(), e),
    };
    let values = upload.values;

    let request = match upload.into_request() {
        Ok(request) => request,
        Err(e) => return failure_page(&values, e.into()),
    };

    match analyze(request, &state.config).await {
        Ok(analysis) => {
            let outcome = Outcome::Report {
                markdown: analysis.markdown,
                pdf: analysis.pdf,
                mismatch: analysis.reconciliation_check,
            };
            (StatusCode::OK, Html(render_page(&values, &outcome)))
        }
        Err(e) => failure_page(&values, e.into()),
    }
}

fn failure_page(values: &FormValues, error: ApiError) -> (StatusCode, Html<String>) {
    let status = error.status();
    warn!("Analysis failed ({}): {}", status, error);

    let outcome = match error {
        ApiError::Analysis(SofError::NoDocuments) => {
            Outcome::Warning(SofError::NoDocuments.to_string())
        }
        ApiError::Analysis(SofError::MalformedModelResponse { raw_text, .. }) => Outcome::Error {
            message: PARSE_FAILURE_MESSAGE.to_string(),
            raw_response: Some(raw_text),
        },
        other => Outcome::Error {
            message: other.to_string(),
            raw_response: None,
        },
    };
    (status, Html(render_page(values, &outcome)))
}

/// POST /api/analyze
/// Run one analysis and return the PDF as an attachment
pub async fn analyze_download(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let request = form::read_upload(multipart).await?.into_request()?;
    let analysis = analyze(request, &state.config).await?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(PDF_MIME_TYPE));
    headers.insert(
        header::CONTENT_DISPOSITION,
        header_value(&format!("attachment; filename=\"{PDF_FILE_NAME}\""))?,
    );
    if let Some(mismatch) = analysis.reconciliation_check {
        headers.insert(
            HeaderName::from_static(RECONCILIATION_HEADER),
            header_value(&format!("{:.2}", mismatch.difference))?,
        );
    }

    Ok((StatusCode::OK, headers, analysis.pdf))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ApiError::Analysis(SofError::Internal(format!("header value: {e}"))))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
