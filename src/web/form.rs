//! Multipart body of the analysis form.
//!
//! | Field                   | Kind                | Missing / empty |
//! |-------------------------|---------------------|-----------------|
//! | `statements`            | file, repeatable    | no documents    |
//! | `purchase_price`        | number ≥ 0          | 0               |
//! | `mortgage_advance`      | number ≥ 0          | 0               |
//! | `personal_contribution` | number ≥ 0          | 0               |
//! | `role`                  | Client / Solicitor / Estate Agent | Client |

use super::error::ApiError;
use crate::error::SofError;
use crate::session::{AnalysisRequest, PurchaseFigures, StatementDocument, UserRole};
use axum::extract::Multipart;
use tracing::debug;

pub const STATEMENTS_FIELD: &str = "statements";
pub const PURCHASE_PRICE_FIELD: &str = "purchase_price";
pub const MORTGAGE_ADVANCE_FIELD: &str = "mortgage_advance";
pub const PERSONAL_CONTRIBUTION_FIELD: &str = "personal_contribution";
pub const ROLE_FIELD: &str = "role";

/// The non-file values, kept so the page can be shown again as submitted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FormValues {
    /// As entered; not yet validated.
    pub figures: PurchaseFigures,
    pub role: UserRole,
}

#[derive(Debug, Default)]
pub struct UploadForm {
    pub documents: Vec<StatementDocument>,
    pub values: FormValues,
}

impl UploadForm {
    /// Validate into the context for one run.
    pub fn into_request(self) -> Result<AnalysisRequest, SofError> {
        if self.documents.is_empty() {
            return Err(SofError::NoDocuments);
        }
        let f = self.values.figures;
        let figures = PurchaseFigures::new(
            f.purchase_price,
            f.mortgage_advance,
            f.personal_contribution,
        )?;
        Ok(AnalysisRequest::new(self.documents, figures).with_role(self.values.role))
    }
}

/// Drain the multipart stream into an [`UploadForm`].
pub async fn read_upload(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            STATEMENTS_FIELD => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                // Browsers send one empty part when no file was chosen.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                let file_name = if file_name.is_empty() {
                    format!("statement-{}.pdf", form.documents.len() + 1)
                } else {
                    file_name
                };
                debug!("Received {} ({} bytes)", file_name, bytes.len());
                form.documents.push(StatementDocument::new(file_name, bytes.to_vec()));
            }
            PURCHASE_PRICE_FIELD | MORTGAGE_ADVANCE_FIELD | PERSONAL_CONTRIBUTION_FIELD => {
                let text = field.text().await?;
                let value = parse_figure(&name, &text)?;
                let figures = &mut form.values.figures;
                match name.as_str() {
                    PURCHASE_PRICE_FIELD => figures.purchase_price = value,
                    MORTGAGE_ADVANCE_FIELD => figures.mortgage_advance = value,
                    _ => figures.personal_contribution = value,
                }
            }
            ROLE_FIELD => {
                let text = field.text().await?;
                if !text.trim().is_empty() {
                    form.values.role = text.parse()?;
                }
            }
            other => debug!("Ignoring form field '{}'", other),
        }
    }

    Ok(form)
}

/// Parse one figure. Blank means 0; thousands separators and a leading `£`
/// are tolerated.
pub fn parse_figure(field: &str, text: &str) -> Result<f64, SofError> {
    let cleaned: String = text
        .trim()
        .trim_start_matches('£')
        .chars()
        .filter(|c| *c != ',' && *c != '_' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Ok(0.0);
    }
    cleaned.parse::<f64>().map_err(|_| SofError::InvalidInput {
        field: field.to_string(),
        reason: format!("'{}' is not a number", text.trim()),
    })
}
