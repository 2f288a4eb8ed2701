//! Per-run request context.
//!
//! Everything one analysis needs travels in an [`AnalysisRequest`]: the
//! uploaded statements, the purchase figures and the (decorative) role of
//! the person asking. Nothing is kept between runs.

use crate::error::SofError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One uploaded statement, held in memory.
#[derive(Clone)]
pub struct StatementDocument {
    /// File name as uploaded, used in error messages and logs.
    pub name: String,
    pub bytes: Vec<u8>,
}

impl StatementDocument {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl fmt::Debug for StatementDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementDocument")
            .field("name", &self.name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// The three figures the buyer declares for the purchase.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PurchaseFigures {
    pub purchase_price: f64,
    pub mortgage_advance: f64,
    pub personal_contribution: f64,
}

impl PurchaseFigures {
    /// Validate and build. Each figure must be finite and non-negative.
    pub fn new(
        purchase_price: f64,
        mortgage_advance: f64,
        personal_contribution: f64,
    ) -> Result<Self, SofError> {
        check_figure("purchase_price", purchase_price)?;
        check_figure("mortgage_advance", mortgage_advance)?;
        check_figure("personal_contribution", personal_contribution)?;
        Ok(Self {
            purchase_price,
            mortgage_advance,
            personal_contribution,
        })
    }
}

fn check_figure(field: &str, value: f64) -> Result<(), SofError> {
    if !value.is_finite() {
        return Err(SofError::InvalidInput {
            field: field.to_string(),
            reason: format!("{value} is not a number"),
        });
    }
    if value < 0.0 {
        return Err(SofError::InvalidInput {
            field: field.to_string(),
            reason: format!("must be ≥ 0, got {value}"),
        });
    }
    Ok(())
}

/// Who is running the check. Recorded in logs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UserRole {
    #[default]
    Client,
    Solicitor,
    EstateAgent,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Client, UserRole::Solicitor, UserRole::EstateAgent];

    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Client => "Client",
            UserRole::Solicitor => "Solicitor",
            UserRole::EstateAgent => "Estate Agent",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for UserRole {
    type Err = SofError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "client" => Ok(UserRole::Client),
            "solicitor" => Ok(UserRole::Solicitor),
            "estateagent" | "agent" => Ok(UserRole::EstateAgent),
            _ => Err(SofError::InvalidInput {
                field: "role".into(),
                reason: format!("unknown role '{s}' (Client, Solicitor, Estate Agent)"),
            }),
        }
    }
}

/// The explicit context for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub documents: Vec<StatementDocument>,
    pub figures: PurchaseFigures,
    pub role: UserRole,
}

impl AnalysisRequest {
    pub fn new(documents: Vec<StatementDocument>, figures: PurchaseFigures) -> Self {
        Self {
            documents,
            figures,
            role: UserRole::default(),
        }
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figures_reject_negative() {
        let err = PurchaseFigures::new(250_000.0, -1.0, 50_000.0).unwrap_err();
        match err {
            SofError::InvalidInput { field, .. } => assert_eq!(field, "mortgage_advance"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn figures_reject_nan() {
        assert!(PurchaseFigures::new(f64::NAN, 0.0, 0.0).is_err());
    }

    #[test]
    fn figures_accept_zero() {
        let f = PurchaseFigures::new(0.0, 0.0, 0.0).unwrap();
        assert_eq!(f, PurchaseFigures::default());
    }

    #[test]
    fn role_parsing_accepts_labels_and_slugs() {
        assert_eq!("Estate Agent".parse::<UserRole>().unwrap(), UserRole::EstateAgent);
        assert_eq!("estate-agent".parse::<UserRole>().unwrap(), UserRole::EstateAgent);
        assert_eq!("SOLICITOR".parse::<UserRole>().unwrap(), UserRole::Solicitor);
        assert!("banker".parse::<UserRole>().is_err());
    }

    #[test]
    fn document_debug_hides_bytes() {
        let doc = StatementDocument::new("jan.pdf", vec![0u8; 2048]);
        let dbg = format!("{doc:?}");
        assert!(dbg.contains("jan.pdf"));
        assert!(dbg.contains("2048"));
    }
}
