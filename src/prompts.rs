//! Prompts for the source-of-funds analysis.
//!
//! The model does all the domain reasoning (classification, salary
//! detection, transfer tracing, red flags, reconciliation). This module only
//! assembles the instruction: a fixed task description, the three declared
//! figures, the Report schema and the verbatim statement text.
//!
//! Callers can override the system message via
//! [`crate::config::AnalysisConfig::system_prompt`]; the user instruction
//! is always built by [`build_prompt`].

use crate::session::PurchaseFigures;

/// Default system message.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are an expert AML assistant for conveyancing. You reply with a single JSON object and nothing else.";

/// The Report wire contract, spelled out for the model.
pub const REPORT_SCHEMA: &str = r#"{
  "transactions": [
    {
      "date": "YYYY-MM-DD",
      "description": "string",
      "amount": number,
      "direction": "in" | "out",
      "category": "string",
      "follow_up": "string"
    }
  ],
  "reconciliation": {
    "total_verified": number,
    "declared_contribution": number,
    "mortgage_advance": number,
    "shortfall": number
  },
  "red_flags": ["string"],
  "summary": "string"
}"#;

/// Heading placed immediately before the statement text.
pub const STATEMENT_HEADING: &str = "Bank Statement Text:";

/// Build the user instruction for one run.
///
/// Pure: the same text and figures always give the same prompt. The
/// statement text is embedded verbatim, never trimmed or truncated.
pub fn build_prompt(statement_text: &str, figures: &PurchaseFigures) -> String {
    format!(
        "You are AML Source-of-Funds Brain v1.1. Classify transactions, detect salary, trace \
transfers, flag AML red-flags, and reconcile declared vs. verified funds for purchase price \
{price}, mortgage {mortgage}, contribution {contribution}. Return JSON using this schema:\n\
{schema}\n\n{heading}\n{text}\n",
        price = figures.purchase_price,
        mortgage = figures.mortgage_advance,
        contribution = figures.personal_contribution,
        schema = REPORT_SCHEMA,
        heading = STATEMENT_HEADING,
        text = statement_text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn figures() -> PurchaseFigures {
        PurchaseFigures::new(350_000.0, 280_000.0, 70_000.5).unwrap()
    }

    #[test]
    fn prompt_embeds_all_three_figures() {
        let p = build_prompt("", &figures());
        assert!(p.contains("purchase price 350000"));
        assert!(p.contains("mortgage 280000"));
        assert!(p.contains("contribution 70000.5"));
    }

    #[test]
    fn prompt_embeds_statement_text_verbatim_after_heading() {
        let text = "01/02 SALARY ACME LTD 2,000.00\n\n03/02 TFR *** | <b>\n";
        let p = build_prompt(text, &figures());
        let (_, tail) = p.split_once(STATEMENT_HEADING).expect("heading present");
        assert_eq!(tail, format!("\n{text}\n"));
    }

    #[test]
    fn prompt_is_deterministic() {
        assert_eq!(build_prompt("abc", &figures()), build_prompt("abc", &figures()));
    }

    #[test]
    fn schema_names_every_report_field() {
        for field in [
            "transactions",
            "follow_up",
            "total_verified",
            "declared_contribution",
            "mortgage_advance",
            "shortfall",
            "red_flags",
            "summary",
        ] {
            assert!(REPORT_SCHEMA.contains(field), "schema missing {field}");
        }
    }
}
