//! Report → Markdown.
//!
//! Deterministic and total: the same [`Report`] always renders to the same
//! bytes. Sections appear in a fixed order:
//!
//! ```text
//! ### Transactions            pipe table, header + separator + one row each
//! ### Funding Reconciliation  four "- Label: value" lines
//! ### Red Flags               one "- flag" bullet each (none when empty)
//! ### Summary                 the summary paragraph
//! ```
//!
//! Cell and summary text is emitted as-is; no Markdown escaping is applied.

use crate::report::{Reconciliation, Report, Transaction};
use std::fmt::Write;

pub const TRANSACTIONS_HEADING: &str = "### Transactions";
pub const RECONCILIATION_HEADING: &str = "### Funding Reconciliation";
pub const RED_FLAGS_HEADING: &str = "### Red Flags";
pub const SUMMARY_HEADING: &str = "### Summary";

const TABLE_HEADER: &str = "|Date|Description|Amount|Direction|Category|Follow Up|";
const TABLE_SEPARATOR: &str = "|-----|-----------|------|---------|--------|---------|";

/// Render the full report.
pub fn render_markdown(report: &Report) -> String {
    let mut md = String::with_capacity(256 + report.transactions.len() * 96);

    md.push_str(TRANSACTIONS_HEADING);
    md.push('\n');
    md.push_str(TABLE_HEADER);
    md.push('\n');
    md.push_str(TABLE_SEPARATOR);
    md.push('\n');
    for t in &report.transactions {
        push_row(&mut md, t);
    }

    md.push('\n');
    md.push_str(RECONCILIATION_HEADING);
    md.push('\n');
    push_reconciliation(&mut md, &report.reconciliation);

    md.push('\n');
    md.push_str(RED_FLAGS_HEADING);
    md.push('\n');
    for flag in &report.red_flags {
        let _ = writeln!(md, "- {flag}");
    }

    md.push('\n');
    md.push_str(SUMMARY_HEADING);
    md.push('\n');
    md.push_str(&report.summary);
    md.push('\n');

    md
}

fn push_row(md: &mut String, t: &Transaction) {
    let _ = writeln!(
        md,
        "|{}|{}|{}|{}|{}|{}|",
        t.date, t.description, t.amount, t.direction, t.category, t.follow_up
    );
}

fn push_reconciliation(md: &mut String, rec: &Reconciliation) {
    let _ = writeln!(md, "- Total Verified: {}", rec.total_verified);
    let _ = writeln!(md, "- Declared Contribution: {}", rec.declared_contribution);
    let _ = writeln!(md, "- Mortgage Advance: {}", rec.mortgage_advance);
    let _ = writeln!(md, "- Shortfall: {}", rec.shortfall);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Amount, Direction};

    fn salary() -> Transaction {
        Transaction {
            date: "2024-01-01".into(),
            description: "Salary".into(),
            amount: Amount::from(2000),
            direction: Direction::In,
            category: "salary".into(),
            follow_up: "none".into(),
        }
    }

    fn sample() -> Report {
        Report {
            transactions: vec![salary()],
            reconciliation: Reconciliation {
                total_verified: Amount::from(2000),
                declared_contribution: Amount::from(500),
                mortgage_advance: Amount::from(1500),
                shortfall: Amount::from(0),
            },
            red_flags: vec![],
            summary: "Clean.".into(),
        }
    }

    #[test]
    fn renders_exact_document() {
        let expected = "\
### Transactions
|Date|Description|Amount|Direction|Category|Follow Up|
|-----|-----------|------|---------|--------|---------|
|2024-01-01|Salary|2000|in|salary|none|

### Funding Reconciliation
- Total Verified: 2000
- Declared Contribution: 500
- Mortgage Advance: 1500
- Shortfall: 0

### Red Flags

### Summary
Clean.
";
        assert_eq!(render_markdown(&sample()), expected);
    }

    #[test]
    fn empty_transactions_keep_header_rows_only() {
        let md = render_markdown(&Report::default());
        let table: Vec<&str> = md.lines().filter(|l| l.starts_with('|')).collect();
        assert_eq!(table, vec![TABLE_HEADER, TABLE_SEPARATOR]);
    }

    #[test]
    fn empty_red_flags_render_header_without_bullets() {
        let md = render_markdown(&sample());
        let section = md
            .split(RED_FLAGS_HEADING)
            .nth(1)
            .and_then(|rest| rest.split(SUMMARY_HEADING).next())
            .unwrap();
        assert!(!section.lines().any(|l| l.starts_with("- ")), "got: {section:?}");
    }

    #[test]
    fn red_flags_become_bullets_in_order() {
        let mut report = sample();
        report.red_flags = vec!["Cash deposit £9,500".into(), "Gift from third party".into()];
        let md = render_markdown(&report);
        assert!(md.contains("### Red Flags\n- Cash deposit £9,500\n- Gift from third party\n\n"));
    }

    #[test]
    fn default_report_renders_zeros_and_empty_summary() {
        let md = render_markdown(&Report::default());
        assert!(md.contains("- Total Verified: 0\n"));
        assert!(md.contains("- Shortfall: 0\n"));
        assert!(md.ends_with("### Summary\n\n"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let mut report = sample();
        report.transactions.push(Transaction {
            direction: Direction::Out,
            amount: Amount::from(12.75),
            ..salary()
        });
        assert_eq!(render_markdown(&report), render_markdown(&report));
    }

    #[test]
    fn cell_text_is_not_escaped() {
        let mut report = sample();
        report.transactions[0].description = "TFR | *urgent*".into();
        let md = render_markdown(&report);
        assert!(md.contains("|TFR | *urgent*|"));
    }
}
