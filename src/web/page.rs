//! HTML for the one page of the form surface.
//!
//! The report arrives as Markdown. It is turned into HTML with
//! pulldown-cmark. Raw HTML inside it (which can only come from the model)
//! is shown as text, and links and images are reduced to their text, so
//! nothing the model writes becomes markup.

use super::form::{
    FormValues, MORTGAGE_ADVANCE_FIELD, PERSONAL_CONTRIBUTION_FIELD, PURCHASE_PRICE_FIELD,
    ROLE_FIELD, STATEMENTS_FIELD,
};
use crate::output::{PDF_FILE_NAME, PDF_MIME_TYPE};
use crate::report::ReconciliationMismatch;
use crate::session::UserRole;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};
use std::fmt::Write;

pub const TITLE: &str = "AML Source of Funds Assistant";
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse AI response as JSON.";

/// What to show under the form.
#[derive(Debug, Clone, Default)]
pub enum Outcome {
    #[default]
    Blank,
    Warning(String),
    Error {
        message: String,
        raw_response: Option<String>,
    },
    Report {
        markdown: String,
        pdf: Vec<u8>,
        mismatch: Option<ReconciliationMismatch>,
    },
}

/// The whole page: form first, then the outcome of the last submit.
pub fn render_page(values: &FormValues, outcome: &Outcome) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>{TITLE}</h1>");
    body.push_str(&render_form(values));
    body.push_str(&render_outcome(outcome));

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{TITLE}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n"
    )
}

fn render_form(values: &FormValues) -> String {
    let f = &values.figures;
    let mut html = String::new();
    let _ = write!(
        html,
        "<form method=\"post\" action=\"/analyze\" enctype=\"multipart/form-data\">\n\
         <label>Upload Bank Statement PDFs\n\
         <input type=\"file\" name=\"{STATEMENTS_FIELD}\" accept=\"application/pdf,.pdf\" multiple></label>\n"
    );
    number_input(&mut html, PURCHASE_PRICE_FIELD, "Purchase Price (£)", f.purchase_price);
    number_input(&mut html, MORTGAGE_ADVANCE_FIELD, "Mortgage Advance (£)", f.mortgage_advance);
    number_input(
        &mut html,
        PERSONAL_CONTRIBUTION_FIELD,
        "Personal Contribution (£)",
        f.personal_contribution,
    );

    let _ = write!(html, "<label>Your role\n<select name=\"{ROLE_FIELD}\">\n");
    for role in UserRole::ALL {
        let selected = if role == values.role { " selected" } else { "" };
        let _ = writeln!(
            html,
            "<option value=\"{label}\"{selected}>{label}</option>",
            label = role.label()
        );
    }
    html.push_str("</select></label>\n<button type=\"submit\">Analyze</button>\n</form>\n");
    html
}

fn number_input(html: &mut String, name: &str, label: &str, value: f64) {
    let _ = writeln!(
        html,
        "<label>{label}\n<input type=\"number\" name=\"{name}\" min=\"0\" step=\"1000\" value=\"{value}\"></label>"
    );
}

fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Blank => String::new(),
        Outcome::Warning(message) => {
            format!("<div class=\"warning\">{}</div>\n", escape_html(message))
        }
        Outcome::Error {
            message,
            raw_response,
        } => {
            let mut html = format!("<div class=\"error\">{}</div>\n", escape_html(message));
            if let Some(raw) = raw_response {
                let _ = writeln!(html, "<pre class=\"raw\">{}</pre>", escape_html(raw));
            }
            html
        }
        Outcome::Report {
            markdown,
            pdf,
            mismatch,
        } => {
            let mut html = String::from("<section class=\"report\">\n");
            if let Some(m) = mismatch {
                let _ = writeln!(html, "<div class=\"notice\">{}</div>", escape_html(&m.to_string()));
            }
            html.push_str(&markdown_to_html(markdown));
            let _ = writeln!(
                html,
                "<p><a class=\"download\" download=\"{PDF_FILE_NAME}\" href=\"{}\">Download as PDF</a></p>",
                pdf_data_uri(pdf)
            );
            html.push_str("</section>\n");
            html
        }
    }
}

/// Markdown → HTML with tables; embedded HTML is escaped, links and images
/// keep only their text.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser =
        Parser::new_ext(markdown, Options::ENABLE_TABLES).filter_map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Some(Event::Text(raw)),
            Event::Start(Tag::Link { .. } | Tag::Image { .. })
            | Event::End(TagEnd::Link | TagEnd::Image) => None,
            other => Some(other),
        });
    let mut out = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut out, parser);
    out
}

pub fn pdf_data_uri(pdf: &[u8]) -> String {
    format!("data:{PDF_MIME_TYPE};base64,{}", STANDARD.encode(pdf))
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;max-width:60rem;margin:2rem auto;padding:0 1rem}\
form{display:grid;gap:.75rem;margin-bottom:2rem}\
label{display:grid;gap:.25rem}\
table{border-collapse:collapse}td,th{border:1px solid #ccc;padding:.25rem .5rem}\
.warning{background:#fff4ce;padding:.75rem}\
.error{background:#fde7e9;padding:.75rem}\
.notice{background:#e8f1fb;padding:.75rem;margin-bottom:1rem}\
pre.raw{white-space:pre-wrap;background:#f5f5f5;padding:.75rem}";
