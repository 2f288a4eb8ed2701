//! The two renderings of a [`Report`](crate::report::Report).
//!
//! ```text
//!  Report ──▶ markdown::render_markdown ──▶ String
//!                                             │
//!                         layout::layout_document (wrap, paginate)
//!                                             │
//!                                  pdf::render_pdf ──▶ Vec<u8>
//! ```

pub mod layout;
pub mod markdown;
pub mod pdf;
