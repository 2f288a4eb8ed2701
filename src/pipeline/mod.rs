//! Pipeline stages that lead up to a [`Report`](crate::report::Report).
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own. Rendering lives in [`crate::render`].
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ (prompts) ──▶ llm ──▶ response
//! (path/URL)  (pdfium)               (chat)   (JSON → Report)
//! ```
//!
//! 1. [`input`]   : resolve command-line paths and URLs to in-memory statements
//! 2. [`extract`] : read page text with pdfium; runs in `spawn_blocking`
//! 3. [`llm`]     : the single model call; the only stage with network I/O
//! 4. [`response`]: repair harmless quirks, then strictly decode the reply

pub mod extract;
pub mod input;
pub mod llm;
pub mod response;
