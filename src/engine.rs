//! pdfium binding.
//!
//! pdfium is a C++ library loaded at runtime. Resolution order:
//!
//! 1. [`AnalysisConfig::pdfium_library`](crate::config::AnalysisConfig::pdfium_library),
//!    either the library file itself or a directory holding it;
//! 2. the platform library name in the working directory (`./libpdfium.so`,
//!    `./libpdfium.dylib`, `./pdfium.dll`);
//! 3. the system library search path.
//!
//! Binding is blocking and cheap after the first load; callers run it inside
//! `spawn_blocking` together with the document work.

use crate::error::SofError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Bind to pdfium, honouring an explicit library location when given.
pub fn bind_pdfium(library: Option<&Path>) -> Result<Pdfium, SofError> {
    let bindings = match library {
        Some(path) => {
            let file = library_file(path);
            debug!("Binding pdfium from {}", file.display());
            Pdfium::bind_to_library(&file).map_err(|e| {
                SofError::PdfEngineUnavailable(format!("{}: {:?}", file.display(), e))
            })?
        }
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| SofError::PdfEngineUnavailable(format!("{:?}", e)))?,
    };
    Ok(Pdfium::new(bindings))
}

/// A directory is expanded to the platform library name inside it.
fn library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}
