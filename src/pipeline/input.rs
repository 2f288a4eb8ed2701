//! Input resolution: turn a path or URL given on the command line into an
//! in-memory [`StatementDocument`].
//!
//! pdfium reads statements straight from byte slices, so nothing is written
//! to disk. The `%PDF` magic check lives in [`super::extract`] so uploads from
//! the form get exactly the same treatment as files from the command line.

use crate::error::SofError;
use crate::session::StatementDocument;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve every input in order. The first failure aborts.
pub async fn resolve_documents(
    inputs: &[String],
    timeout_secs: u64,
) -> Result<Vec<StatementDocument>, SofError> {
    let mut documents = Vec::with_capacity(inputs.len());
    for input in inputs {
        documents.push(resolve_document(input, timeout_secs).await?);
    }
    Ok(documents)
}

/// Resolve one input to a statement document.
pub async fn resolve_document(input: &str, timeout_secs: u64) -> Result<StatementDocument, SofError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(Path::new(input)).await
    }
}

async fn read_local(path: &Path) -> Result<StatementDocument, SofError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SofError::DocumentNotFound {
            path: path.to_path_buf(),
        },
        _ => SofError::UnreadableDocument {
            name: path.display().to_string(),
            detail: e.to_string(),
        },
    })?;

    debug!("Read {} ({} bytes)", path.display(), bytes.len());
    Ok(StatementDocument::new(file_name(path), bytes))
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<StatementDocument, SofError> {
    info!("Downloading statement from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| SofError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            SofError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            SofError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(SofError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(|e| SofError::DownloadFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(StatementDocument::new(url_file_name(url), bytes.to_vec()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Last non-empty path segment that looks like a file, else a fixed name.
fn url_file_name(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }
    "statement.pdf".to_string()
}

/// Where `--output` should go when only a directory was given.
pub fn output_path(requested: &Path, default_name: &str) -> PathBuf {
    if requested.is_dir() {
        requested.join(default_name)
    } else {
        requested.to_path_buf()
    }
}
