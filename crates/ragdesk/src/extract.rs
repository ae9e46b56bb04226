//! Text extraction for uploaded files.
//!
//! Extraction is a black box to the retrieval pipeline: it takes the
//! uploaded bytes plus the filename and returns raw text segments, each
//! optionally tagged with a page number. PDFs extract per page so page
//! citations survive all the way to chat responses; plain text and
//! markdown extract as a single untagged segment.

use ragdesk_core::error::{RagError, Result};

/// One extracted text segment: a PDF page or a whole text file.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    /// 1-based page number for paged formats.
    pub page: Option<u32>,
}

/// Extract raw text segments from an uploaded file.
///
/// Returns [`RagError::Validation`] for unsupported extensions and for
/// files with no extractable text at all.
pub fn extract(filename: &str, bytes: &[u8]) -> Result<Vec<ExtractedText>> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let segments = match extension.as_str() {
        "pdf" => extract_pdf(filename, bytes)?,
        "txt" | "md" => {
            let text = String::from_utf8_lossy(bytes).into_owned();
            if text.trim().is_empty() {
                Vec::new()
            } else {
                vec![ExtractedText { text, page: None }]
            }
        }
        other => {
            return Err(RagError::validation(format!(
                "unsupported file type: .{}",
                other
            )))
        }
    };

    if segments.is_empty() {
        return Err(RagError::validation(format!(
            "could not extract any text from '{}'",
            filename
        )));
    }
    Ok(segments)
}

fn extract_pdf(filename: &str, bytes: &[u8]) -> Result<Vec<ExtractedText>> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| {
        RagError::validation(format!("failed to read PDF '{}': {}", filename, e))
    })?;
    Ok(pages
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(i, text)| ExtractedText {
            text,
            page: Some(i as u32 + 1),
        })
        .collect())
}
