//! PDF text extraction boundary.
//!
//! Thin wrapper over the extraction collaborators: pdf-extract for text,
//! lopdf for the page count, and an optional external OCR endpoint for
//! scanned documents. Gating policy: below `min_chars` we try OCR; if the
//! combined text is still below `floor_chars` the caller must reject the
//! upload before any suggestion or matching work happens.

use std::io::Write;

use anyhow::Context;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("not a valid PDF: {0}")]
    InvalidPdf(String),

    #[error("extraction produced too little text ({chars} chars, floor {floor})")]
    TooLittleText { chars: usize, floor: usize },

    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub text: String,
    pub page_count: usize,
    /// True when the OCR collaborator supplied (part of) the text.
    pub used_ocr: bool,
}

/// Extracts text and page count from raw PDF bytes.
pub fn extract_text(bytes: &[u8]) -> Result<ExtractedDocument, ExtractError> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| ExtractError::InvalidPdf(e.to_string()))?;
    let page_count = doc.get_pages().len();

    // pdf-extract wants a path; buffer the upload through a temp file.
    let mut file = tempfile::NamedTempFile::new().context("failed to create temp file")?;
    file.write_all(bytes).context("failed to buffer upload")?;

    let text = pdf_extract::extract_text(file.path())
        .map_err(|e| ExtractError::InvalidPdf(e.to_string()))?;
    let text = text.trim().to_string();

    info!(chars = text.len(), page_count, "extracted text from PDF");
    Ok(ExtractedDocument {
        text,
        page_count,
        used_ocr: false,
    })
}

/// Full extraction pipeline with OCR fallback and floor gating.
pub async fn extract_with_fallback(
    bytes: &[u8],
    http: &reqwest::Client,
    ocr_endpoint: Option<&str>,
    min_chars: usize,
    floor_chars: usize,
) -> Result<ExtractedDocument, ExtractError> {
    let mut extracted = extract_text(bytes)?;

    if extracted.text.len() < min_chars {
        warn!(
            chars = extracted.text.len(),
            min_chars, "extraction below threshold, trying OCR collaborator"
        );
        if let Some(endpoint) = ocr_endpoint {
            match ocr_text(http, endpoint, bytes).await {
                Ok(Some(ocr)) if ocr.len() > extracted.text.len() => {
                    extracted.text = ocr;
                    extracted.used_ocr = true;
                }
                Ok(_) => {}
                Err(e) => warn!("OCR collaborator failed: {e}"),
            }
        }
    }

    if extracted.text.len() < floor_chars {
        return Err(ExtractError::TooLittleText {
            chars: extracted.text.len(),
            floor: floor_chars,
        });
    }
    Ok(extracted)
}

/// POSTs the raw document to the OCR endpoint; expects plain text back.
/// `Ok(None)` when the collaborator has nothing to offer.
async fn ocr_text(
    http: &reqwest::Client,
    endpoint: &str,
    bytes: &[u8],
) -> anyhow::Result<Option<String>> {
    let response = http
        .post(endpoint)
        .header("content-type", "application/pdf")
        .body(bytes.to_vec())
        .send()
        .await
        .context("OCR request failed")?;

    if !response.status().is_success() {
        anyhow::bail!("OCR endpoint returned {}", response.status());
    }
    let text = response.text().await.context("OCR response unreadable")?;
    let text = text.trim().to_string();
    Ok(if text.is_empty() { None } else { Some(text) })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Document, Object};

    #[test]
    fn test_invalid_pdf_rejected() {
        let err = extract_text(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidPdf(_)));
    }

    #[tokio::test]
    async fn test_floor_gating_rejects_empty_documents() {
        // A structurally valid PDF with no text at all.
        let mut doc = Document::with_version("1.7");
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        });
        if let Ok(dict) = doc
            .get_object_mut(page_id)
            .and_then(|o| o.as_dict_mut())
        {
            dict.set("Parent", Object::Reference(pages_id));
        }
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let http = reqwest::Client::new();
        let err = extract_with_fallback(&bytes, &http, None, 180, 40)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::TooLittleText { .. }));
    }
}
