//! Axum route handlers for the session, suggestion, and export API.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use base64::Engine;
use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::edits::audit::{build_audit, AuditRecord};
use crate::edits::models::{
    AppliedEdit, ChangeSet, EditMode, Suggestion, SuggestionStatus,
};
use crate::edits::session::{Placement, Session};
use crate::edits::suggest::generate_suggestions;
use crate::edits::tracker::{apply_dom_edits, apply_overlay_edits};
use crate::errors::AppError;
use crate::extract::extract_with_fallback;
use crate::matching;
use crate::overlay::geometry::BoundingBox;
use crate::overlay::pdf::OverlayDocument;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub page_count: usize,
    pub extracted_chars: usize,
    pub used_ocr: bool,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub session_id: Uuid,
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Accept,
    Reject,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub action: ReviewAction,
    /// Overlay placement, when the caller knows where the snippet sits on
    /// the page. Zero-based page index; box in top-left page coordinates.
    pub page_index: Option<usize>,
    pub bbox: Option<BoundingBox>,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub suggestion_id: Uuid,
    pub status: SuggestionStatus,
    /// True when an accepted snippet was located in the document text.
    pub located: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    Dom,
    Overlay,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportRequest {
    /// Defaults to DOM when the session carries an HTML reconstruction,
    /// otherwise overlay.
    pub mode: Option<ExportMode>,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub session_id: Uuid,
    pub mode: &'static str,
    pub applied: usize,
    pub unmatched: Vec<Uuid>,
    pub preview: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    /// Base64-encoded edited PDF, overlay mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_base64: Option<String>,
    pub audit: AuditRecord,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
///
/// Multipart upload: `resume` (the PDF), `jd_text` (plain text), optional
/// `html` (a structured reconstruction of the résumé). Extracts text with
/// the OCR fallback and gating policy, then creates the in-memory session.
pub async fn handle_create_session(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CreateSessionResponse>, AppError> {
    let mut pdf_bytes: Option<Bytes> = None;
    let mut jd_text: Option<String> = None;
    let mut html_document: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        match field.name().unwrap_or_default() {
            "resume" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read resume: {e}")))?;
                pdf_bytes = Some(data);
            }
            "jd_text" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read jd_text: {e}")))?;
                jd_text = Some(text);
            }
            "html" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read html: {e}")))?;
                html_document = Some(text);
            }
            other => {
                return Err(AppError::Validation(format!(
                    "unexpected multipart field '{other}'"
                )));
            }
        }
    }

    let pdf_bytes = pdf_bytes
        .ok_or_else(|| AppError::Validation("missing 'resume' file field".to_string()))?;
    let jd_text =
        jd_text.ok_or_else(|| AppError::Validation("missing 'jd_text' field".to_string()))?;
    if jd_text.trim().is_empty() {
        return Err(AppError::Validation("jd_text cannot be empty".to_string()));
    }

    let extracted = extract_with_fallback(
        &pdf_bytes,
        &state.http,
        state.config.ocr_endpoint.as_deref(),
        state.config.min_extract_chars,
        state.config.extract_floor_chars,
    )
    .await?;

    let session = Session {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        pdf_bytes,
        extracted_text: extracted.text,
        page_count: extracted.page_count,
        jd_text,
        html_document,
        suggestions: vec![],
        placements: Default::default(),
    };
    let response = CreateSessionResponse {
        session_id: session.id,
        page_count: session.page_count,
        extracted_chars: session.extracted_text.len(),
        used_ocr: extracted.used_ocr,
    };
    info!(session_id = %session.id, pages = session.page_count, "session created");
    state.sessions.insert(session);

    Ok(Json(response))
}

/// POST /api/v1/sessions/:id/suggestions
///
/// Runs the suggestion pipeline against the session's extracted text and
/// replaces any previous suggestion list. Re-running resets review state.
pub async fn handle_generate_suggestions(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    let session = state
        .sessions
        .get(session_id)
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

    let suggestions =
        generate_suggestions(&state.llm, &session.extracted_text, &session.jd_text).await?;

    state.sessions.with_mut(session_id, |s| {
        s.suggestions = suggestions.clone();
        s.placements.clear();
    });

    Ok(Json(SuggestionsResponse {
        session_id,
        suggestions,
    }))
}

/// GET /api/v1/sessions/:id/suggestions
pub async fn handle_list_suggestions(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    let session = state
        .sessions
        .get(session_id)
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

    Ok(Json(SuggestionsResponse {
        session_id,
        suggestions: session.suggestions,
    }))
}

/// PATCH /api/v1/sessions/:id/suggestions/:sid
///
/// Accept or reject one suggestion. On accept the snippet is located in
/// the document (HTML reconstruction when present, extracted text
/// otherwise); a located suggestion moves to `mapped`, an unlocatable one
/// stays `accepted` and will be reported unmatched at export.
pub async fn handle_review_suggestion(
    State(state): State<AppState>,
    Path((session_id, suggestion_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<ReviewResponse>, AppError> {
    let session = state
        .sessions
        .get(session_id)
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

    let suggestion = session
        .suggestions
        .iter()
        .find(|s| s.id == suggestion_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Suggestion {suggestion_id} not found")))?;

    if let Some(page_index) = request.page_index {
        if page_index >= session.page_count {
            return Err(AppError::Validation(format!(
                "page_index {page_index} out of range for a {}-page document",
                session.page_count
            )));
        }
    }
    if let Some(bbox) = &request.bbox {
        if bbox.is_degenerate() {
            return Err(AppError::Validation(
                "bbox must have positive, finite dimensions".to_string(),
            ));
        }
    }

    let (status, located) = match request.action {
        ReviewAction::Reject => (SuggestionStatus::Rejected, false),
        ReviewAction::Accept => {
            let document = session
                .html_document
                .as_deref()
                .unwrap_or(&session.extracted_text);
            if matching::can_locate(document, &suggestion.original_snippet) {
                (SuggestionStatus::Mapped, true)
            } else {
                (SuggestionStatus::Accepted, false)
            }
        }
    };

    state.sessions.with_mut(session_id, |s| {
        if let Some(stored) = s.suggestions.iter_mut().find(|s| s.id == suggestion_id) {
            stored.status = status;
        }
        match request.action {
            ReviewAction::Accept => {
                s.placements.insert(
                    suggestion_id,
                    Placement {
                        page_index: request.page_index.unwrap_or(0),
                        bbox: request.bbox,
                    },
                );
            }
            ReviewAction::Reject => {
                s.placements.remove(&suggestion_id);
            }
        }
    });

    Ok(Json(ReviewResponse {
        suggestion_id,
        status,
        located,
    }))
}

/// POST /api/v1/sessions/:id/export
///
/// Assembles the change set from accepted suggestions and renders the
/// edited artifact. DOM mode splices the HTML reconstruction; overlay mode
/// covers each placed box on the original PDF and re-draws the text.
pub async fn handle_export(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ExportRequest>,
) -> Result<Json<ExportResponse>, AppError> {
    let session = state
        .sessions
        .get(session_id)
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

    let mode = request.mode.unwrap_or(if session.html_document.is_some() {
        ExportMode::Dom
    } else {
        ExportMode::Overlay
    });

    // An empty change set still exports: the caller gets the unmodified
    // artifact with a zero applied count.
    let change_set = assemble_change_set(&session);
    let audit = build_audit(&session.suggestions);

    match mode {
        ExportMode::Dom => {
            let document = session.html_document.as_deref().ok_or_else(|| {
                AppError::Validation(
                    "session has no HTML reconstruction; use overlay mode".to_string(),
                )
            })?;
            let (html, outcome) = apply_dom_edits(document, &change_set.edits);
            info!(session_id = %session_id, applied = outcome.applied, "DOM export complete");
            Ok(Json(ExportResponse {
                session_id,
                mode: "dom",
                applied: outcome.applied,
                unmatched: outcome.unmatched,
                preview: change_set.preview,
                html: Some(html),
                pdf_base64: None,
                audit,
            }))
        }
        ExportMode::Overlay => {
            let mut overlay = OverlayDocument::load(&session.pdf_bytes)
                .map_err(|e| AppError::Extraction(format!("failed to reopen PDF: {e}")))?;
            let outcome = apply_overlay_edits(&mut overlay, &change_set.edits, &state.applier)?;
            let bytes = overlay.save()?;
            info!(session_id = %session_id, applied = outcome.applied, "overlay export complete");
            Ok(Json(ExportResponse {
                session_id,
                mode: "overlay",
                applied: outcome.applied,
                unmatched: outcome.unmatched,
                preview: change_set.preview,
                html: None,
                pdf_base64: Some(base64::engine::general_purpose::STANDARD.encode(bytes)),
                audit,
            }))
        }
    }
}

/// GET /api/v1/sessions/:id/audit
pub async fn handle_get_audit(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<AuditRecord>, AppError> {
    let session = state
        .sessions
        .get(session_id)
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

    Ok(Json(build_audit(&session.suggestions)))
}

/// Builds the ordered change set from every accepted or mapped suggestion,
/// pairing each with its review-time placement when one exists.
fn assemble_change_set(session: &Session) -> ChangeSet {
    let edits = session
        .suggestions
        .iter()
        .filter(|s| {
            matches!(
                s.status,
                SuggestionStatus::Accepted | SuggestionStatus::Mapped
            )
        })
        .map(|s| {
            let placement = session.placements.get(&s.id);
            AppliedEdit {
                suggestion_id: s.id,
                page_index: placement.map(|p| p.page_index).unwrap_or(0),
                bbox: placement.and_then(|p| p.bbox),
                mode: EditMode::Replace,
                original_text: s.original_snippet.clone(),
                new_text: s.proposed_text.clone(),
            }
        })
        .collect();
    ChangeSet::new(edits)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
