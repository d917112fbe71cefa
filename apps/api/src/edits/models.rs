//! Session-owned data model for suggestions and applied edits.
//!
//! Suggestion text fields are immutable after creation — user action only
//! drives status transitions. The core matching/overlay functions receive
//! these by reference for the duration of one call and keep no state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::overlay::geometry::BoundingBox;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    Pending,
    Accepted,
    Rejected,
    /// Accepted and successfully located in the document.
    Mapped,
}

/// Optional context the suggestion collaborator may attach; not required
/// for matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextContext {
    pub before: String,
    pub after: String,
}

/// One AI-proposed replacement. `original_snippet` and `proposed_text` are
/// opaque strings — no semantic validation of their truthfulness happens
/// here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: Uuid,
    pub section: String,
    pub original_snippet: String,
    pub proposed_text: String,
    pub reason: String,
    pub risk_level: RiskLevel,
    pub status: SuggestionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_context: Option<TextContext>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    Replace,
    Insert,
    Delete,
}

/// An accepted-and-located suggestion, ready for application. At most one
/// edit exists per suggestion id: the change set is rebuilt from the
/// suggestion list at export, never accumulated incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedEdit {
    pub suggestion_id: Uuid,
    pub page_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    pub mode: EditMode,
    pub original_text: String,
    pub new_text: String,
}

/// Ordered collection of edits handed to the rendering step. Assembled
/// immediately before export, never partially persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeSet {
    pub edits: Vec<AppliedEdit>,
    pub created_at: DateTime<Utc>,
    pub preview: String,
}

impl ChangeSet {
    pub fn new(edits: Vec<AppliedEdit>) -> Self {
        let preview = edits
            .iter()
            .map(|e| format!("{} -> {}", truncate(&e.original_text), truncate(&e.new_text)))
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            edits,
            created_at: Utc::now(),
            preview,
        }
    }
}

fn truncate(text: &str) -> String {
    const LIMIT: usize = 40;
    if text.chars().count() <= LIMIT {
        text.to_string()
    } else {
        let head: String = text.chars().take(LIMIT).collect();
        format!("{head}…")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_edit(id: Uuid, new_text: &str) -> AppliedEdit {
        AppliedEdit {
            suggestion_id: id,
            page_index: 0,
            bbox: None,
            mode: EditMode::Replace,
            original_text: "old".to_string(),
            new_text: new_text.to_string(),
        }
    }

    #[test]
    fn test_preview_truncates_long_text() {
        let long = "x".repeat(100);
        let set = ChangeSet::new(vec![make_edit(Uuid::new_v4(), &long)]);
        assert!(set.preview.contains('…'));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&SuggestionStatus::Mapped).unwrap();
        assert_eq!(json, "\"mapped\"");
        let json = serde_json::to_string(&RiskLevel::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}
