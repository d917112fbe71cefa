//! Change-log artifact for export.
//!
//! The audit record is a pure projection of session state at export time:
//! reproducible from the suggestion list alone, no additional computation,
//! no storage of its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::edits::models::{Suggestion, SuggestionStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub section: String,
    pub original_text: String,
    pub replacement_text: String,
    pub reason: String,
    pub status: SuggestionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<AuditEntry>,
}

/// Builds the audit record from the session's suggestions, in input order.
pub fn build_audit(suggestions: &[Suggestion]) -> AuditRecord {
    AuditRecord {
        generated_at: Utc::now(),
        entries: suggestions
            .iter()
            .map(|s| AuditEntry {
                section: s.section.clone(),
                original_text: s.original_snippet.clone(),
                replacement_text: s.proposed_text.clone(),
                reason: s.reason.clone(),
                status: s.status,
            })
            .collect(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edits::models::RiskLevel;
    use uuid::Uuid;

    fn make_suggestion(section: &str, status: SuggestionStatus) -> Suggestion {
        Suggestion {
            id: Uuid::new_v4(),
            section: section.to_string(),
            original_snippet: "Managed a team".to_string(),
            proposed_text: "Led a team".to_string(),
            reason: "stronger verb".to_string(),
            risk_level: RiskLevel::Low,
            status,
            confidence: None,
            text_context: None,
        }
    }

    #[test]
    fn test_audit_preserves_order_and_statuses() {
        let suggestions = vec![
            make_suggestion("experience", SuggestionStatus::Mapped),
            make_suggestion("summary", SuggestionStatus::Rejected),
            make_suggestion("skills", SuggestionStatus::Pending),
        ];
        let record = build_audit(&suggestions);
        assert_eq!(record.entries.len(), 3);
        assert_eq!(record.entries[0].section, "experience");
        assert_eq!(record.entries[1].status, SuggestionStatus::Rejected);
        assert_eq!(record.entries[2].status, SuggestionStatus::Pending);
    }

    #[test]
    fn test_audit_of_empty_session() {
        let record = build_audit(&[]);
        assert!(record.entries.is_empty());
    }
}
