//! Suggestion pipeline: one LLM call per generation request, followed by
//! local validation. Suggestions whose snippet cannot be located in the
//! extracted text are kept but logged; the caller sees the confidence the
//! model reported and decides for itself.

use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::edits::models::{RiskLevel, Suggestion, SuggestionStatus};
use crate::llm_client::{prompts, LlmClient, LlmError};
use crate::matching;

/// Wire shape of one suggestion as the model returns it. Converted into the
/// session-owned `Suggestion` after validation.
#[derive(Debug, Deserialize)]
struct RawSuggestion {
    section: String,
    original_snippet: String,
    proposed_text: String,
    reason: String,
    risk_level: RiskLevel,
    confidence: Option<f32>,
}

const MAX_SUGGESTIONS: usize = 12;

/// Asks the LLM for replacement suggestions against the extracted résumé
/// text. Empty or unmatched snippets are dropped here rather than surfacing
/// later as guaranteed matching failures.
pub async fn generate_suggestions(
    llm: &LlmClient,
    resume_text: &str,
    jd_text: &str,
) -> Result<Vec<Suggestion>, LlmError> {
    let prompt = prompts::SUGGESTION_PROMPT_TEMPLATE
        .replace("{resume_text}", resume_text)
        .replace("{jd_text}", jd_text);

    let raw: Vec<RawSuggestion> = llm.call_json(&prompt, prompts::SUGGESTION_SYSTEM).await?;
    debug!(count = raw.len(), "LLM returned suggestions");

    let mut suggestions = Vec::new();
    for s in raw.into_iter().take(MAX_SUGGESTIONS) {
        if s.original_snippet.trim().is_empty() || s.proposed_text.trim().is_empty() {
            warn!("dropping suggestion with empty snippet or replacement");
            continue;
        }
        if !matching::can_locate(resume_text, &s.original_snippet) {
            warn!(
                snippet = %s.original_snippet,
                "dropping suggestion whose snippet does not appear in the resume"
            );
            continue;
        }
        suggestions.push(Suggestion {
            id: Uuid::new_v4(),
            section: s.section,
            original_snippet: s.original_snippet,
            proposed_text: s.proposed_text,
            reason: s.reason,
            risk_level: s.risk_level,
            status: SuggestionStatus::Pending,
            confidence: s.confidence.map(|c| c.clamp(0.0, 1.0)),
            text_context: None,
        });
    }

    info!(count = suggestions.len(), "suggestion pipeline complete");
    Ok(suggestions)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
