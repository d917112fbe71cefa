// Prompt constants for the suggestion pipeline.
// Each service that needs LLM calls defines its prompts here, next to the
// client, so reviewers can read the whole contract in one place.

/// System prompt for suggestion generation — enforces JSON-only output.
pub const SUGGESTION_SYSTEM: &str = "You are an expert resume editor. \
    You propose precise text replacements that tailor a resume to a job \
    description without inventing facts. \
    You MUST respond with valid JSON only — a JSON array of suggestion objects. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences. \
    Do NOT invent experience, employers, dates, or numbers not present in the resume.";

/// Suggestion prompt template. Replace `{resume_text}` and `{jd_text}`
/// before sending.
pub const SUGGESTION_PROMPT_TEMPLATE: &str = r#"Propose targeted text replacements that improve this resume for the job description below.

Return a JSON ARRAY of suggestion objects with this EXACT schema (no extra fields):
[
  {
    "section": "experience",
    "original_snippet": "Managed a team of 5 engineers",
    "proposed_text": "Led a team of 5 engineers delivering the billing platform",
    "reason": "Stronger verb and ties the work to a concrete deliverable",
    "risk_level": "low",
    "confidence": 0.9
  }
]

HARD RULES:
1. `original_snippet` MUST be copied VERBATIM from the resume text — character for character, including punctuation. It is used to locate the text for replacement; a paraphrase will fail to match.
2. Keep snippets short and unique: one phrase or sentence, never a whole paragraph.
3. `proposed_text` must stay truthful to the resume — rephrase and reframe, never fabricate.
4. `risk_level` is "low" (pure wording), "medium" (reframing emphasis), or "high" (could change how a fact reads).
5. `confidence` is a number between 0 and 1.
6. `section` names the resume section the snippet sits in ("summary", "experience", "skills", "education", ...).
7. Propose at most 12 suggestions, highest impact first.

RESUME TEXT:
{resume_text}

JOB DESCRIPTION:
{jd_text}"#;
