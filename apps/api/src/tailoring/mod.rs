//! Tailoring orchestration — composes prompt building, the model client,
//! and response parsing into one operation, then normalizes whatever the
//! model returned into a `TailorResponse` the rest of the system can trust.
//!
//! Post-processing invariants enforced here no matter what the model says:
//! fit_score lands in 0–100, the summary is never empty, and every tailored
//! experience entry traces back to a real resume entry.

pub mod handlers;
pub mod parser;
pub mod prompts;

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::{CompletionOptions, LlmError, ModelClient};
use crate::models::job::{
    JobPosting, TailoredExperience, TailoredResume, TailoringOptions, TailorResponse,
};
use crate::models::resume::ResumeProfile;
use crate::tailoring::parser::{ParseError, TailoredSections};

/// Minimum plausible length for raw resume/job text in the simple flow.
const MIN_TEXT_LEN: usize = 50;

/// fit_score used when the model omits the field entirely.
const DEFAULT_FIT_SCORE: i64 = 50;

#[derive(Debug, Error)]
pub enum TailorError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Model call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Could not parse model response: {0}")]
    Parse(#[from] ParseError),
}

/// Outcome of the simple four-section flow.
#[derive(Debug, Clone)]
pub struct SectionTailorOutcome {
    pub sections: TailoredSections,
    pub tokens_used: u32,
    pub model: String,
}

/// The tailoring service. Holds the model client by value (it is a cheap
/// handle); constructed once at startup and shared through `AppState`.
#[derive(Clone)]
pub struct TailorService {
    client: ModelClient,
}

impl TailorService {
    pub fn new(client: ModelClient) -> Self {
        Self { client }
    }

    /// Structured flow: validates input, runs the model with a strict JSON
    /// contract, and returns the normalized result. Fails with a typed
    /// validation, client, or parse error — never a half-filled response.
    pub async fn tailor(
        &self,
        resume: &ResumeProfile,
        job: &JobPosting,
        options: &TailoringOptions,
    ) -> Result<TailorResponse, TailorError> {
        validate_request(resume, job)?;

        info!(
            candidate = %resume.name,
            target_company = %job.company,
            target_role = %job.title,
            model = %options.model,
            "Starting resume tailoring"
        );

        let user_prompt = prompts::build_tailor_prompt(resume, job);
        let completion = self
            .client
            .complete(
                prompts::RESUME_TAILOR_SYSTEM,
                &user_prompt,
                &CompletionOptions {
                    model: Some(options.model.clone()),
                    json_response: true,
                },
            )
            .await?;

        let value = parser::extract_json(&completion.content)?;
        let response = build_response(&value, resume, options, completion.tokens_used);

        info!(
            fit_score = response.tailored_resume.fit_score,
            tokens_used = response.tokens_used,
            suggestions = response.suggestions.len(),
            "Resume tailoring completed"
        );

        Ok(response)
    }

    /// Simple flow: raw resume and job text in, four labeled sections out.
    /// An unstructured reply is still returned — the parser's catch-all
    /// puts it in `tailored_resume` rather than discarding it.
    pub async fn tailor_text(
        &self,
        resume_text: &str,
        job_text: &str,
        options: &TailoringOptions,
    ) -> Result<SectionTailorOutcome, TailorError> {
        if resume_text.trim().len() < MIN_TEXT_LEN {
            return Err(TailorError::Validation(
                "Resume text is too short to tailor".to_string(),
            ));
        }
        if job_text.trim().len() < MIN_TEXT_LEN {
            return Err(TailorError::Validation(
                "Job description text is too short to tailor".to_string(),
            ));
        }

        let user_prompt = prompts::build_section_prompt(resume_text, job_text);
        let completion = self
            .client
            .complete(
                prompts::SECTION_TAILOR_SYSTEM,
                &user_prompt,
                &CompletionOptions {
                    model: Some(options.model.clone()),
                    json_response: false,
                },
            )
            .await?;

        Ok(SectionTailorOutcome {
            sections: parser::parse_sections(&completion.content),
            tokens_used: completion.tokens_used,
            model: options.model.clone(),
        })
    }
}

/// Rejects requests that would waste a model call. Runs before any
/// external call is made.
fn validate_request(resume: &ResumeProfile, job: &JobPosting) -> Result<(), TailorError> {
    if resume.name.trim().is_empty() {
        return Err(TailorError::Validation(
            "Resume is missing the candidate name".to_string(),
        ));
    }
    if job.title.trim().is_empty() || job.company.trim().is_empty() {
        return Err(TailorError::Validation(
            "Job posting is missing title or company".to_string(),
        ));
    }
    if job.description.trim().is_empty() {
        return Err(TailorError::Validation(
            "Job posting has no description to tailor against".to_string(),
        ));
    }
    Ok(())
}

/// Builds the normalized response from the model's JSON. Field defaults
/// follow the structured-flow policy: summary falls back to the original,
/// skills_highlighted to the first 5 resume skills, fit_score to 50 — and
/// the score is clamped into 0–100 whatever the model claimed.
fn build_response(
    value: &Value,
    resume: &ResumeProfile,
    options: &TailoringOptions,
    tokens_used: u32,
) -> TailorResponse {
    let tailored = value.get("tailored_resume").cloned().unwrap_or_default();

    let summary = match tailored.get("summary").and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => resume.summary.clone(),
    };

    let experience = tailored
        .get("experience")
        .and_then(Value::as_array)
        .map(|entries| traceable_experience(entries, resume))
        .unwrap_or_default();

    let skills_highlighted = match tailored.get("skills_highlighted") {
        Some(v) => string_list(v),
        None => resume.skills.iter().take(5).cloned().collect(),
    };

    let keywords_matched = tailored
        .get("keywords_matched")
        .map(string_list)
        .unwrap_or_default();

    let fit_score = tailored
        .get("fit_score")
        .and_then(Value::as_f64)
        .map(|v| v.round() as i64)
        .unwrap_or(DEFAULT_FIT_SCORE)
        .clamp(0, 100) as u8;

    let suggestions = value
        .get("suggestions")
        .map(string_list)
        .unwrap_or_default();

    TailorResponse {
        tailored_resume: TailoredResume {
            summary,
            experience,
            skills_highlighted,
            keywords_matched,
            fit_score,
        },
        suggestions,
        tokens_used,
        model: options.model.clone(),
    }
}

/// Converts model experience entries, keeping only those that trace to an
/// original resume entry by (title, company), case-insensitive. The model
/// may reorder and rewrite — it may not invent.
fn traceable_experience(entries: &[Value], resume: &ResumeProfile) -> Vec<TailoredExperience> {
    let originals: Vec<(String, String)> = resume
        .experience
        .iter()
        .map(|e| (e.title.to_lowercase(), e.company.to_lowercase()))
        .collect();

    let mut kept = Vec::new();
    for entry in entries {
        let exp = TailoredExperience {
            title: str_field(entry, "title"),
            company: str_field(entry, "company"),
            start_date: str_field(entry, "start_date"),
            end_date: entry
                .get("end_date")
                .and_then(Value::as_str)
                .map(String::from),
            description: str_field(entry, "description"),
            highlights: entry.get("highlights").map(string_list).unwrap_or_default(),
        };

        let key = (exp.title.to_lowercase(), exp.company.to_lowercase());
        if originals.contains(&key) {
            kept.push(exp);
        } else {
            warn!(
                title = %exp.title,
                company = %exp.company,
                "Dropping tailored experience entry with no matching original"
            );
        }
    }
    kept
}

fn str_field(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
