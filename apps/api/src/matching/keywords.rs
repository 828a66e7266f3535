//! API-free keyword analysis between a resume and a posting.
//!
//! The main fit score comes from the model response; these helpers give a
//! deterministic supplementary score and keyword overlap without spending
//! tokens, so ranking pages and reports can render before any tailoring run.

use regex::Regex;

use crate::models::job::JobPosting;
use crate::models::resume::ResumeProfile;

/// Keyword-based fit score in 0–100: requirements coverage weighs 60,
/// preferred coverage 30, plus a base 10 for having a complete resume.
/// A posting without requirement/preferred lists gets half weight for the
/// missing section.
pub fn fallback_fit_score(resume: &ResumeProfile, job: &JobPosting) -> u8 {
    let resume_text = resume_match_text(resume);

    let matched_required = count_matched(&job.requirements, &resume_text);
    let matched_preferred = count_matched(&job.preferred, &resume_text);

    let req_score = if job.requirements.is_empty() {
        30.0
    } else {
        matched_required as f64 / job.requirements.len() as f64 * 60.0
    };
    let pref_score = if job.preferred.is_empty() {
        15.0
    } else {
        matched_preferred as f64 / job.preferred.len() as f64 * 30.0
    };
    let base_score = 10.0;

    (req_score + pref_score + base_score).clamp(0.0, 100.0) as u8
}

/// Keywords from the posting (alphabetic, longer than 4 chars) that appear
/// whole-word in the resume. Longest first, capped at 20 — longer keywords
/// are more specific.
pub fn matched_keywords(resume: &ResumeProfile, job: &JobPosting) -> Vec<String> {
    let resume_text = resume_match_text(resume);

    let job_text = [
        job.description.clone(),
        job.requirements.join(" "),
        job.preferred.join(" "),
    ]
    .join(" ")
    .to_lowercase();

    let mut candidates: Vec<String> = job_text
        .split_whitespace()
        .map(|w| w.trim_matches(|c| ".,!?;:()[]{}".contains(c)).to_string())
        .filter(|w| w.len() > 4 && w.chars().all(|c| c.is_alphabetic()))
        .collect();
    candidates.sort();
    candidates.dedup();

    let mut matched: Vec<String> = candidates
        .into_iter()
        .filter(|word| {
            Regex::new(&format!(r"\b{}\b", regex::escape(word)))
                .map(|re| re.is_match(&resume_text))
                .unwrap_or(false)
        })
        .collect();

    matched.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    matched.truncate(20);
    matched
}

/// Flattens the searchable resume fields into one lowercase haystack.
fn resume_match_text(resume: &ResumeProfile) -> String {
    let mut parts = vec![resume.summary.clone(), resume.skills.join(" ")];
    for exp in &resume.experience {
        parts.push(exp.description.clone());
        parts.push(exp.highlights.join(" "));
    }
    parts.join(" ").to_lowercase()
}

/// A requirement counts as matched when any of its significant words
/// (longer than 3 chars) appears in the resume text.
fn count_matched(items: &[String], resume_text: &str) -> usize {
    items
        .iter()
        .filter(|item| {
            item.split_whitespace()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| w.len() > 3)
                .any(|w| resume_text.contains(&w))
        })
        .count()
}
