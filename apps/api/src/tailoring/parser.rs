//! Parsing of raw model replies.
//!
//! Two tolerated shapes: the four-section labeled free text of the simple
//! flow, and strict JSON (optionally inside a markdown code fence) for the
//! structured flow. Section parsing is a single pass over the lines with an
//! explicit current-section state, so boundaries are unambiguous even when
//! headers repeat or arrive mid-reply.

use serde::Serialize;
use thiserror::Error;

/// Max characters of the offending payload carried in a parse error.
/// Keeps diagnostics useful without ever embedding a full model reply.
const SNIPPET_LIMIT: usize = 200;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to parse JSON response: {snippet}")]
    Json { snippet: String },
}

impl ParseError {
    fn json(text: &str) -> Self {
        ParseError::Json {
            snippet: text.chars().take(SNIPPET_LIMIT).collect(),
        }
    }
}

/// Output of the simple four-section flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TailoredSections {
    pub role_fit: String,
    pub experience_justification: String,
    pub summary: String,
    pub tailored_resume: String,
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    RoleFit,
    ExperienceJustification,
    Summary,
    TailoredResume,
}

const HEADERS: [(&str, Section); 4] = [
    ("ROLE_FIT", Section::RoleFit),
    ("EXPERIENCE_JUSTIFICATION", Section::ExperienceJustification),
    ("SUMMARY", Section::Summary),
    ("TAILORED_RESUME", Section::TailoredResume),
];

/// Splits a free-text reply into its four labeled sections. Content
/// accumulates under the most recently seen header; text after the colon on
/// the header line itself is kept. A reply with no recognizable header at
/// all lands wholesale in `tailored_resume` — nothing is discarded.
pub fn parse_sections(text: &str) -> TailoredSections {
    let mut sections = TailoredSections::default();
    let mut current: Option<Section> = None;
    let mut content: Vec<&str> = Vec::new();
    let mut any_header = false;

    let mut flush = |section: Option<Section>, content: &mut Vec<&str>, out: &mut TailoredSections| {
        if let Some(section) = section {
            let text = content.join("\n").trim().to_string();
            match section {
                Section::RoleFit => out.role_fit = text,
                Section::ExperienceJustification => out.experience_justification = text,
                Section::Summary => out.summary = text,
                Section::TailoredResume => out.tailored_resume = text,
            }
        }
        content.clear();
    };

    for line in text.lines() {
        match match_header(line) {
            Some((section, rest)) => {
                flush(current, &mut content, &mut sections);
                current = Some(section);
                any_header = true;
                if !rest.is_empty() {
                    content.push(rest);
                }
            }
            None => {
                if current.is_some() {
                    content.push(line);
                }
            }
        }
    }
    flush(current, &mut content, &mut sections);

    if !any_header {
        sections.tailored_resume = text.to_string();
    }

    sections
}

/// Recognizes a header line; returns the section and any content trailing
/// the colon. Match is case-insensitive and probes the four headers in a
/// fixed order, so the parse is restartable from any line.
fn match_header(line: &str) -> Option<(Section, &str)> {
    let upper = line.to_uppercase();
    let trimmed_upper = upper.trim();

    for (name, section) in HEADERS {
        let with_colon = format!("{name}:");
        if trimmed_upper == name {
            return Some((section, ""));
        }
        if upper.contains(&with_colon) {
            let rest = line
                .split_once(':')
                .map(|(_, rest)| rest.trim())
                .unwrap_or("");
            return Some((section, rest));
        }
    }
    None
}

/// Extracts a JSON value from a raw model reply. Direct decode first; on
/// failure, retries the contents of the first ```json or ``` fenced block;
/// if that also fails the error carries only a bounded prefix of the text.
pub fn extract_json(text: &str) -> Result<serde_json::Value, ParseError> {
    if let Ok(value) = serde_json::from_str(text) {
        return Ok(value);
    }

    if let Some(inner) = fenced_block(text) {
        if let Ok(value) = serde_json::from_str(inner) {
            return Ok(value);
        }
    }

    Err(ParseError::json(text))
}

/// Contents of the first fenced code block, if any.
fn fenced_block(text: &str) -> Option<&str> {
    let (marker, start) = if let Some(idx) = text.find("```json") {
        ("```json", idx)
    } else if let Some(idx) = text.find("```") {
        ("```", idx)
    } else {
        return None;
    };

    let body = &text[start + marker.len()..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}
