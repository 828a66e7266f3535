//! Skill extraction from a markdown master resume.
//!
//! Looks for a single `## SKILLS` section and collects its bulleted or
//! comma-separated items. A resume without a skills section is not an error:
//! the caller gets an empty list and every downstream score is 0.

use regex::Regex;

/// Extracts distinct, lowercase, trimmed skill tokens from the `## SKILLS`
/// section of a resume. Section match is case-insensitive and stops at the
/// next `##` header or end of document. Output order follows first
/// occurrence in the text; duplicates are removed.
pub fn extract_skills(resume_text: &str) -> Vec<String> {
    // The regex crate has no lookahead, so the terminator is consumed
    // rather than asserted. The captured group is the section body.
    let section_re = Regex::new(r"(?is)##\s*skills\s*\n(.*?)(?:\n##|\z)")
        .expect("Invalid skills section regex");

    let Some(section) = section_re
        .captures(resume_text)
        .and_then(|c| c.get(1).map(|m| m.as_str()))
    else {
        return vec![];
    };

    let bullet_re = Regex::new(r"-\s*(.*)").expect("Invalid bullet regex");

    let mut skills = Vec::new();
    for capture in bullet_re.captures_iter(section) {
        let line = capture.get(1).map(|m| m.as_str()).unwrap_or_default();
        for item in line.split(',') {
            let token = item.trim().to_lowercase();
            if !token.is_empty() && !skills.contains(&token) {
                skills.push(token);
            }
        }
    }

    skills
}
