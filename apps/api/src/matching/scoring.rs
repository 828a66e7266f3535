//! Deterministic job scoring against extracted resume skills.
//!
//! One whole-word, case-insensitive pattern is built from all skills; each
//! job scores the number of distinct skills found in its description. No
//! model call, no randomness — re-scoring the same inputs gives the same
//! ranking.

use regex::Regex;
use tracing::warn;

use crate::models::job::{JobPosting, ScoredJob};

/// Scores and ranks postings against resume skills, descending by score.
/// Ties keep the original input order. An empty skill list scores every job
/// 0 rather than failing; a posting with an empty description scores 0.
pub fn score_jobs(jobs: &[JobPosting], skills: &[String]) -> Vec<ScoredJob> {
    if jobs.is_empty() {
        return vec![];
    }

    let pattern = build_skills_pattern(skills);
    if pattern.is_none() && !skills.is_empty() {
        warn!("Could not build skills pattern; all job scores will be 0");
    }

    let mut scored: Vec<ScoredJob> = jobs
        .iter()
        .map(|job| {
            let matched = pattern
                .as_ref()
                .map(|re| matched_skills(re, &job.description))
                .unwrap_or_default();
            ScoredJob {
                job: job.clone(),
                score: matched.len() as u32,
                matched_skills: matched,
            }
        })
        .collect();

    // Vec::sort_by is stable: equal scores preserve input order.
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// Builds the whole-word alternation over all skills, e.g. `\b(python|aws)\b`.
/// Word boundaries avoid matching "ai" inside "strait". Returns None when
/// there is nothing to match.
fn build_skills_pattern(skills: &[String]) -> Option<Regex> {
    let escaped: Vec<String> = skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(regex::escape)
        .collect();

    if escaped.is_empty() {
        return None;
    }

    let pattern = format!(r"(?i)\b({})\b", escaped.join("|"));
    Regex::new(&pattern).ok()
}

/// Distinct skills found in a description. A skill repeated in the text
/// counts once.
fn matched_skills(pattern: &Regex, description: &str) -> Vec<String> {
    let mut found = Vec::new();
    for m in pattern.find_iter(&description.to_lowercase()) {
        let token = m.as_str().to_string();
        if !found.contains(&token) {
            found.push(token);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_job(job_id: &str, description: &str) -> JobPosting {
        JobPosting {
            job_id: job_id.to_string(),
            platform: "linkedin".to_string(),
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            description: description.to_string(),
            location: None,
            recruiter: None,
            compensation: None,
            requirements: vec![],
            preferred: vec![],
        }
    }

    fn skills(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_distinct_skill_count() {
        let jobs = vec![make_job(
            "j-1",
            "Looking for a Python and Kubernetes engineer",
        )];
        let scored = score_jobs(&jobs, &skills(&["python", "aws", "kubernetes"]));

        assert_eq!(scored[0].score, 2);
        assert_eq!(scored[0].matched_skills, vec!["python", "kubernetes"]);
    }

    #[test]
    fn test_repeated_skill_counts_once() {
        let jobs = vec![make_job("j-1", "Python, python, and more Python")];
        let scored = score_jobs(&jobs, &skills(&["python"]));
        assert_eq!(scored[0].score, 1);
    }

    #[test]
    fn test_whole_word_matching_avoids_substrings() {
        let jobs = vec![make_job("j-1", "Sailing through the strait of Gibraltar")];
        let scored = score_jobs(&jobs, &skills(&["ai"]));
        assert_eq!(scored[0].score, 0);
    }

    #[test]
    fn test_empty_job_list_returns_empty() {
        assert!(score_jobs(&[], &skills(&["python"])).is_empty());
    }

    #[test]
    fn test_empty_skills_scores_all_zero() {
        let jobs = vec![make_job("j-1", "Python engineer"), make_job("j-2", "SRE")];
        let scored = score_jobs(&jobs, &[]);
        assert_eq!(scored.len(), 2);
        assert!(scored.iter().all(|s| s.score == 0));
    }

    #[test]
    fn test_empty_description_scores_zero() {
        let jobs = vec![make_job("j-1", "")];
        let scored = score_jobs(&jobs, &skills(&["python"]));
        assert_eq!(scored[0].score, 0);
        assert!(scored[0].matched_skills.is_empty());
    }

    #[test]
    fn test_sorted_descending_with_stable_ties() {
        let jobs = vec![
            make_job("low", "no relevant keywords here"),
            make_job("tie-a", "Python required"),
            make_job("high", "Python, AWS and Kubernetes"),
            make_job("tie-b", "We love Python"),
        ];
        let scored = score_jobs(&jobs, &skills(&["python", "aws", "kubernetes"]));

        let ids: Vec<&str> = scored.iter().map(|s| s.job.job_id.as_str()).collect();
        assert_eq!(ids, vec!["high", "tie-a", "tie-b", "low"]);
    }

    #[test]
    fn test_rescoring_is_idempotent() {
        let jobs = vec![
            make_job("j-1", "Python and AWS"),
            make_job("j-2", "Kubernetes"),
            make_job("j-3", "Python"),
        ];
        let resume_skills = skills(&["python", "aws", "kubernetes"]);

        let first = score_jobs(&jobs, &resume_skills);
        let second = score_jobs(&jobs, &resume_skills);

        let summarize = |scored: &[ScoredJob]| -> Vec<(String, u32)> {
            scored
                .iter()
                .map(|s| (s.job.job_id.clone(), s.score))
                .collect()
        };
        assert_eq!(summarize(&first), summarize(&second));
    }

    #[test]
    fn test_skill_with_regex_metacharacters_is_escaped() {
        let jobs = vec![make_job("j-1", "Experience with C++ required")];
        let scored = score_jobs(&jobs, &skills(&["c++"]));
        // The escaped pattern must not panic; `c++` ends on a non-word char
        // so the trailing \b does not match — score stays 0, batch survives.
        assert_eq!(scored.len(), 1);
    }

    #[test]
    fn test_case_insensitive_matching() {
        let jobs = vec![make_job("j-1", "PYTHON and KuBeRnEtEs")];
        let scored = score_jobs(&jobs, &skills(&["python", "kubernetes"]));
        assert_eq!(scored[0].score, 2);
    }
}
