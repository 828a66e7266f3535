//! Job posting, tailoring request/response, and queue message models.

use serde::{Deserialize, Serialize};

use crate::models::resume::ResumeProfile;

/// Recruiter contact attached to a scraped posting, when the scraper found one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecruiterContact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_url: Option<String>,
}

/// A scraped job posting. `job_id` is unique within a run.
///
/// `description` tolerates a missing field in scraped records — an absent
/// description decodes to an empty string and scores 0 instead of failing
/// the whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub platform: String,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub recruiter: Option<RecruiterContact>,
    #[serde(default)]
    pub compensation: Option<f64>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub preferred: Vec<String>,
}

/// A posting plus its deterministic keyword-match score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredJob {
    pub job: JobPosting,
    /// Count of distinct resume skills matched in the description.
    pub score: u32,
    pub matched_skills: Vec<String>,
}

/// Options for a tailoring call. All fields have defined defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailoringOptions {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_focus_areas")]
    pub focus_areas: Vec<String>,
    #[serde(default = "default_tone")]
    pub tone: String,
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_focus_areas() -> Vec<String> {
    vec![
        "summary".to_string(),
        "experience".to_string(),
        "skills".to_string(),
    ]
}

fn default_tone() -> String {
    "professional".to_string()
}

impl Default for TailoringOptions {
    fn default() -> Self {
        Self {
            model: default_model(),
            focus_areas: default_focus_areas(),
            tone: default_tone(),
        }
    }
}

/// Request body for the structured tailoring endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TailorRequest {
    pub resume: ResumeProfile,
    pub job: JobPosting,
    #[serde(default)]
    pub options: Option<TailoringOptions>,
}

/// A rewritten experience entry. Every entry traces back to an original
/// resume entry by (title, company) — fabricated entries are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailoredExperience {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

/// Normalized tailoring output. `fit_score` is always within 0–100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailoredResume {
    pub summary: String,
    pub experience: Vec<TailoredExperience>,
    pub skills_highlighted: Vec<String>,
    pub keywords_matched: Vec<String>,
    pub fit_score: u8,
}

/// Response from the structured tailoring flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailorResponse {
    pub tailored_resume: TailoredResume,
    pub suggestions: Vec<String>,
    pub tokens_used: u32,
    pub model: String,
}

/// Input queue message: one tailoring job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailoringPayload {
    pub job: JobPosting,
    pub resume: ResumeProfile,
    #[serde(default)]
    pub options: Option<TailoringOptions>,
}

/// Output queue message: the tailoring result for one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailoredOutput {
    pub job_id: String,
    pub status: String,
    pub result: TailorResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tailoring_options_defaults() {
        let options = TailoringOptions::default();
        assert_eq!(options.model, "gpt-4");
        assert_eq!(options.focus_areas, vec!["summary", "experience", "skills"]);
        assert_eq!(options.tone, "professional");
    }

    #[test]
    fn test_tailoring_options_defaults_apply_per_field() {
        let options: TailoringOptions =
            serde_json::from_value(serde_json::json!({ "model": "gpt-3.5-turbo" })).unwrap();
        assert_eq!(options.model, "gpt-3.5-turbo");
        assert_eq!(options.tone, "professional");
    }

    #[test]
    fn test_job_posting_missing_description_decodes_empty() {
        let json = serde_json::json!({
            "job_id": "j-1",
            "platform": "linkedin",
            "title": "Backend Engineer",
            "company": "Acme"
        });
        let job: JobPosting = serde_json::from_value(json).unwrap();
        assert!(job.description.is_empty());
        assert!(job.compensation.is_none());
    }

    #[test]
    fn test_tailoring_payload_round_trips() {
        let payload = TailoringPayload {
            job: JobPosting {
                job_id: "j-42".to_string(),
                platform: "indeed".to_string(),
                title: "SRE".to_string(),
                company: "CloudCo".to_string(),
                description: "Kubernetes and Terraform".to_string(),
                location: None,
                recruiter: None,
                compensation: Some(180_000.0),
                requirements: vec![],
                preferred: vec![],
            },
            resume: ResumeProfile {
                name: "Alex Johnson".to_string(),
                email: "alex@example.com".to_string(),
                phone: None,
                location: None,
                linkedin: None,
                summary: "DevOps engineer.".to_string(),
                experience: vec![],
                skills: vec!["kubernetes".to_string()],
                education: vec![],
                certifications: vec![],
                projects: vec![],
            },
            options: None,
        };

        let json = serde_json::to_string(&payload).unwrap();
        let recovered: TailoringPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered.job.job_id, "j-42");
        assert_eq!(recovered.resume.skills, vec!["kubernetes"]);
        assert!(recovered.options.is_none());
    }
}
