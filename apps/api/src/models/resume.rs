//! Resume data model — read-only input for a scoring/tailoring run.

use serde::{Deserialize, Serialize};

/// A single work experience entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub title: String,
    pub company: String,
    /// e.g. "2020-01"
    pub start_date: String,
    /// None means current position.
    pub end_date: Option<String>,
    pub description: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

/// An education entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub graduation_date: String,
    #[serde(default)]
    pub gpa: Option<f64>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

/// A candidate's resume. Immutable once loaded for a given run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeProfile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    pub summary: String,
    #[serde(default)]
    pub experience: Vec<Experience>,
    /// Lowercase, deduplicated skill tokens.
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub projects: Vec<String>,
}
