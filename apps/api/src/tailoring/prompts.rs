// All prompt constants for the tailoring module, plus the formatters that
// flatten resume/job structures into prompt text. Nothing here truncates
// input — if a model has a context limit, the caller chunks, not this file.

use crate::models::job::JobPosting;
use crate::models::resume::ResumeProfile;

/// System prompt for the structured flow — enforces a JSON reply.
pub const RESUME_TAILOR_SYSTEM: &str = "\
You are an expert resume writer and career coach with extensive experience \
helping candidates land their dream jobs. Your task is to tailor a candidate's \
resume to match a specific job description while maintaining authenticity and \
highlighting relevant experience.

Guidelines:
1. Match keywords from the job description naturally - don't force them
2. Quantify achievements where possible (percentages, numbers, dollar amounts)
3. Prioritize experience most relevant to the target role
4. Maintain a professional and confident tone
5. NEVER fabricate experience, skills, or achievements
6. Focus on transferable skills when direct experience is limited
7. Use action verbs to describe accomplishments
8. Keep content concise and impactful

You must return a valid JSON response with the tailored content.";

/// User prompt template for the structured flow.
/// Replace: {resume}, {company}, {job_title}, {job_description},
///          {requirements}, {preferred}
pub const RESUME_TAILOR_USER_TEMPLATE: &str = r#"## Original Resume
{resume}

## Target Job Description
Company: {company}
Title: {job_title}
Description: {job_description}
Requirements: {requirements}
Preferred: {preferred}

## Task
Tailor this resume for the target position. Return a JSON object with the following structure:

{
  "tailored_resume": {
    "summary": "A rewritten professional summary (2-3 sentences) that aligns with this specific role",
    "experience": [
      {
        "title": "Job Title",
        "company": "Company Name",
        "start_date": "Start Date",
        "end_date": "End Date or null if current",
        "description": "Tailored role description emphasizing relevant responsibilities",
        "highlights": ["Achievement 1 with metrics", "Achievement 2 relevant to target role"]
      }
    ],
    "skills_highlighted": ["Most relevant skill 1", "Most relevant skill 2"],
    "keywords_matched": ["Keyword from job description that matches resume"],
    "fit_score": 85
  },
  "suggestions": [
    "Actionable suggestion 1 for improving resume",
    "Actionable suggestion 2 for better keyword matching"
  ]
}

Important:
- fit_score should be 0-100 based on how well the resume matches requirements
- Only include experience entries from the original resume (reordered/tailored)
- skills_highlighted should prioritize skills mentioned in the job description
- keywords_matched should list keywords from the job that appear in/match the resume
- suggestions should be specific and actionable"#;

/// System prompt for the simple flow — replies in four labeled sections.
pub const SECTION_TAILOR_SYSTEM: &str = "\
You are an expert resume writer and career coach. Your task is to tailor \
resumes to match specific job descriptions while maintaining authenticity and \
professionalism.

When tailoring a resume, you must:
1. Analyze the job description to identify key requirements, skills, and qualifications
2. Highlight relevant experience and skills from the original resume that match the job
3. Reframe existing experience to better align with the job requirements
4. Use industry-specific keywords from the job description naturally
5. Maintain truthfulness - never fabricate experience or skills

Your response MUST be structured with clearly labeled sections:
1. ROLE_FIT: A brief analysis of how the candidate fits the role (2-3 sentences)
2. EXPERIENCE_JUSTIFICATION: Key experiences and achievements that justify the candidate for this role (bullet points)
3. SUMMARY: A tailored professional summary for the resume (2-3 sentences)
4. TAILORED_RESUME: The complete tailored resume content";

/// User prompt template for the simple flow.
/// Replace: {resume}, {job_description}
pub const SECTION_TAILOR_USER_TEMPLATE: &str = r#"Please tailor the following resume for the job description provided.

=== ORIGINAL RESUME ===
{resume}

=== JOB DESCRIPTION ===
{job_description}

=== INSTRUCTIONS ===
Analyze the job description carefully and tailor the resume to highlight relevant skills and experience. Structure your response with the following sections:
- ROLE_FIT: Brief analysis of candidate-role alignment
- EXPERIENCE_JUSTIFICATION: Key matching experiences as bullet points
- SUMMARY: Tailored professional summary
- TAILORED_RESUME: Complete tailored resume

Ensure the tailored resume maintains professional formatting and authenticity."#;

/// Builds the structured-flow user message from a resume and posting.
pub fn build_tailor_prompt(resume: &ResumeProfile, job: &JobPosting) -> String {
    RESUME_TAILOR_USER_TEMPLATE
        .replace("{resume}", &format_resume_for_prompt(resume))
        .replace("{company}", &job.company)
        .replace("{job_title}", &job.title)
        .replace("{job_description}", &job.description)
        .replace("{requirements}", &format_list(&job.requirements))
        .replace("{preferred}", &format_list(&job.preferred))
}

/// Builds the simple-flow user message from raw resume and job text.
pub fn build_section_prompt(resume_text: &str, job_text: &str) -> String {
    SECTION_TAILOR_USER_TEMPLATE
        .replace("{resume}", resume_text)
        .replace("{job_description}", job_text)
}

/// Flattens a resume into readable prompt text. Every field the candidate
/// provided is included verbatim.
pub fn format_resume_for_prompt(resume: &ResumeProfile) -> String {
    let mut lines = vec![
        format!("Name: {}", resume.name),
        format!("Email: {}", resume.email),
        format!("\nSummary:\n{}", resume.summary),
    ];

    if !resume.experience.is_empty() {
        lines.push("\nExperience:".to_string());
        for exp in &resume.experience {
            let end = exp.end_date.as_deref().unwrap_or("Present");
            lines.push(format!(
                "- {} at {} ({} - {})",
                exp.title, exp.company, exp.start_date, end
            ));
            lines.push(format!("  {}", exp.description));
            for highlight in &exp.highlights {
                lines.push(format!("    • {highlight}"));
            }
        }
    }

    if !resume.skills.is_empty() {
        lines.push(format!("\nSkills: {}", resume.skills.join(", ")));
    }

    if !resume.education.is_empty() {
        lines.push("\nEducation:".to_string());
        for edu in &resume.education {
            lines.push(format!(
                "- {} from {} ({})",
                edu.degree, edu.institution, edu.graduation_date
            ));
        }
    }

    lines.join("\n")
}

fn format_list(items: &[String]) -> String {
    if items.is_empty() {
        return "Not specified".to_string();
    }
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}
