//! Posting normalization and filtering ahead of scoring.
//!
//! Mirrors the ingest step that narrows a scraped batch down to target
//! titles, locations, and a compensation floor before any scoring happens.

use tracing::info;

use crate::models::job::JobPosting;

/// Criteria for narrowing a scraped batch. Empty title/location lists match
/// everything; `min_compensation: None` disables the compensation floor.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub titles: Vec<String>,
    pub locations: Vec<String>,
    pub min_compensation: Option<f64>,
}

impl JobFilter {
    /// Applies title, location, and compensation filters in order,
    /// case-insensitive substring matching throughout. A posting without a
    /// location fails a non-empty location filter; a posting without a
    /// numeric compensation fails the floor when one is set.
    pub fn apply(&self, jobs: Vec<JobPosting>) -> Vec<JobPosting> {
        let total = jobs.len();

        let jobs: Vec<JobPosting> = jobs
            .into_iter()
            .filter(|job| matches_any(&job.title, &self.titles))
            .collect();
        info!("Found {} jobs after title filter", jobs.len());

        let jobs: Vec<JobPosting> = jobs
            .into_iter()
            .filter(|job| match &job.location {
                Some(location) => matches_any(location, &self.locations),
                None => self.locations.is_empty(),
            })
            .collect();
        info!("Found {} jobs after location filter", jobs.len());

        let jobs: Vec<JobPosting> = match self.min_compensation {
            Some(min) => jobs
                .into_iter()
                .filter(|job| job.compensation.is_some_and(|c| c >= min))
                .collect(),
            None => jobs,
        };
        info!(
            "Filtered down to {} of {} jobs matching all criteria",
            jobs.len(),
            total
        );

        jobs
    }
}

fn matches_any(value: &str, targets: &[String]) -> bool {
    if targets.is_empty() {
        return true;
    }
    let value = value.to_lowercase();
    targets
        .iter()
        .any(|t| value.contains(t.trim().to_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_job(title: &str, location: Option<&str>, compensation: Option<f64>) -> JobPosting {
        JobPosting {
            job_id: String::new(),
            platform: String::new(),
            title: title.to_string(),
            company: "Acme".to_string(),
            description: String::new(),
            location: location.map(|l| l.to_string()),
            recruiter: None,
            compensation,
            requirements: vec![],
            preferred: vec![],
        }
    }

    #[test]
    fn test_title_filter_is_case_insensitive_substring() {
        let filter = JobFilter {
            titles: vec!["engineer".to_string()],
            ..Default::default()
        };
        let jobs = vec![
            make_job("Senior Software Engineer", None, None),
            make_job("Product Manager", None, None),
        ];
        let kept = filter.apply(jobs);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Senior Software Engineer");
    }

    #[test]
    fn test_empty_criteria_keeps_everything() {
        let jobs = vec![make_job("Anything", None, None)];
        assert_eq!(JobFilter::default().apply(jobs).len(), 1);
    }

    #[test]
    fn test_missing_location_fails_location_filter() {
        let filter = JobFilter {
            locations: vec!["remote".to_string()],
            ..Default::default()
        };
        let jobs = vec![
            make_job("Engineer", Some("Remote, US"), None),
            make_job("Engineer", None, None),
        ];
        assert_eq!(filter.apply(jobs).len(), 1);
    }

    #[test]
    fn test_compensation_floor_drops_missing_and_low() {
        let filter = JobFilter {
            min_compensation: Some(150_000.0),
            ..Default::default()
        };
        let jobs = vec![
            make_job("A", None, Some(180_000.0)),
            make_job("B", None, Some(120_000.0)),
            make_job("C", None, None),
        ];
        let kept = filter.apply(jobs);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "A");
    }

    #[test]
    fn test_no_floor_keeps_missing_compensation() {
        let jobs = vec![make_job("A", None, None)];
        assert_eq!(JobFilter::default().apply(jobs).len(), 1);
    }
}
