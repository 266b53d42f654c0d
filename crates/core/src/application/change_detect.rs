// Three-way set-diff change detection (§4.5 stage 8, §5 ordering guarantee)
//
// Pure function: given the company's currently-active jobs (read from the
// Store before this run's writes) and the freshly fetched+scored postings,
// compute which jobs are new, which have disappeared, and which are simply
// still present. No I/O here; the orchestrator applies the result inside one
// Store transaction.

use crate::domain::job::{Job, JobPosting};
use crate::domain::{ChangeReport, ChangeType, JobChange};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Everything the orchestrator needs to apply stage 8 atomically.
#[derive(Debug, Clone)]
pub struct DetectedChanges {
    pub report: ChangeReport,
    /// Previously unseen external ids, or external ids reactivating after a
    /// prior removal (§3 lifecycle: "a previously removed external id
    /// reappears"). Either way the Store call is an upsert that reactivates.
    pub jobs_to_insert: Vec<Job>,
    /// `Job.id` of rows whose external id is no longer in `fetched`.
    pub ids_to_deactivate: Vec<i64>,
    /// `Job.id` of rows present in both sets; `last_seen_at` should advance.
    pub ids_to_touch: Vec<i64>,
}

pub fn detect_changes(
    company_id: i64,
    company_name: &str,
    run_id: &str,
    run_date: DateTime<Utc>,
    active_jobs: &[Job],
    fetched: &[JobPosting],
) -> DetectedChanges {
    let active_by_external_id: HashMap<&str, &Job> =
        active_jobs.iter().map(|j| (j.external_id.as_str(), j)).collect();
    let fetched_by_external_id: HashMap<&str, &JobPosting> =
        fetched.iter().map(|p| (p.external_id.as_str(), p)).collect();

    let mut new_jobs = Vec::new();
    let mut jobs_to_insert = Vec::new();
    let mut ids_to_touch = Vec::new();

    for posting in fetched {
        match active_by_external_id.get(posting.external_id.as_str()) {
            Some(existing) => {
                if let Some(id) = existing.id {
                    ids_to_touch.push(id);
                }
            }
            None => {
                new_jobs.push(JobChange {
                    job_id: None,
                    external_id: posting.external_id.clone(),
                    title: posting.title.clone(),
                    company_name: company_name.to_string(),
                    change_type: ChangeType::New,
                    job_url: posting.job_url.clone(),
                });
                jobs_to_insert.push(Job::from_posting(posting.clone(), company_id));
            }
        }
    }

    let mut removed_jobs = Vec::new();
    let mut ids_to_deactivate = Vec::new();

    for job in active_jobs {
        if !fetched_by_external_id.contains_key(job.external_id.as_str()) {
            removed_jobs.push(JobChange {
                job_id: job.id,
                external_id: job.external_id.clone(),
                title: job.title.clone(),
                company_name: company_name.to_string(),
                change_type: ChangeType::Removed,
                job_url: job.job_url.clone(),
            });
            if let Some(id) = job.id {
                ids_to_deactivate.push(id);
            }
        }
    }

    let total_active = fetched.len();

    DetectedChanges {
        report: ChangeReport {
            run_id: run_id.to_string(),
            run_date,
            company_id,
            company_name: company_name.to_string(),
            new_jobs,
            removed_jobs,
            jobs_to_insert: jobs_to_insert.clone(),
            touched_ids: ids_to_touch.clone(),
            total_active,
        },
        jobs_to_insert,
        ids_to_deactivate,
        ids_to_touch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::VerificationStatus;

    fn active_job(id: i64, external_id: &str) -> Job {
        Job {
            id: Some(id),
            company_id: 1,
            external_id: external_id.to_string(),
            title: "Marketing Manager".into(),
            category: Some("marketing".into()),
            department: None,
            location: None,
            description: None,
            job_url: format!("https://boards.example/{external_id}"),
            posting_date: None,
            discovered_at: Some(Utc::now()),
            last_seen_at: Some(Utc::now()),
            is_active: true,
            relevance_score: Some(80.0),
            verification_status: VerificationStatus::Unverified,
        }
    }

    fn posting(external_id: &str) -> JobPosting {
        JobPosting::new(external_id, "Marketing Manager", format!("https://boards.example/{external_id}"))
    }

    #[test]
    fn empty_active_and_fetched_produces_no_changes() {
        let result = detect_changes(1, "Acme", "run-1", Utc::now(), &[], &[]);
        assert!(result.report.is_empty());
        assert!(result.jobs_to_insert.is_empty());
        assert!(result.ids_to_deactivate.is_empty());
    }

    #[test]
    fn new_external_id_is_a_new_change() {
        let result = detect_changes(1, "Acme", "run-1", Utc::now(), &[], &[posting("1")]);
        assert_eq!(result.report.new_jobs.len(), 1);
        assert_eq!(result.jobs_to_insert.len(), 1);
        assert!(result.report.removed_jobs.is_empty());
    }

    #[test]
    fn disappeared_external_id_is_removed() {
        let active = vec![active_job(10, "1")];
        let result = detect_changes(1, "Acme", "run-1", Utc::now(), &active, &[]);
        assert_eq!(result.report.removed_jobs.len(), 1);
        assert_eq!(result.ids_to_deactivate, vec![10]);
    }

    #[test]
    fn present_in_both_sets_is_touched_not_changed() {
        let active = vec![active_job(10, "1")];
        let result = detect_changes(1, "Acme", "run-1", Utc::now(), &active, &[posting("1")]);
        assert!(result.report.is_empty());
        assert_eq!(result.ids_to_touch, vec![10]);
    }

    #[test]
    fn reactivation_emits_new_change_for_reappearing_id() {
        // scenario 3: a job was removed (so it is not in `active_jobs`
        // anymore, having been marked inactive in a prior run), then
        // reappears. The diff treats it exactly like any other new id.
        let result = detect_changes(1, "Acme", "run-2", Utc::now(), &[], &[posting("1")]);
        assert_eq!(result.report.new_jobs.len(), 1);
        assert_eq!(result.report.new_jobs[0].external_id, "1");
    }
}
