// Job Change Domain Model

use super::job::Job;
use chrono::{DateTime, Utc};

/// A change in job status between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    New,
    Removed,
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChangeType::New => "new",
            ChangeType::Removed => "removed",
        };
        write!(f, "{s}")
    }
}

/// One row of `job_changes`. `job_id` is `None` for a freshly detected `new`
/// change until the job row is inserted and an id assigned.
#[derive(Debug, Clone)]
pub struct JobChange {
    pub job_id: Option<i64>,
    pub external_id: String,
    pub title: String,
    pub company_name: String,
    pub change_type: ChangeType,
    pub job_url: String,
}

/// Report produced by the set-diff in `application::change_detect`, before
/// it has been applied to the Store.
#[derive(Debug, Clone)]
pub struct ChangeReport {
    pub run_id: String,
    pub run_date: DateTime<Utc>,
    pub company_id: i64,
    pub company_name: String,
    pub new_jobs: Vec<JobChange>,
    pub removed_jobs: Vec<JobChange>,
    /// Full scored `Job` rows backing `new_jobs`, keyed by `external_id`, so
    /// the store can insert category/department/location/description/
    /// posting_date/relevance_score instead of just the `JobChange` summary
    /// fields.
    pub jobs_to_insert: Vec<Job>,
    /// `Job.id` of rows present in both the previously-active set and the
    /// freshly fetched set: no `JobChange` is emitted, but `last_seen_at`
    /// must still advance to this run (§8 invariant 2).
    pub touched_ids: Vec<i64>,
    pub total_active: usize,
}

impl ChangeReport {
    pub fn is_empty(&self) -> bool {
        self.new_jobs.is_empty() && self.removed_jobs.is_empty()
    }
}
