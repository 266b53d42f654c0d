// Run Audit Domain Model

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Per-company outcome recorded on a `RunSnapshot`. `FetchError` is kept
/// distinct from a successful empty fetch — see the resolved open question
/// in SPEC_FULL.md §4.5/§9.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyStatus {
    Success,
    Skipped,
    BlockedRobots,
    LinkedInOnly,
    UnknownAts,
    UnsupportedAts,
    FetchError,
}

impl CompanyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyStatus::Success => "success",
            CompanyStatus::Skipped => "skipped",
            CompanyStatus::BlockedRobots => "blocked_robots",
            CompanyStatus::LinkedInOnly => "linkedin_only",
            CompanyStatus::UnknownAts => "unknown_ats",
            CompanyStatus::UnsupportedAts => "unsupported_ats",
            CompanyStatus::FetchError => "fetch_error",
        }
    }
}

/// One `run_snapshots` row: a per-company audit record for one invocation.
#[derive(Debug, Clone)]
pub struct RunSnapshot {
    pub run_id: String,
    pub run_date: DateTime<Utc>,
    pub company_id: i64,
    pub jobs_found: i64,
    pub new_jobs: i64,
    pub removed_jobs: i64,
    pub status: CompanyStatus,
    pub error_message: Option<String>,
}

/// Aggregate summary of a complete discovery run, returned by the
/// orchestrator once all companies have been processed.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: String,
    pub run_date: DateTime<Utc>,
    pub elapsed_seconds: f64,
    pub companies_processed: usize,
    pub companies_successful: usize,
    pub total_jobs_found: i64,
    pub total_new_jobs: i64,
    pub total_removed_jobs: i64,
    pub by_status: HashMap<String, usize>,
    pub by_ats: HashMap<String, usize>,
}
