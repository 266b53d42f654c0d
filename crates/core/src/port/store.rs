// Store Port
//
// Durable persistence of every entity in the data model, with transactional
// semantics sufficient for one writer at a time (§4.1). The SQLite adapter
// in `leadsignal-infra-sqlite` is the reference implementation.

use crate::domain::{ats::AtsProvider, Company, DecisionMakerResult, Job, JobChange, RunSnapshot};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Second element of `UpsertCompany`'s return: true when the row's
/// `last_csv_date` differed from today, or the row did not exist.
pub type IsNewOrResurfacing = bool;

/// A cached ATS detection result, as stored by `CacheSet`/returned by `CacheGet`.
#[derive(Debug, Clone)]
pub struct AtsCacheEntry {
    pub domain: String,
    pub provider: Option<AtsProvider>,
    pub board_token: Option<String>,
    pub detected_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct StoreStatistics {
    pub total_companies: i64,
    pub active_jobs: i64,
    pub relevant_jobs: i64,
    pub by_ats: Vec<(String, i64)>,
    pub by_category: Vec<(String, i64)>,
}

/// One row of an export projection (flat-per-job), joining `jobs`,
/// `companies`, and `decision_makers`.
#[derive(Debug, Clone)]
pub struct ExportRow {
    pub company_name: String,
    pub domain: String,
    pub industry: Option<String>,
    pub job_title: String,
    pub job_url: String,
    pub department: Option<String>,
    pub location: Option<String>,
    pub posting_date: Option<DateTime<Utc>>,
    pub relevance_score: Option<f64>,
    pub decision_maker_name: Option<String>,
    pub decision_maker_email: Option<String>,
    pub is_new_company: bool,
}

#[async_trait]
pub trait Store: Send + Sync {
    // -- Companies --
    async fn upsert_company(&self, company: &Company, run_date: DateTime<Utc>) -> Result<(i64, IsNewOrResurfacing)>;
    async fn update_company_ats(&self, company_id: i64, provider: Option<AtsProvider>, token: Option<&str>) -> Result<()>;
    async fn update_company_urgency(&self, company_id: i64, score: i64) -> Result<()>;
    async fn get_company_by_domain(&self, domain: &str) -> Result<Option<Company>>;
    async fn companies_sorted_by_recency(&self, limit: i64) -> Result<Vec<Company>>;
    async fn top_companies_by_urgency(&self, limit: i64) -> Result<Vec<Company>>;

    // -- Jobs --
    async fn insert_job(&self, job: &Job) -> Result<i64>;
    async fn mark_job_inactive(&self, job_id: i64, seen_at: DateTime<Utc>) -> Result<()>;
    async fn update_job_last_seen(&self, job_id: i64, seen_at: DateTime<Utc>) -> Result<()>;
    async fn update_job_verification(&self, job_id: i64, status: crate::domain::job::VerificationStatus) -> Result<()>;
    async fn active_jobs_for_company(&self, company_id: i64) -> Result<Vec<Job>>;

    // -- Change detection --
    /// Persists every `JobChange` in `report` transactionally alongside the
    /// `Job` row mutation that produced it (§5 ordering guarantee): new-job
    /// inserts, removed-job `is_active` flips, and still-active
    /// `last_seen_at` bumps all commit together, or none do.
    async fn apply_change_report(&self, report: &crate::domain::ChangeReport) -> Result<Vec<JobChange>>;

    // -- Decision makers --
    async fn upsert_decision_maker(&self, company_id: i64, result: &DecisionMakerResult) -> Result<()>;
    async fn get_decision_maker_for_company(&self, company_id: i64) -> Result<Option<DecisionMakerResult>>;

    // -- Seen companies --
    async fn is_company_seen(&self, domain: &str) -> Result<bool>;
    async fn mark_company_seen(&self, domain: &str, company_name: &str, source_date: DateTime<Utc>, run_id: &str) -> Result<()>;
    async fn reset_seen_companies(&self) -> Result<u64>;

    // -- ATS cache --
    async fn cache_get(&self, domain: &str) -> Result<Option<AtsCacheEntry>>;
    async fn cache_set(&self, domain: &str, provider: Option<AtsProvider>, token: Option<&str>, ttl_days: i64) -> Result<()>;
    async fn cache_clear_expired(&self) -> Result<u64>;

    // -- Run snapshots --
    async fn record_run_snapshot(&self, snapshot: &RunSnapshot) -> Result<()>;

    // -- Aggregate queries --
    async fn statistics(&self) -> Result<StoreStatistics>;
    async fn export_rows(&self, only_relevant: bool) -> Result<Vec<ExportRow>>;
}
