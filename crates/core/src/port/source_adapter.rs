// Source Adapter Port

use crate::domain::JobPosting;
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// A company candidate yielded by a source adapter, before dedup or ATS
/// detection. `pre_extracted_jobs` is populated by adapters (e.g. the
/// repository listing) that already carry job listings and so skip ATS
/// detection entirely for that candidate.
#[derive(Debug, Clone, Default)]
pub struct CompanyCandidate {
    pub name: String,
    pub domain: String,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub keywords: Option<String>,
    pub employee_count: Option<i64>,
    pub pre_extracted_jobs: Vec<JobPosting>,
}

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Yield the candidate set, optionally filtered to a single source date.
    async fn fetch_candidates(&self, date_filter: Option<NaiveDate>) -> Result<Vec<CompanyCandidate>>;
}
