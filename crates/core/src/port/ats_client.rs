// ATS Client Port
//
// One trait, nine implementations (one per provider), all living in
// `leadsignal-infra-http::ats_clients`.

use crate::domain::JobPosting;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait AtsClient: Send + Sync {
    /// Fetch the current job list for one board token. A 404 is a normal
    /// empty result (§4.4), not an error; rate-limit/server errors propagate
    /// as `AppError::Transient`/`AppError::Http`.
    async fn fetch_jobs(&self, token: &str) -> Result<Vec<JobPosting>>;
}
