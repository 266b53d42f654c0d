// Bulk People-Enrichment (Email Finder) Client Port

use crate::domain::{DecisionMakerResult, EmailLookupResult};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait EmailClient: Send + Sync {
    /// Look up emails for a batch of confirmed decision makers (at most the
    /// provider's documented batch maximum; the caller is responsible for
    /// splitting a larger list into batches).
    async fn find_emails(
        &self,
        decision_makers: &[DecisionMakerResult],
    ) -> Result<Vec<EmailLookupResult>>;
}
