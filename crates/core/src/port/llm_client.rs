// Decision-Maker (LLM + Search Grounding) Client Port

use crate::domain::DecisionMakerResult;
use crate::error::Result;
use async_trait::async_trait;

/// One company to look up, as passed to a batch.
#[derive(Debug, Clone)]
pub struct DecisionMakerQuery {
    pub company_name: String,
    pub website: Option<String>,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Look up decision makers for a batch of companies in one call. The
    /// implementation's own retry policy governs transient failures inside
    /// the call; this method returns `Err` only when retries are exhausted,
    /// in which case the caller (the enrichment pipeline) records one
    /// best-effort error result per company rather than aborting.
    async fn find_decision_makers(
        &self,
        batch: &[DecisionMakerQuery],
    ) -> Result<Vec<DecisionMakerResult>>;
}
