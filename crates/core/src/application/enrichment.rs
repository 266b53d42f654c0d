// Enrichment Pipeline (§4.6)
//
// DecisionMakerFinder batches companies to a search-grounded LLM; EmailFinder
// batches confirmed decision makers to a bulk people-enrichment API. Both go
// through the shared `RetryPolicy` combinator for transient/rate-limit
// failures, returning one best-effort error record per affected entry rather
// than aborting the batch (§4.6 "other exceptions return a single
// best-effort error record... without aborting the batch").

use crate::domain::{DecisionMakerResult, EmailLookupResult};
use crate::error::AppError;
use crate::port::email_client::EmailClient;
use crate::port::llm_client::{DecisionMakerQuery, LlmClient};
use crate::application::retry::RetryPolicy;

const LLM_BATCH_SIZE: usize = 5;
const EMAIL_BATCH_SIZE: usize = 10;

pub struct DecisionMakerFinder<'a, C: LlmClient> {
    client: &'a C,
    retry: RetryPolicy,
}

impl<'a, C: LlmClient> DecisionMakerFinder<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            retry: RetryPolicy::default_enricher(),
        }
    }

    /// Look up decision makers for every query, in batches of `LLM_BATCH_SIZE`.
    /// A batch that exhausts retries yields one error `DecisionMakerResult`
    /// per company in that batch rather than aborting the whole run.
    pub async fn find_all(&self, queries: &[DecisionMakerQuery]) -> Vec<DecisionMakerResult> {
        let mut results = Vec::with_capacity(queries.len());
        for batch in queries.chunks(LLM_BATCH_SIZE) {
            let outcome = self
                .retry
                .run(|| async { self.client.find_decision_makers(batch).await })
                .await;
            match outcome {
                Ok(batch_results) => results.extend(batch_results),
                Err(err) => {
                    for query in batch {
                        results.push(error_result(&query.company_name, &err));
                    }
                }
            }
        }
        results
    }
}

fn error_result(company_name: &str, err: &AppError) -> DecisionMakerResult {
    DecisionMakerResult::not_found(company_name, format!("lookup failed: {err}"))
}

pub struct EmailFinder<'a, C: EmailClient> {
    client: &'a C,
    retry: RetryPolicy,
}

impl<'a, C: EmailClient> EmailFinder<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            retry: RetryPolicy::default_enricher(),
        }
    }

    pub async fn find_all(&self, decision_makers: &[DecisionMakerResult]) -> Vec<EmailLookupResult> {
        let persistable: Vec<DecisionMakerResult> =
            decision_makers.iter().filter(|d| d.is_persistable()).cloned().collect();

        let mut results = Vec::with_capacity(persistable.len());
        for batch in persistable.chunks(EMAIL_BATCH_SIZE) {
            let outcome = self.retry.run(|| async { self.client.find_emails(batch).await }).await;
            match outcome {
                Ok(batch_results) => results.extend(batch_results),
                Err(err) => {
                    for dm in batch {
                        results.push(EmailLookupResult {
                            company_name: dm.company_name.clone(),
                            person_name: dm.person_name.clone().unwrap_or_default(),
                            not_found_reason: Some(format!("lookup failed: {err}")),
                            ..Default::default()
                        });
                    }
                }
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::cell::Cell;

    struct FlakyLlm {
        attempts: Cell<u32>,
    }

    #[async_trait]
    impl LlmClient for FlakyLlm {
        async fn find_decision_makers(
            &self,
            batch: &[DecisionMakerQuery],
        ) -> crate::error::Result<Vec<DecisionMakerResult>> {
            let n = self.attempts.get();
            self.attempts.set(n + 1);
            if n == 0 {
                return Err(AppError::Transient("429 rate limit".into()));
            }
            Ok(batch
                .iter()
                .map(|q| DecisionMakerResult {
                    company_name: q.company_name.clone(),
                    person_name: Some("Jane Doe".into()),
                    ..Default::default()
                })
                .collect())
        }
    }

    struct AlwaysFailsLlm;

    #[async_trait]
    impl LlmClient for AlwaysFailsLlm {
        async fn find_decision_makers(
            &self,
            _batch: &[DecisionMakerQuery],
        ) -> crate::error::Result<Vec<DecisionMakerResult>> {
            Err(AppError::ParseFailed("bad body".into()))
        }
    }

    #[tokio::test]
    async fn retries_transient_failure_then_succeeds() {
        let client = FlakyLlm { attempts: Cell::new(0) };
        let finder = DecisionMakerFinder::new(&client);
        let queries = vec![DecisionMakerQuery {
            company_name: "Acme".into(),
            website: None,
        }];
        let results = finder.find_all(&queries).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].person_name.as_deref(), Some("Jane Doe"));
    }

    #[tokio::test]
    async fn non_retryable_failure_yields_error_result_per_company() {
        let client = AlwaysFailsLlm;
        let finder = DecisionMakerFinder::new(&client);
        let queries = vec![
            DecisionMakerQuery {
                company_name: "Acme".into(),
                website: None,
            },
            DecisionMakerQuery {
                company_name: "Globex".into(),
                website: None,
            },
        ];
        let results = finder.find_all(&queries).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.not_found_reason.is_some()));
    }
}
