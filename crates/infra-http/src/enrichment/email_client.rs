// Apollo bulk-match email finder.
// Ported from the original source's `ApolloEmailFinder`.

use async_trait::async_trait;
use leadsignal_core::application::RetryPolicy;
use leadsignal_core::domain::{DecisionMakerResult, EmailLookupResult};
use leadsignal_core::error::{AppError, Result};
use leadsignal_core::port::email_client::EmailClient;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(30);
const APOLLO_BULK_MATCH_URL: &str = "https://api.apollo.io/api/v1/people/bulk_match";
const APOLLO_MAX_BATCH: usize = 10;

struct LookupItem {
    company_name: String,
    person_name: String,
    first_name: String,
    last_name: String,
    domain: Option<String>,
}

pub struct ApolloEmailClient {
    client: reqwest::Client,
    api_key: String,
    batch_size: usize,
    retry: RetryPolicy,
}

impl ApolloEmailClient {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, batch_size: usize) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            batch_size: batch_size.clamp(1, APOLLO_MAX_BATCH),
            retry: RetryPolicy::default_enricher(),
        }
    }

    async fn call_apollo(&self, batch: &[LookupItem]) -> Result<serde_json::Value> {
        let details: Vec<serde_json::Value> = batch
            .iter()
            .map(|item| {
                let mut detail = serde_json::json!({
                    "first_name": item.first_name,
                    "last_name": item.last_name,
                    "organization_name": item.company_name,
                });
                if let Some(domain) = &item.domain {
                    detail["domain"] = serde_json::Value::String(domain.clone());
                }
                detail
            })
            .collect();

        let payload = serde_json::json!({
            "reveal_personal_emails": false,
            "details": details,
        });

        let response = self
            .client
            .post(APOLLO_BULK_MATCH_URL)
            .header("x-api-key", &self.api_key)
            .json(&payload)
            .timeout(TIMEOUT)
            .send()
            .await
            .map_err(|e| if e.is_timeout() || e.is_connect() { AppError::Transient(format!("apollo: {e}")) } else { AppError::Http(format!("apollo: {e}")) })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::Transient(format!("apollo rate limited: {status}")));
        }
        if !status.is_success() {
            return Err(AppError::Http(format!("apollo returned {status}")));
        }

        response.json().await.map_err(|e| AppError::ParseFailed(format!("apollo body: {e}")))
    }

    async fn process_batch(&self, batch: &[LookupItem]) -> Result<Vec<EmailLookupResult>> {
        let data = self.retry.run(|| self.call_apollo(batch)).await?;
        let matches = data.get("matches").and_then(|v| v.as_array()).cloned().unwrap_or_default();

        let results = batch
            .iter()
            .enumerate()
            .map(|(i, item)| match matches.get(i) {
                Some(serde_json::Value::Null) | None => EmailLookupResult {
                    company_name: item.company_name.clone(),
                    person_name: item.person_name.clone(),
                    email: None,
                    linkedin_url: None,
                    apollo_title: None,
                    not_found_reason: Some("No match found in Apollo".into()),
                },
                Some(m) => {
                    let email = m.get("email").and_then(|v| v.as_str()).map(str::to_string);
                    let linkedin_url = m.get("linkedin_url").and_then(|v| v.as_str()).map(str::to_string);
                    let apollo_title = m.get("title").and_then(|v| v.as_str()).map(str::to_string);
                    let not_found_reason = if email.is_none() { Some("Matched but no email available".to_string()) } else { None };
                    EmailLookupResult {
                        company_name: item.company_name.clone(),
                        person_name: item.person_name.clone(),
                        email,
                        linkedin_url,
                        apollo_title,
                        not_found_reason,
                    }
                }
            })
            .collect();
        Ok(results)
    }
}

#[async_trait]
impl EmailClient for ApolloEmailClient {
    async fn find_emails(&self, decision_makers: &[DecisionMakerResult]) -> Result<Vec<EmailLookupResult>> {
        let items: Vec<LookupItem> = decision_makers
            .iter()
            .filter_map(|dm| {
                let person_name = dm.person_name.clone()?;
                let (first_name, last_name) = split_name(&person_name);
                if first_name.is_empty() {
                    return None;
                }
                // `DecisionMakerResult` doesn't carry the company's website (only a
                // proof-of-role `source_url`), so Apollo gets `organization_name`
                // only; this loses the domain-based disambiguation the Python
                // version had when a website was on hand.
                Some(LookupItem {
                    company_name: dm.company_name.clone(),
                    person_name,
                    first_name,
                    last_name,
                    domain: None,
                })
            })
            .collect();

        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_results = Vec::new();
        for batch in items.chunks(self.batch_size) {
            match self.process_batch(batch).await {
                Ok(results) => all_results.extend(results),
                Err(e) => {
                    for item in batch {
                        all_results.push(EmailLookupResult {
                            company_name: item.company_name.clone(),
                            person_name: item.person_name.clone(),
                            email: None,
                            linkedin_url: None,
                            apollo_title: None,
                            not_found_reason: Some(format!("API error: {e}")),
                        });
                    }
                }
            }
        }
        Ok(all_results)
    }
}

fn split_name(full_name: &str) -> (String, String) {
    let parts: Vec<&str> = full_name.split_whitespace().collect();
    match parts.as_slice() {
        [] => (String::new(), String::new()),
        [first] => (first.to_string(), String::new()),
        [first, rest @ ..] => (first.to_string(), rest.join(" ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_two_part_name() {
        assert_eq!(split_name("Jane Doe"), ("Jane".to_string(), "Doe".to_string()));
    }

    #[test]
    fn splits_multi_part_name() {
        assert_eq!(split_name("Mary Jane Watson"), ("Mary".to_string(), "Jane Watson".to_string()));
    }

    #[test]
    fn single_name_has_empty_last() {
        assert_eq!(split_name("Cher"), ("Cher".to_string(), String::new()));
    }
}
