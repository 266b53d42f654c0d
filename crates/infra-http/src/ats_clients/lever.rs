// Lever Public Postings API client.
// GET https://api.lever.co/v0/postings/{token}?mode=json&limit=50&offset=N
// Paginates via `offset` in pages of 50 until a short page arrives (§4.4).

use super::{map_reqwest_error, value_to_id_string};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadsignal_core::domain::JobPosting;
use leadsignal_core::error::{AppError, Result};
use leadsignal_core::port::ats_client::AtsClient;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(15);
const PAGE_SIZE: u32 = 50;

pub struct LeverClient {
    client: reqwest::Client,
}

impl LeverClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AtsClient for LeverClient {
    async fn fetch_jobs(&self, token: &str) -> Result<Vec<JobPosting>> {
        let mut all_jobs = Vec::new();
        let mut offset = 0u32;

        loop {
            let url = format!(
                "https://api.lever.co/v0/postings/{token}?mode=json&limit={PAGE_SIZE}&offset={offset}"
            );
            let response = self
                .client
                .get(&url)
                .timeout(TIMEOUT)
                .send()
                .await
                .map_err(|e| map_reqwest_error("lever", e))?;

            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(Vec::new());
            }
            if !response.status().is_success() {
                return Err(AppError::Http(format!("lever returned {}", response.status())));
            }

            let postings: Vec<serde_json::Value> = response
                .json()
                .await
                .map_err(|e| AppError::ParseFailed(format!("lever body: {e}")))?;

            if postings.is_empty() {
                break;
            }

            let page_len = postings.len();
            all_jobs.extend(postings.into_iter().map(parse_job));

            if page_len < PAGE_SIZE as usize {
                break;
            }
            offset += PAGE_SIZE;
        }

        Ok(all_jobs)
    }
}

fn parse_job(posting: serde_json::Value) -> JobPosting {
    let categories = posting.get("categories").cloned().unwrap_or(serde_json::Value::Null);
    let mut job = JobPosting::new(
        value_to_id_string(posting.get("id")),
        posting.get("text").and_then(|v| v.as_str()).unwrap_or_default(),
        posting.get("hostedUrl").and_then(|v| v.as_str()).unwrap_or_default(),
    );
    job.department = categories
        .get("department")
        .or_else(|| categories.get("team"))
        .and_then(|v| v.as_str())
        .map(str::to_string);
    job.location = categories.get("location").and_then(|v| v.as_str()).map(str::to_string);
    job.description = posting.get("descriptionPlain").and_then(|v| v.as_str()).map(str::to_string);
    job.posting_date = posting
        .get("createdAt")
        .and_then(|v| v.as_i64())
        .and_then(|ms| DateTime::from_timestamp_millis(ms))
        .map(|dt| dt.with_timezone(&Utc));
    if let serde_json::Value::Object(map) = &posting {
        job.raw_data = map.clone().into_iter().collect();
    }
    job
}
