// Recruitee Public Careers API client.
// GET https://{token}.recruitee.com/api/offers/

use super::{map_reqwest_error, value_to_id_string};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadsignal_core::domain::JobPosting;
use leadsignal_core::error::{AppError, Result};
use leadsignal_core::port::ats_client::AtsClient;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(15);

pub struct RecruiteeClient {
    client: reqwest::Client,
}

impl RecruiteeClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AtsClient for RecruiteeClient {
    async fn fetch_jobs(&self, token: &str) -> Result<Vec<JobPosting>> {
        let url = format!("https://{token}.recruitee.com/api/offers/");
        let response = self.client.get(&url).timeout(TIMEOUT).send().await.map_err(|e| map_reqwest_error("recruitee", e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(AppError::Http(format!("recruitee returned {}", response.status())));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| AppError::ParseFailed(format!("recruitee body: {e}")))?;
        let jobs = body
            .get("offers")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|j| parse_job(j, token))
            .collect();
        Ok(jobs)
    }
}

fn parse_job(job: serde_json::Value, board_token: &str) -> JobPosting {
    let id = value_to_id_string(job.get("id"));
    let job_url = job
        .get("careers_url")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("https://{board_token}.recruitee.com/o/{id}"));

    let mut posting = JobPosting::new(id, job.get("title").and_then(|v| v.as_str()).unwrap_or_default(), job_url);
    posting.department = job.get("department").and_then(|v| v.as_str()).map(str::to_string);
    posting.location = job.get("location").and_then(|v| v.as_str()).map(str::to_string);
    posting.description = job.get("description").and_then(|v| v.as_str()).map(str::to_string);
    posting.posting_date = job
        .get("created_at")
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));
    if let serde_json::Value::Object(map) = &job {
        posting.raw_data = map.clone().into_iter().collect();
    }
    posting
}
