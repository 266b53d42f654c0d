// Ashby Public Job Board API client.
// GET https://api.ashbyhq.com/posting-api/job-board/{token}

use super::{map_reqwest_error, value_to_id_string};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadsignal_core::domain::JobPosting;
use leadsignal_core::error::{AppError, Result};
use leadsignal_core::port::ats_client::AtsClient;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(15);

pub struct AshbyClient {
    client: reqwest::Client,
}

impl AshbyClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AtsClient for AshbyClient {
    async fn fetch_jobs(&self, token: &str) -> Result<Vec<JobPosting>> {
        let url = format!("https://api.ashbyhq.com/posting-api/job-board/{token}");
        let response = self.client.get(&url).timeout(TIMEOUT).send().await.map_err(|e| map_reqwest_error("ashby", e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(AppError::Http(format!("ashby returned {}", response.status())));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| AppError::ParseFailed(format!("ashby body: {e}")))?;
        let jobs = body.get("jobs").and_then(|v| v.as_array()).cloned().unwrap_or_default().into_iter().map(parse_job).collect();
        Ok(jobs)
    }
}

fn parse_job(job: serde_json::Value) -> JobPosting {
    let mut posting = JobPosting::new(
        value_to_id_string(job.get("id")),
        job.get("title").and_then(|v| v.as_str()).unwrap_or_default(),
        job.get("jobUrl").and_then(|v| v.as_str()).unwrap_or_default(),
    );
    posting.department = job.get("departmentName").and_then(|v| v.as_str()).map(str::to_string);
    posting.location = job.get("locationName").and_then(|v| v.as_str()).map(str::to_string);
    posting.description = job
        .get("descriptionHtml")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .or_else(|| job.get("descriptionPlain").and_then(|v| v.as_str()))
        .map(str::to_string);
    posting.posting_date = job
        .get("publishedDate")
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));
    if let serde_json::Value::Object(map) = &job {
        posting.raw_data = map.clone().into_iter().collect();
    }
    posting
}
