// Workable Widget API client.
// GET https://apply.workable.com/api/v1/widget/accounts/{token}

use super::map_reqwest_error;
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use leadsignal_core::domain::JobPosting;
use leadsignal_core::error::{AppError, Result};
use leadsignal_core::port::ats_client::AtsClient;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(15);

pub struct WorkableClient {
    client: reqwest::Client,
}

impl WorkableClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AtsClient for WorkableClient {
    async fn fetch_jobs(&self, token: &str) -> Result<Vec<JobPosting>> {
        let url = format!("https://apply.workable.com/api/v1/widget/accounts/{token}");
        let response = self.client.get(&url).timeout(TIMEOUT).send().await.map_err(|e| map_reqwest_error("workable", e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(AppError::Http(format!("workable returned {}", response.status())));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| AppError::ParseFailed(format!("workable body: {e}")))?;
        let jobs = body
            .get("jobs")
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
    let shortcode = job.get("shortcode").and_then(|v| v.as_str()).unwrap_or_default().to_string();
    let mut posting = JobPosting::new(
        shortcode.clone(),
        job.get("title").and_then(|v| v.as_str()).unwrap_or_default(),
        format!("https://apply.workable.com/{board_token}/j/{shortcode}/"),
    );
    posting.department = job.get("department").and_then(|v| v.as_str()).map(str::to_string);
    posting.location = format_location(&job);
    posting.description = job.get("description").and_then(|v| v.as_str()).map(str::to_string);
    posting.posting_date = job
        .get("published_on")
        .and_then(|v| v.as_str())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt));
    if let serde_json::Value::Object(map) = &job {
        posting.raw_data = map.clone().into_iter().collect();
    }
    posting
}

fn format_location(job: &serde_json::Value) -> Option<String> {
    let parts: Vec<&str> = ["city", "state", "country"]
        .iter()
        .filter_map(|field| job.get(*field).and_then(|v| v.as_str()))
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}
