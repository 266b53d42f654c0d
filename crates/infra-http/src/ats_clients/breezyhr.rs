// BreezyHR Public Jobs API client.
// GET https://{token}.breezy.hr/json — returns a bare JSON array.

use super::{map_reqwest_error, value_to_id_string};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadsignal_core::domain::JobPosting;
use leadsignal_core::error::{AppError, Result};
use leadsignal_core::port::ats_client::AtsClient;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(15);

pub struct BreezyHrClient {
    client: reqwest::Client,
}

impl BreezyHrClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AtsClient for BreezyHrClient {
    async fn fetch_jobs(&self, token: &str) -> Result<Vec<JobPosting>> {
        let url = format!("https://{token}.breezy.hr/json");
        let response = self.client.get(&url).timeout(TIMEOUT).send().await.map_err(|e| map_reqwest_error("breezyhr", e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(AppError::Http(format!("breezyhr returned {}", response.status())));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| AppError::ParseFailed(format!("breezyhr body: {e}")))?;
        let jobs = body.as_array().cloned().unwrap_or_default().into_iter().map(parse_job).collect();
        Ok(jobs)
    }
}

fn parse_job(job: serde_json::Value) -> JobPosting {
    let mut posting = JobPosting::new(
        value_to_id_string(job.get("id")),
        job.get("name").and_then(|v| v.as_str()).unwrap_or_default(),
        job.get("url").and_then(|v| v.as_str()).unwrap_or_default(),
    );
    posting.department = match job.get("department") {
        Some(serde_json::Value::Object(_)) => job.get("department").and_then(|d| d.get("name")).and_then(|v| v.as_str()).map(str::to_string),
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        _ => None,
    };
    posting.location = extract_location(&job);
    posting.description = job.get("description").and_then(|v| v.as_str()).map(str::to_string);
    posting.posting_date = job
        .get("published_date")
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));
    if let serde_json::Value::Object(map) = &job {
        posting.raw_data = map.clone().into_iter().collect();
    }
    posting
}

fn extract_location(job: &serde_json::Value) -> Option<String> {
    match job.get("location") {
        Some(serde_json::Value::Object(_)) => {
            let location = job.get("location")?;
            let parts: Vec<&str> = ["city", "state", "country"]
                .iter()
                .filter_map(|field| location.get(*field).and_then(|v| v.as_str()))
                .filter(|s| !s.is_empty())
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
