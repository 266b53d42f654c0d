// SmartRecruiters Public Job API client.
// GET https://api.smartrecruiters.com/v1/companies/{token}/postings

use super::{map_reqwest_error, value_to_id_string};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadsignal_core::domain::JobPosting;
use leadsignal_core::error::{AppError, Result};
use leadsignal_core::port::ats_client::AtsClient;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(15);

pub struct SmartRecruitersClient {
    client: reqwest::Client,
}

impl SmartRecruitersClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AtsClient for SmartRecruitersClient {
    async fn fetch_jobs(&self, token: &str) -> Result<Vec<JobPosting>> {
        let url = format!("https://api.smartrecruiters.com/v1/companies/{token}/postings");
        let response = self.client.get(&url).timeout(TIMEOUT).send().await.map_err(|e| map_reqwest_error("smartrecruiters", e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(AppError::Http(format!("smartrecruiters returned {}", response.status())));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| AppError::ParseFailed(format!("smartrecruiters body: {e}")))?;
        let jobs = body
            .get("content")
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
        .get("ref")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("https://jobs.smartrecruiters.com/{board_token}/{id}"));

    let mut posting = JobPosting::new(id, job.get("name").and_then(|v| v.as_str()).unwrap_or_default(), job_url);
    posting.department = job.get("department").and_then(|v| v.get("label")).and_then(|v| v.as_str()).map(str::to_string);
    posting.location = extract_location(&job);
    posting.posting_date = job
        .get("releasedDate")
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));
    if let serde_json::Value::Object(map) = &job {
        posting.raw_data = map.clone().into_iter().collect();
    }
    posting
}

fn extract_location(job: &serde_json::Value) -> Option<String> {
    let location = job.get("location")?;
    let city = location.get("city").and_then(|v| v.as_str()).unwrap_or_default();
    let country = location.get("country").and_then(|v| v.as_str()).unwrap_or_default();
    match (city.is_empty(), country.is_empty()) {
        (false, false) => Some(format!("{city}, {country}")),
        (false, true) => Some(city.to_string()),
        (true, false) => Some(country.to_string()),
        (true, true) => None,
    }
}
