// Personio client.
//
// Personio has no public JSON API; job listings live on the careers page's
// HTML. Ported from the original source's BeautifulSoup-based best-effort
// scrape: find anchors that look like job links and take the link text as
// the title. No department/location/description — not extractable from the
// listing page alone.

use super::map_reqwest_error;
use async_trait::async_trait;
use leadsignal_core::domain::JobPosting;
use leadsignal_core::error::{AppError, Result};
use leadsignal_core::port::ats_client::AtsClient;
use regex::Regex;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(15);

pub struct PersonioClient {
    client: reqwest::Client,
}

impl PersonioClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AtsClient for PersonioClient {
    async fn fetch_jobs(&self, token: &str) -> Result<Vec<JobPosting>> {
        let url = format!("https://{token}.jobs.personio.de/");
        let response = self.client.get(&url).timeout(TIMEOUT).send().await.map_err(|e| map_reqwest_error("personio", e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(AppError::Http(format!("personio returned {}", response.status())));
        }

        let html = response.text().await.map_err(|e| AppError::ParseFailed(format!("personio body: {e}")))?;
        Ok(extract_jobs(&html, &url))
    }
}

fn extract_jobs(html: &str, base_url: &str) -> Vec<JobPosting> {
    let re = Regex::new(r#"(?is)<a[^>]*href=["']([^"']*/job/[^"']*)["'][^>]*>(.*?)</a>"#).unwrap();
    let tag_re = Regex::new(r"(?is)<[^>]+>").unwrap();

    re.captures_iter(html)
        .map(|caps| {
            let href = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let raw_text = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            let title = tag_re.replace_all(raw_text, "").trim().to_string();

            let job_url = if href.starts_with("http") {
                href.to_string()
            } else {
                format!("{}/{}", base_url.trim_end_matches('/'), href.trim_start_matches('/'))
            };
            let external_id = job_url.rsplit('/').next().unwrap_or_default().to_string();

            JobPosting::new(external_id, title, job_url)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_job_links_and_titles() {
        let html = r#"<a class="position-link" href="/job/123456">Account Executive</a>"#;
        let jobs = extract_jobs(html, "https://acme.jobs.personio.de/");
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Account Executive");
        assert_eq!(jobs[0].external_id, "123456");
    }
}
