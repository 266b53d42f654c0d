// Paid-search-API aggregator adapter (§4.7).
//
// Issues one Google Jobs query per metro in a rotating window, deduping
// within the run by `(lower(company_name), lower(title))`. Ported from the
// original source's `SerpAPIJobClient`; targets SerpApi's plain REST
// endpoint directly (the `google-search-results` Python package is itself a
// thin wrapper over this same GET request, so no equivalent crate is
// needed).

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, TimeZone};
use leadsignal_core::domain::JobPosting;
use leadsignal_core::error::{AppError, Result};
use leadsignal_core::port::source_adapter::{CompanyCandidate, SourceAdapter};
use leadsignal_core::port::time_provider::TimeProvider;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(15);
const SEARCH_URL: &str = "https://serpapi.com/search.json";

pub struct AggregatorSearchAdapter {
    client: reqwest::Client,
    time_provider: Arc<dyn TimeProvider>,
    api_key: String,
    query: String,
    metros: Vec<String>,
    metros_per_run: usize,
    max_searches: usize,
    state_path: PathBuf,
}

impl AggregatorSearchAdapter {
    pub fn new(
        client: reqwest::Client,
        time_provider: Arc<dyn TimeProvider>,
        api_key: impl Into<String>,
        query: impl Into<String>,
        metros: Vec<String>,
        metros_per_run: usize,
        max_searches: usize,
        state_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            time_provider,
            api_key: api_key.into(),
            query: query.into(),
            metros,
            metros_per_run: metros_per_run.max(1),
            max_searches: max_searches.max(1),
            state_path: state_path.into(),
        }
    }

    fn next_metros(&self) -> Vec<String> {
        if self.metros.is_empty() {
            return Vec::new();
        }
        let next_index = read_next_index(&self.state_path);
        let total = self.metros.len();
        let selected: Vec<String> = (0..self.metros_per_run).map(|i| self.metros[(next_index + i) % total].clone()).collect();
        let new_index = (next_index + self.metros_per_run) % total;
        write_next_index(&self.state_path, new_index);
        selected
    }

    async fn search_one(&self, metro: &str, today: NaiveDate) -> Vec<SearchListing> {
        match self.call_serpapi(metro).await {
            Ok(jobs) => jobs.into_iter().map(|job| parse_listing(job, today)).collect(),
            Err(e) => {
                tracing::error!(metro, error = %e, "serpapi search failed");
                Vec::new()
            }
        }
    }

    async fn call_serpapi(&self, metro: &str) -> Result<Vec<serde_json::Value>> {
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[("engine", "google_jobs"), ("q", self.query.as_str()), ("location", metro), ("chips", "date_posted:week"), ("api_key", self.api_key.as_str())])
            .timeout(TIMEOUT)
            .send()
            .await
            .map_err(|e| if e.is_timeout() || e.is_connect() { AppError::Transient(format!("serpapi: {e}")) } else { AppError::Http(format!("serpapi: {e}")) })?;

        if !response.status().is_success() {
            return Err(AppError::Http(format!("serpapi returned {}", response.status())));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| AppError::ParseFailed(format!("serpapi body: {e}")))?;
        if let Some(err) = body.get("error").and_then(|v| v.as_str()) {
            return Err(AppError::Http(format!("serpapi error: {err}")));
        }
        Ok(body.get("jobs_results").and_then(|v| v.as_array()).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl SourceAdapter for AggregatorSearchAdapter {
    async fn fetch_candidates(&self, date_filter: Option<NaiveDate>) -> Result<Vec<CompanyCandidate>> {
        let today = epoch_millis_to_date(self.time_provider.now_millis());
        let metros = self.next_metros();

        let mut seen: HashSet<String> = HashSet::new();
        let mut listings = Vec::new();
        for (used, metro) in metros.iter().enumerate() {
            if used >= self.max_searches {
                tracing::warn!(max_searches = self.max_searches, "search budget exhausted");
                break;
            }
            for listing in self.search_one(metro, today).await {
                let key = dedup_key(&listing.company_name, &listing.title);
                if seen.insert(key) {
                    listings.push(listing);
                }
            }
        }

        Ok(group_by_company(listings, date_filter))
    }
}

struct SearchListing {
    company_name: String,
    title: String,
    job_url: Option<String>,
    posting_date: Option<NaiveDate>,
}

fn epoch_millis_to_date(millis: i64) -> NaiveDate {
    chrono::DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive()).unwrap_or_else(|| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
}

fn dedup_key(company_name: &str, title: &str) -> String {
    format!("{}|||{}", company_name.to_lowercase().trim(), title.to_lowercase().trim())
}

fn parse_listing(job: serde_json::Value, today: NaiveDate) -> SearchListing {
    let job_url = job.get("apply_options").and_then(|v| v.as_array()).and_then(|a| a.first()).and_then(|o| o.get("link")).and_then(|v| v.as_str()).map(str::to_string);
    let posted_at = job.get("detected_extensions").and_then(|v| v.get("posted_at")).and_then(|v| v.as_str()).unwrap_or_default();

    SearchListing {
        company_name: job.get("company_name").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
        title: job.get("title").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
        job_url,
        posting_date: parse_posted_at(posted_at, today),
    }
}

fn parse_posted_at(posted_at: &str, today: NaiveDate) -> Option<NaiveDate> {
    if posted_at.is_empty() {
        return None;
    }
    let text = posted_at.to_lowercase();

    if text.contains("today") || text.contains("just") || text.contains("hour") {
        return Some(today);
    }
    if text.contains("yesterday") {
        return Some(today - ChronoDuration::days(1));
    }

    let day_re = Regex::new(r"(\d+)\s*day").unwrap();
    if let Some(caps) = day_re.captures(&text) {
        let n: i64 = caps.get(1)?.as_str().parse().ok()?;
        return Some(today - ChronoDuration::days(n));
    }

    let week_re = Regex::new(r"(\d+)\s*week").unwrap();
    if let Some(caps) = week_re.captures(&text) {
        let n: i64 = caps.get(1)?.as_str().parse().ok()?;
        return Some(today - ChronoDuration::weeks(n));
    }

    None
}

fn group_by_company(listings: Vec<SearchListing>, date_filter: Option<NaiveDate>) -> Vec<CompanyCandidate> {
    let mut by_name: HashMap<String, CompanyCandidate> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for listing in listings {
        if listing.company_name.is_empty() {
            continue;
        }
        if let Some(filter_date) = date_filter {
            if listing.posting_date != Some(filter_date) {
                continue;
            }
        }

        let key = listing.company_name.to_lowercase();
        let entry = by_name.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            CompanyCandidate { name: listing.company_name.clone(), domain: String::new(), ..Default::default() }
        });

        if let Some(url) = listing.job_url.clone() {
            let mut posting = JobPosting::new(url.clone(), listing.title.clone(), url);
            posting.posting_date = listing.posting_date.and_then(|d| d.and_hms_opt(0, 0, 0)).map(|dt| chrono::Utc.from_utc_datetime(&dt));
            entry.pre_extracted_jobs.push(posting);
        }
    }

    order.into_iter().filter_map(|key| by_name.remove(&key)).filter(|c| !c.domain.is_empty() || !c.pre_extracted_jobs.is_empty()).collect()
}

fn read_next_index(path: &PathBuf) -> usize {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).ok())
        .and_then(|v| v.get("next_index").and_then(|n| n.as_u64()))
        .unwrap_or(0) as usize
}

fn write_next_index(path: &PathBuf, index: usize) {
    let body = serde_json::json!({ "next_index": index });
    if let Err(e) = std::fs::write(path, body.to_string()) {
        tracing::warn!(error = %e, "failed to persist metro rotation state");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_key_is_case_and_whitespace_insensitive() {
        assert_eq!(dedup_key("Acme Inc", "Sales Rep"), dedup_key(" acme inc ", " SALES REP "));
    }

    #[test]
    fn parses_relative_dates() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(parse_posted_at("2 days ago", today), Some(today - ChronoDuration::days(2)));
        assert_eq!(parse_posted_at("1 week ago", today), Some(today - ChronoDuration::weeks(1)));
        assert_eq!(parse_posted_at("today", today), Some(today));
        assert_eq!(parse_posted_at("yesterday", today), Some(today - ChronoDuration::days(1)));
        assert_eq!(parse_posted_at("unknown", today), None);
    }

    #[test]
    fn rotation_state_round_trips() {
        let dir = std::env::temp_dir().join(format!("leadsignal-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("metro_state.json");
        write_next_index(&path, 3);
        assert_eq!(read_next_index(&path), 3);
        std::fs::remove_dir_all(&dir).ok();
    }
}
