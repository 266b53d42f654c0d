// Repository-listing source adapter (§4.7).
//
// Fetches a markdown README-style document, locates a table fenced by
// `TABLE_START`/`TABLE_END` comments, and parses it row by row. No
// markdown-table crate is pulled in: the format is bespoke (bracket-aware
// `|` splitting, a `↳` continuation marker, `MMM DD` dates with year
// rollback) and a generic parser wouldn't save real work over a small
// dedicated scanner. Ported from the original source's `GitHubReadmeScraper`.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, TimeZone};
use leadsignal_core::domain::JobPosting;
use leadsignal_core::error::{AppError, Result};
use leadsignal_core::port::source_adapter::{CompanyCandidate, SourceAdapter};
use leadsignal_core::port::time_provider::TimeProvider;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);
const SKIP_DOMAINS: &[&str] = &["linkedin.com", "github.com", "twitter.com", "facebook.com"];

pub struct RepositoryListingAdapter {
    client: reqwest::Client,
    time_provider: Arc<dyn TimeProvider>,
    api_url: String,
}

impl RepositoryListingAdapter {
    pub fn new(client: reqwest::Client, time_provider: Arc<dyn TimeProvider>, repo: impl Into<String>) -> Self {
        let repo = repo.into();
        Self { client, time_provider, api_url: format!("https://api.github.com/repos/{repo}/readme") }
    }

    async fn fetch_readme(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.api_url)
            .header("Accept", "application/vnd.github.raw+json")
            .header("User-Agent", "LeadSignal/1.0")
            .timeout(TIMEOUT)
            .send()
            .await
            .map_err(|e| if e.is_timeout() || e.is_connect() { AppError::Transient(format!("repo listing: {e}")) } else { AppError::Http(format!("repo listing: {e}")) })?;

        if !response.status().is_success() {
            return Err(AppError::Http(format!("repo listing returned {}", response.status())));
        }
        response.text().await.map_err(|e| AppError::ParseFailed(format!("repo listing body: {e}")))
    }
}

#[async_trait]
impl SourceAdapter for RepositoryListingAdapter {
    async fn fetch_candidates(&self, date_filter: Option<NaiveDate>) -> Result<Vec<CompanyCandidate>> {
        let content = self.fetch_readme().await?;
        let today = epoch_millis_to_date(self.time_provider.now_millis());
        let listings = parse_table(&content, today);

        let grouped = group_by_company(listings, date_filter);
        Ok(grouped)
    }
}

struct Listing {
    company_name: String,
    company_domain: String,
    job_title: String,
    job_url: String,
    date_posted: NaiveDate,
}

fn epoch_millis_to_date(millis: i64) -> NaiveDate {
    chrono::DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive()).unwrap_or_else(|| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
}

fn bold_link_re() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*\[(.+?)\]\((.+?)\)\*\*").unwrap())
}

fn split_table_row(line: &str) -> Vec<String> {
    let mut line = line.trim();
    if let Some(stripped) = line.strip_prefix('|') {
        line = stripped;
    }
    if let Some(stripped) = line.strip_suffix('|') {
        line = stripped;
    }

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0i32;
    let mut paren_depth = 0i32;

    for ch in line.chars() {
        match ch {
            '[' => {
                bracket_depth += 1;
                current.push(ch);
            }
            ']' => {
                bracket_depth -= 1;
                current.push(ch);
            }
            '(' => {
                paren_depth += 1;
                current.push(ch);
            }
            ')' => {
                paren_depth -= 1;
                current.push(ch);
            }
            '|' if bracket_depth == 0 && paren_depth == 0 => {
                cells.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        cells.push(current.trim().to_string());
    }
    cells
}

fn extract_domain(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    let with_scheme = if url.starts_with("http") { url.to_string() } else { format!("https://{url}") };
    let Ok(parsed) = url::Url::parse(&with_scheme) else { return String::new() };
    let Some(host) = parsed.host_str() else { return String::new() };
    let domain = host.strip_prefix("www.").unwrap_or(host).to_lowercase();
    if SKIP_DOMAINS.contains(&domain.as_str()) {
        String::new()
    } else {
        domain
    }
}

fn parse_date(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let with_year = format!("{trimmed} {}", today.year());
    let parsed = NaiveDate::parse_from_str(&with_year, "%b %d %Y").ok()?;
    let days_ahead = (parsed - today).num_days();
    if days_ahead > 30 {
        NaiveDate::from_ymd_opt(today.year() - 1, parsed.month(), parsed.day())
    } else {
        Some(parsed)
    }
}

fn parse_row(line: &str, prev_name: &Option<String>, prev_domain: &Option<String>, today: NaiveDate) -> Option<Listing> {
    let cells = split_table_row(line);
    if cells.len() < 5 {
        return None;
    }

    let company_cell = &cells[0];
    let job_cell = &cells[1];
    let date_str = &cells[4];

    let (company_name, company_domain) = if company_cell.contains('\u{21b3}') {
        (prev_name.clone()?, prev_domain.clone()?)
    } else if let Some(caps) = bold_link_re().captures(company_cell) {
        let name = caps.get(1)?.as_str().to_string();
        let url = caps.get(2)?.as_str();
        (name, extract_domain(url))
    } else {
        (company_cell.replace("**", "").trim().to_string(), String::new())
    };

    if company_name.is_empty() || company_domain.is_empty() {
        return None;
    }

    let job_title = match bold_link_re().captures(job_cell) {
        Some(caps) => caps.get(1)?.as_str().to_string(),
        None => job_cell.replace("**", "").trim().to_string(),
    };
    let job_url = bold_link_re().captures(job_cell).and_then(|c| c.get(2)).map(|m| m.as_str().to_string()).unwrap_or_default();

    let date_posted = parse_date(date_str, today)?;

    Some(Listing { company_name, company_domain, job_title, job_url, date_posted })
}

fn parse_table(content: &str, today: NaiveDate) -> Vec<Listing> {
    let lines: Vec<&str> = content.lines().collect();
    let start_idx = lines.iter().position(|l| l.contains("TABLE_START"));
    let end_idx = lines.iter().position(|l| l.contains("TABLE_END"));
    let (Some(start), Some(end)) = (start_idx, end_idx) else { return Vec::new() };
    if end <= start {
        return Vec::new();
    }

    let table_lines: Vec<&str> = lines[start + 1..end]
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && l.starts_with('|') && !l.contains("Company") && !l.contains("-----"))
        .collect();

    let mut listings = Vec::new();
    let mut prev_name = None;
    let mut prev_domain = None;
    for line in table_lines {
        if let Some(listing) = parse_row(line, &prev_name, &prev_domain, today) {
            prev_name = Some(listing.company_name.clone());
            prev_domain = Some(listing.company_domain.clone());
            listings.push(listing);
        }
    }
    listings
}

fn group_by_company(listings: Vec<Listing>, date_filter: Option<NaiveDate>) -> Vec<CompanyCandidate> {
    let mut by_domain: HashMap<String, CompanyCandidate> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for listing in listings {
        if let Some(filter_date) = date_filter {
            if listing.date_posted != filter_date {
                continue;
            }
        }

        let entry = by_domain.entry(listing.company_domain.clone()).or_insert_with(|| {
            order.push(listing.company_domain.clone());
            CompanyCandidate {
                name: listing.company_name.clone(),
                domain: listing.company_domain.clone(),
                website: Some(format!("https://{}", listing.company_domain)),
                ..Default::default()
            }
        });

        let mut posting = JobPosting::new(listing.job_url.clone(), listing.job_title.clone(), listing.job_url.clone());
        posting.posting_date = listing.date_posted.and_hms_opt(0, 0, 0).map(|dt| chrono::Utc.from_utc_datetime(&dt));
        entry.pre_extracted_jobs.push(posting);
    }

    order.into_iter().filter_map(|domain| by_domain.remove(&domain)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()
    }

    #[test]
    fn parses_linked_company_and_job_row() {
        let line = "| **[Acme Inc](https://acme.com)** | **[Marketing Associate](https://acme.com/jobs/1)** | NYC | Onsite | Feb 07 |";
        let listing = parse_row(line, &None, &None, today()).unwrap();
        assert_eq!(listing.company_name, "Acme Inc");
        assert_eq!(listing.company_domain, "acme.com");
        assert_eq!(listing.job_title, "Marketing Associate");
    }

    #[test]
    fn continuation_row_reuses_previous_company() {
        let line = "| ↳ | **[Second Role](https://acme.com/jobs/2)** | NYC | Onsite | Feb 08 |";
        let listing = parse_row(line, &Some("Acme Inc".into()), &Some("acme.com".into()), today()).unwrap();
        assert_eq!(listing.company_name, "Acme Inc");
    }

    #[test]
    fn skips_social_media_domains() {
        assert_eq!(extract_domain("https://linkedin.com/company/acme"), "");
    }

    #[test]
    fn date_rolls_back_a_year_when_far_in_future() {
        let parsed = parse_date("Dec 28", today()).unwrap();
        assert_eq!(parsed.year(), 2023);
    }

    #[test]
    fn bracket_aware_split_ignores_pipe_inside_link() {
        let cells = split_table_row("| **[A | B](url)** | x | y | z | Feb 01 |");
        assert_eq!(cells[0], "**[A | B](url)**");
    }
}
