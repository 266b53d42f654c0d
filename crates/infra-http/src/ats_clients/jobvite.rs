// Jobvite RSS feed client.
// GET https://jobs.jobvite.com/{token}/feed.xml
//
// The feed is an RSS/Atom-ish document whose `<job>`/`<item>` tags sometimes
// carry a namespace prefix and sometimes don't, depending on which Jobvite
// tenant generated it. We match on local name only (quick-xml's
// `BytesStart::local_name()`) so `<jv:job>` and `<job>` are both recognized,
// same for every child element.

use super::map_reqwest_error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadsignal_core::domain::JobPosting;
use leadsignal_core::error::{AppError, Result};
use leadsignal_core::port::ats_client::AtsClient;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(15);

pub struct JobviteClient {
    client: reqwest::Client,
}

impl JobviteClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AtsClient for JobviteClient {
    async fn fetch_jobs(&self, token: &str) -> Result<Vec<JobPosting>> {
        let url = format!("https://jobs.jobvite.com/{token}/feed.xml");
        let response = self.client.get(&url).timeout(TIMEOUT).send().await.map_err(|e| map_reqwest_error("jobvite", e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(AppError::Http(format!("jobvite returned {}", response.status())));
        }

        let body = response.text().await.map_err(|e| AppError::ParseFailed(format!("jobvite body: {e}")))?;
        parse_feed(&body)
    }
}

fn local_name(tag: &[u8]) -> &[u8] {
    match tag.iter().position(|&b| b == b':') {
        Some(idx) => &tag[idx + 1..],
        None => tag,
    }
}

#[derive(Default)]
struct RawEntry {
    jvid: String,
    guid: String,
    title: String,
    category: String,
    location: String,
    description: String,
    link: String,
    pub_date: String,
}

fn parse_feed(xml: &str) -> Result<Vec<JobPosting>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<RawEntry> = None;
    let mut current_field: Option<Vec<u8>> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = local_name(e.name().as_ref()).to_vec();
                if name == b"job" || name == b"item" {
                    current = Some(RawEntry::default());
                } else {
                    current_field = Some(name);
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(entry), Some(field)) = (current.as_mut(), current_field.as_ref()) {
                    let text = t.unescape().unwrap_or_default().into_owned();
                    match field.as_slice() {
                        b"jvid" => entry.jvid = text,
                        b"guid" => entry.guid = text,
                        b"title" => entry.title = text,
                        b"category" => entry.category = text,
                        b"location" => entry.location = text,
                        b"description" => entry.description = text,
                        b"link" => entry.link = text,
                        b"pubDate" => entry.pub_date = text,
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = local_name(e.name().as_ref()).to_vec();
                if name == b"job" || name == b"item" {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                } else {
                    current_field = None;
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(AppError::ParseFailed(format!("jobvite xml: {e}"))),
        }
        buf.clear();
    }

    Ok(entries.into_iter().map(to_posting).collect())
}

fn to_posting(entry: RawEntry) -> JobPosting {
    let id = if !entry.jvid.is_empty() { entry.jvid } else { entry.guid };
    let mut posting = JobPosting::new(id, entry.title, entry.link);
    posting.department = if entry.category.is_empty() { None } else { Some(entry.category) };
    posting.location = if entry.location.is_empty() { None } else { Some(entry.location) };
    posting.description = if entry.description.is_empty() { None } else { Some(entry.description) };
    posting.posting_date = parse_rss_date(&entry.pub_date);
    posting
}

fn parse_rss_date(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(raw).ok().map(|dt| dt.with_timezone(&Utc)).or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED_UNPREFIXED: &str = r#"<?xml version="1.0"?>
<rss><channel>
<job>
  <jvid>123</jvid>
  <title>Backend Engineer</title>
  <category>Engineering</category>
  <location>Remote</location>
  <description>Build things.</description>
  <link>https://jobs.jobvite.com/acme/job/123</link>
  <pubDate>Tue, 02 Jan 2024 10:00:00 GMT</pubDate>
</job>
</channel></rss>"#;

    const FEED_PREFIXED: &str = r#"<?xml version="1.0"?>
<jv:rss xmlns:jv="urn:jobvite"><jv:channel>
<jv:item>
  <jv:guid>456</jv:guid>
  <jv:title>Sales Rep</jv:title>
  <jv:link>https://jobs.jobvite.com/acme/job/456</jv:link>
</jv:item>
</jv:channel></jv:rss>"#;

    #[test]
    fn parses_unprefixed_job_tags() {
        let jobs = parse_feed(FEED_UNPREFIXED).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].external_id, "123");
        assert_eq!(jobs[0].title, "Backend Engineer");
        assert!(jobs[0].posting_date.is_some());
    }

    #[test]
    fn parses_prefixed_item_tags() {
        let jobs = parse_feed(FEED_PREFIXED).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].external_id, "456");
        assert_eq!(jobs[0].title, "Sales Rep");
    }
}
