// Curated CSV source adapter (§4.7).
//
// Streams a hand-maintained CSV of prospects. The domain is derived from the
// `Website` column (scheme added if absent, `www.` stripped, lowercased);
// employee counts are parsed tolerant of thousands separators. Both helpers
// already live in `leadsignal_core::domain::company`.

use async_trait::async_trait;
use chrono::NaiveDate;
use leadsignal_core::domain::company::{extract_domain, parse_employee_count};
use leadsignal_core::error::{AppError, Result};
use leadsignal_core::port::source_adapter::{CompanyCandidate, SourceAdapter};
use std::io::Read;
use std::path::PathBuf;

pub struct CuratedCsvAdapter {
    path: PathBuf,
}

impl CuratedCsvAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SourceAdapter for CuratedCsvAdapter {
    async fn fetch_candidates(&self, _date_filter: Option<NaiveDate>) -> Result<Vec<CompanyCandidate>> {
        let file = std::fs::File::open(&self.path)?;
        parse_csv(file)
    }
}

pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<CompanyCandidate>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers().map_err(|e| AppError::ParseFailed(format!("curated csv headers: {e}")))?.clone();

    let mut candidates = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| AppError::ParseFailed(format!("curated csv row: {e}")))?;
        let get = |field: &str| -> Option<String> {
            headers.iter().position(|h| h.eq_ignore_ascii_case(field)).and_then(|i| record.get(i)).map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
        };

        let name = match get("Company") {
            Some(name) => name,
            None => continue,
        };
        let website = get("Website");
        let Some(domain) = website.as_deref().and_then(extract_domain) else {
            continue;
        };

        candidates.push(CompanyCandidate {
            name,
            domain,
            website,
            industry: get("Industry"),
            keywords: get("Keywords"),
            employee_count: get("Employee Count").as_deref().and_then(parse_employee_count),
            pre_extracted_jobs: Vec::new(),
        });
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_rows_and_derives_domain() {
        let csv = "Company,Website,Industry,Employee Count\nAcme Inc,https://www.acme.com,Manufacturing,\"1,250\"\n";
        let candidates = parse_csv(Cursor::new(csv)).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].domain, "acme.com");
        assert_eq!(candidates[0].employee_count, Some(1250));
    }

    #[test]
    fn skips_rows_with_no_usable_website() {
        let csv = "Company,Website\nNoSite Co,\n";
        let candidates = parse_csv(Cursor::new(csv)).unwrap();
        assert!(candidates.is_empty());
    }
}
