// Company Domain Model

use chrono::NaiveDate;

/// A tracked employer.
///
/// Identity is `domain` (lowercased, `www.` stripped) — two `Company` rows
/// never share a domain.
#[derive(Debug, Clone, PartialEq)]
pub struct Company {
    pub id: Option<i64>,
    pub name: String,
    pub domain: String,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub keywords: Option<String>,
    pub employee_count: Option<i64>,
    pub ats_provider: Option<String>,
    pub ats_board_token: Option<String>,
    pub careers_page_url: Option<String>,
    pub urgency_score: i64,
    pub first_seen_date: Option<NaiveDate>,
    pub last_csv_date: Option<NaiveDate>,
    pub current_run_id: Option<String>,
}

impl Company {
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            domain: normalize_domain(&domain.into()),
            website: None,
            industry: None,
            keywords: None,
            employee_count: None,
            ats_provider: None,
            ats_board_token: None,
            careers_page_url: None,
            urgency_score: 0,
            first_seen_date: None,
            last_csv_date: None,
            current_run_id: None,
        }
    }
}

/// Lowercase and strip a leading `www.` label, the normalization the store
/// enforces on `Company.domain` (§3 invariant).
pub fn normalize_domain(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    lowered.strip_prefix("www.").unwrap_or(&lowered).to_string()
}

/// Extract and normalize a domain from a free-form website URL, adding a
/// scheme if one is absent so the URL parses. Grounded on the Python
/// source's `Company.from_csv_row` / `ApolloEmailFinder._extract_domain`.
pub fn extract_domain(website: &str) -> Option<String> {
    let trimmed = website.trim();
    if trimmed.is_empty() {
        return None;
    }
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let parsed = url::Url::parse(&with_scheme).ok()?;
    let host = parsed.host_str()?;
    Some(normalize_domain(host))
}

/// Parse an employee-count string, stripping thousands separators.
pub fn parse_employee_count(raw: &str) -> Option<i64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned.trim().parse::<i64>().ok()
}
