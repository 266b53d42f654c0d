// ATS Detection Domain Model
//
// Pure data and pure functions: token generation, the endpoint/validator
// registry, and the HTML fingerprint table. No I/O — the engine that drives
// these against the network lives in `application::ats_detect`.

use std::collections::BTreeSet;

/// One of the hosted ATS platforms this system knows how to query, or a
/// terminal classification produced when no ATS could be confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AtsProvider {
    Greenhouse,
    Lever,
    Ashby,
    Workable,
    Jobvite,
    SmartRecruiters,
    Recruitee,
    BreezyHr,
    Personio,
    // Fingerprint-only providers: never API-probed, only recognized via
    // HTML signature or careers-page redirect.
    BambooHr,
    Rippling,
    Teamtailor,
    JazzHr,
    Icims,
    Taleo,
    Workday,
    /// No ATS found, but a LinkedIn company page was identified.
    LinkedInOnly,
}

impl AtsProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AtsProvider::Greenhouse => "greenhouse",
            AtsProvider::Lever => "lever",
            AtsProvider::Ashby => "ashby",
            AtsProvider::Workable => "workable",
            AtsProvider::Jobvite => "jobvite",
            AtsProvider::SmartRecruiters => "smartrecruiters",
            AtsProvider::Recruitee => "recruitee",
            AtsProvider::BreezyHr => "breezyhr",
            AtsProvider::Personio => "personio",
            AtsProvider::BambooHr => "bamboohr",
            AtsProvider::Rippling => "rippling",
            AtsProvider::Teamtailor => "teamtailor",
            AtsProvider::JazzHr => "jazzhr",
            AtsProvider::Icims => "icims",
            AtsProvider::Taleo => "taleo",
            AtsProvider::Workday => "workday",
            AtsProvider::LinkedInOnly => "linkedin_only",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        API_PROBED_ORDER
            .iter()
            .copied()
            .chain(FINGERPRINT_ONLY.iter().copied())
            .find(|p| p.as_str() == s)
    }
}

/// The nine API-probed families, in the empirically-ordered default priority
/// (§4.3.3) used when no `technologies` hint names one first.
pub const API_PROBED_ORDER: [AtsProvider; 9] = [
    AtsProvider::Greenhouse,
    AtsProvider::Lever,
    AtsProvider::Ashby,
    AtsProvider::Workable,
    AtsProvider::SmartRecruiters,
    AtsProvider::Recruitee,
    AtsProvider::BreezyHr,
    AtsProvider::Personio,
    AtsProvider::Jobvite,
];

/// Providers recognized only through HTML fingerprinting or a careers-page
/// redirect, never through a direct API probe.
pub const FINGERPRINT_ONLY: [AtsProvider; 7] = [
    AtsProvider::BambooHr,
    AtsProvider::Rippling,
    AtsProvider::Teamtailor,
    AtsProvider::JazzHr,
    AtsProvider::Icims,
    AtsProvider::Taleo,
    AtsProvider::Workday,
];

/// Result of an ATS detection attempt for one `(company_name, domain)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AtsDetectionResult {
    pub provider: Option<AtsProvider>,
    pub board_token: Option<String>,
    pub confidence: f64,
    pub detection_method: &'static str,
}

impl AtsDetectionResult {
    pub fn cache_hit(provider: Option<AtsProvider>, token: Option<String>) -> Self {
        Self {
            provider,
            board_token: token,
            confidence: 1.0,
            detection_method: "cache",
        }
    }

    pub fn api_probe(provider: AtsProvider, token: impl Into<String>) -> Self {
        Self {
            provider: Some(provider),
            board_token: Some(token.into()),
            confidence: 0.95,
            detection_method: "api_probe",
        }
    }

    pub fn html_fingerprint(provider: AtsProvider, token: Option<String>) -> Self {
        let confidence = if token.is_some() { 0.85 } else { 0.6 };
        Self {
            provider: Some(provider),
            board_token: token,
            confidence,
            detection_method: "html_fingerprint",
        }
    }

    pub fn url_redirect(provider: AtsProvider, token: Option<String>) -> Self {
        Self {
            provider: Some(provider),
            board_token: token,
            confidence: 1.0,
            detection_method: "url_redirect",
        }
    }

    pub fn linkedin_fallback(slug: impl Into<String>) -> Self {
        Self {
            provider: Some(AtsProvider::LinkedInOnly),
            board_token: Some(slug.into()),
            confidence: 0.6,
            detection_method: "linkedin_fallback",
        }
    }

    pub fn default_fallback() -> Self {
        Self {
            provider: None,
            board_token: None,
            confidence: 0.3,
            detection_method: "default_fallback",
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.provider.is_none()
    }

    pub fn is_linkedin_only(&self) -> bool {
        matches!(self.provider, Some(AtsProvider::LinkedInOnly))
    }
}

/// §4.3.2: a static URL template for one provider, parameterized by `{token}`.
pub fn endpoint_template(provider: AtsProvider) -> Option<&'static str> {
    Some(match provider {
        AtsProvider::Greenhouse => "https://api.greenhouse.io/v1/boards/{token}/jobs",
        AtsProvider::Lever => "https://api.lever.co/v0/postings/{token}",
        AtsProvider::Ashby => "https://api.ashbyhq.com/posting-api/job-board/{token}",
        AtsProvider::Workable => "https://apply.workable.com/api/v1/widget/accounts/{token}",
        AtsProvider::Jobvite => "https://jobs.jobvite.com/{token}/feed.xml",
        AtsProvider::SmartRecruiters => "https://api.smartrecruiters.com/v1/companies/{token}/postings",
        AtsProvider::Recruitee => "https://{token}.recruitee.com/api/offers/",
        AtsProvider::BreezyHr => "https://{token}.breezy.hr/json",
        AtsProvider::Personio => "https://{token}.jobs.personio.de/",
        _ => return None,
    })
}

pub fn build_endpoint_url(provider: AtsProvider, token: &str) -> Option<String> {
    endpoint_template(provider).map(|tpl| tpl.replace("{token}", token))
}

/// §4.3.2: per-ATS response validators deciding whether a 200 body is
/// genuine evidence the tenant exists.
pub fn validate_probe_response(provider: AtsProvider, body: &str) -> bool {
    match provider {
        AtsProvider::Jobvite => {
            let lower = body.to_lowercase();
            lower.contains("<job>") || lower.contains("<item>")
        }
        AtsProvider::Greenhouse => serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("jobs").and_then(|j| j.as_array().map(|a| !a.is_empty())))
            .unwrap_or(false),
        AtsProvider::Lever => serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.as_array().map(|a| !a.is_empty()))
            .unwrap_or(false),
        AtsProvider::Ashby => serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("jobs").and_then(|j| j.as_array().map(|a| !a.is_empty())))
            .unwrap_or(false),
        AtsProvider::Workable => serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("jobs").and_then(|j| j.as_array().map(|a| !a.is_empty())))
            .unwrap_or(false),
        AtsProvider::SmartRecruiters => serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("content").and_then(|j| j.as_array().map(|a| !a.is_empty())))
            .unwrap_or(false),
        AtsProvider::Recruitee => serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("offers").and_then(|j| j.as_array().map(|a| !a.is_empty())))
            .unwrap_or(false),
        AtsProvider::BreezyHr => serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.as_array().map(|a| !a.is_empty()))
            .unwrap_or(false),
        AtsProvider::Personio => {
            let lower = body.to_lowercase();
            lower.contains("position") || lower.contains("job")
        }
        _ => false,
    }
}

/// §4.3.4/4.3.5: regexes that, if found in a homepage/careers-page body,
/// evidence embedding of a given ATS's widget/script. Carries all 16
/// providers (not just the nine API-probed ones).
pub fn html_fingerprints(provider: AtsProvider) -> &'static [&'static str] {
    match provider {
        AtsProvider::Greenhouse => &[r"boards\.greenhouse\.io/([a-z0-9\-]+)", r"greenhouse\.io/embed/job_board\?for=([a-z0-9\-]+)"],
        AtsProvider::Lever => &[r"jobs\.lever\.co/([a-z0-9\-]+)"],
        AtsProvider::Ashby => &[r"jobs\.ashbyhq\.com/([a-z0-9\-]+)"],
        AtsProvider::Workable => &[r"apply\.workable\.com/([a-z0-9\-]+)"],
        AtsProvider::Jobvite => &[r"jobs\.jobvite\.com/([a-z0-9\-]+)"],
        AtsProvider::SmartRecruiters => &[r"careers\.smartrecruiters\.com/([a-zA-Z0-9\-]+)"],
        AtsProvider::Recruitee => &[r"([a-z0-9\-]+)\.recruitee\.com"],
        AtsProvider::BreezyHr => &[r"([a-z0-9\-]+)\.breezy\.hr"],
        AtsProvider::Personio => &[r"([a-z0-9\-]+)\.jobs\.personio\.(?:de|com)"],
        AtsProvider::BambooHr => &[r"([a-z0-9\-]+)\.bamboohr\.com/jobs"],
        AtsProvider::Rippling => &[r"ats\.rippling\.com/([a-z0-9\-]+)"],
        AtsProvider::Teamtailor => &[r"([a-z0-9\-]+)\.teamtailor\.com"],
        AtsProvider::JazzHr => &[r"([a-z0-9\-]+)\.applytojob\.com", r"jazz\.co/a/([a-z0-9\-]+)"],
        AtsProvider::Icims => &[r"([a-z0-9\-]+)\.icims\.com"],
        AtsProvider::Taleo => &[r"([a-z0-9\-]+)\.taleo\.net"],
        AtsProvider::Workday => &[r"([a-z0-9\-]+)\.wd\d?\.myworkdayjobs\.com"],
        _ => &[],
    }
}

/// Every provider recognized by HTML fingerprinting, in a fixed scan order.
pub fn fingerprint_scan_order() -> impl Iterator<Item = AtsProvider> {
    API_PROBED_ORDER.into_iter().chain(FINGERPRINT_ONLY.into_iter())
}

/// URL patterns checked against a careers-page's **final redirect URL**
/// (§4.3.5a) — a separate, coarser table than the HTML fingerprints.
pub fn url_redirect_patterns(provider: AtsProvider) -> &'static [&'static str] {
    match provider {
        AtsProvider::Greenhouse => &[r"boards\.greenhouse\.io/([a-z0-9\-]+)"],
        AtsProvider::Lever => &[r"jobs\.lever\.co/([a-z0-9\-]+)"],
        AtsProvider::Ashby => &[r"jobs\.ashbyhq\.com/([a-z0-9\-]+)"],
        AtsProvider::Workable => &[r"apply\.workable\.com/([a-z0-9\-]+)"],
        AtsProvider::Jobvite => &[r"jobs\.jobvite\.com/([a-z0-9\-]+)"],
        AtsProvider::SmartRecruiters => &[r"careers\.smartrecruiters\.com/([a-zA-Z0-9\-]+)"],
        AtsProvider::Recruitee => &[r"([a-z0-9\-]+)\.recruitee\.com"],
        AtsProvider::BreezyHr => &[r"([a-z0-9\-]+)\.breezy\.hr"],
        AtsProvider::Personio => &[r"([a-z0-9\-]+)\.jobs\.personio\.(?:de|com)"],
        AtsProvider::BambooHr => &[r"([a-z0-9\-]+)\.bamboohr\.com"],
        AtsProvider::Teamtailor => &[r"([a-z0-9\-]+)\.teamtailor\.com"],
        AtsProvider::Icims => &[r"([a-z0-9\-]+)\.icims\.com"],
        AtsProvider::Taleo => &[r"([a-z0-9\-]+)\.taleo\.net"],
        AtsProvider::Workday => &[r"([a-z0-9\-]+)\.wd\d?\.myworkdayjobs\.com"],
        _ => &[],
    }
}

/// Scan `html` against one provider's fingerprint regex list. Returns
/// `Some(captured_token)` on a match (the token is `None` when the pattern
/// has no capture group), `None` on no match — mirrors the Python source's
/// `_fingerprint_html`, one provider at a time so the caller controls scan
/// order and can stop at the first hit.
pub fn fingerprint_match(provider: AtsProvider, html: &str) -> Option<Option<String>> {
    for pattern in html_fingerprints(provider) {
        if let Ok(re) = regex::RegexBuilder::new(pattern).case_insensitive(true).build() {
            if let Some(caps) = re.captures(html) {
                let token = caps.get(1).map(|m| m.as_str().to_string());
                return Some(token);
            }
        }
    }
    None
}

/// Scan `url` (the final URL after following redirects) against one
/// provider's redirect-pattern table. Mirrors `_check_url_for_ats`.
pub fn redirect_match(provider: AtsProvider, url: &str) -> Option<Option<String>> {
    for pattern in url_redirect_patterns(provider) {
        if let Ok(re) = regex::RegexBuilder::new(pattern).case_insensitive(true).build() {
            if let Some(caps) = re.captures(url) {
                let token = caps.get(1).map(|m| m.as_str().to_string());
                return Some(token);
            }
        }
    }
    None
}

/// Extract a LinkedIn company slug from homepage HTML, if present.
pub fn extract_linkedin_slug(html: &str) -> Option<String> {
    let re = regex::RegexBuilder::new(LINKEDIN_PATTERN)
        .case_insensitive(true)
        .build()
        .ok()?;
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// A regex recognizing `linkedin.com/company/{slug}` links in homepage HTML.
pub const LINKEDIN_PATTERN: &str = r"linkedin\.com/company/([a-zA-Z0-9\-]+)";

/// Priority paths probed first in the careers-page sweep (§4.3.5), plus the
/// two recognized careers subdomains.
pub const PRIORITY_CAREERS_PATHS: [&str; 3] = ["/careers", "/jobs", "/join"];
pub const CAREERS_SUBDOMAINS: [&str; 2] = ["careers", "jobs"];
pub const SECONDARY_CAREERS_PATHS: [&str; 4] =
    ["/about/careers", "/company/careers", "/join-us", "/work-with-us"];

/// §4.3.1: candidate tenant-token generation from a company name and domain.
/// Returns at most 10 candidates in first-seen order, already filtered of
/// implausible tokens.
pub fn generate_token_candidates(
    company_name: &str,
    domain: &str,
    linkedin_slug: Option<&str>,
) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    let mut push = |candidate: String| {
        if is_plausible_token(&candidate) && seen.insert(candidate.clone()) {
            out.push(candidate);
        }
    };

    let domain_base = domain.split('.').next().unwrap_or(domain).to_lowercase();
    push(domain_base.clone());
    push(domain_base.replace('-', ""));

    let name_clean: String = company_name
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect::<String>()
        .to_lowercase();
    let name_clean = name_clean.trim().to_string();
    push(name_clean.replace(' ', ""));
    push(name_clean.replace(' ', "-"));

    let words: Vec<&str> = name_clean.split_whitespace().collect();
    if let Some(first) = words.first() {
        push((*first).to_string());
    }
    if words.len() >= 3 {
        let acronym: String = words.iter().filter_map(|w| w.chars().next()).collect();
        if acronym.len() >= 3 {
            push(acronym);
        }
    }

    if let Some(slug) = linkedin_slug {
        push(slug.to_lowercase());
    }

    out.truncate(10);
    out
}

fn is_plausible_token(token: &str) -> bool {
    if token.len() <= 2 || token.len() >= 50 {
        return false;
    }
    if token.contains('_') {
        return false;
    }
    if token.contains(|c| "()&,. ".contains(c)) {
        return false;
    }
    if token.ends_with('-') {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_candidates_include_domain_base_and_name_variants() {
        let tokens = generate_token_candidates("Acme Rockets, Inc.", "acme-rockets.com", None);
        assert!(tokens.contains(&"acme-rockets".to_string()));
        assert!(tokens.contains(&"acmerockets".to_string()));
        assert!(tokens.contains(&"acme".to_string()));
    }

    #[test]
    fn token_candidates_drop_implausible_entries() {
        let tokens = generate_token_candidates("A & B", "ab.com", None);
        assert!(!tokens.iter().any(|t| t.contains('&')));
    }

    #[test]
    fn token_candidates_include_acronym_for_three_plus_words() {
        let tokens = generate_token_candidates("Big Blue Systems Group", "bbsg.com", None);
        assert!(tokens.iter().any(|t| t == "bbsg"));
    }

    #[test]
    fn token_candidates_deduplicate_preserving_order() {
        let tokens = generate_token_candidates("acme", "acme.com", None);
        let mut seen = BTreeSet::new();
        for t in &tokens {
            assert!(seen.insert(t.clone()), "duplicate token {t}");
        }
    }

    #[test]
    fn validates_greenhouse_requires_nonempty_jobs_array() {
        assert!(validate_probe_response(
            AtsProvider::Greenhouse,
            r#"{"jobs":[{"id":1}]}"#
        ));
        assert!(!validate_probe_response(AtsProvider::Greenhouse, r#"{"jobs":[]}"#));
        assert!(!validate_probe_response(AtsProvider::Greenhouse, "not json"));
    }

    #[test]
    fn validates_jobvite_xml_tags_case_insensitively() {
        assert!(validate_probe_response(AtsProvider::Jobvite, "<FEED><JOB>x</JOB></FEED>"));
        assert!(!validate_probe_response(AtsProvider::Jobvite, "<feed></feed>"));
    }

    #[test]
    fn fingerprint_match_captures_board_token() {
        let html = r#"<script src="https://boards.greenhouse.io/acme"></script>"#;
        assert_eq!(
            fingerprint_match(AtsProvider::Greenhouse, html),
            Some(Some("acme".to_string()))
        );
        assert_eq!(fingerprint_match(AtsProvider::Lever, html), None);
    }

    #[test]
    fn extracts_linkedin_slug_from_homepage() {
        let html = r#"<a href="https://www.linkedin.com/company/acme-rockets">LinkedIn</a>"#;
        assert_eq!(extract_linkedin_slug(html).as_deref(), Some("acme-rockets"));
    }

    #[test]
    fn builds_endpoint_url_from_template() {
        assert_eq!(
            build_endpoint_url(AtsProvider::Greenhouse, "acme").as_deref(),
            Some("https://api.greenhouse.io/v1/boards/acme/jobs")
        );
    }
}
