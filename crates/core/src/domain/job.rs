// Job Domain Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Verification status for a job row (§3: `verification_status` column added
/// by migration, default `"unverified"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Unverified,
    Verified,
    Stale,
}

impl Default for VerificationStatus {
    fn default() -> Self {
        VerificationStatus::Unverified
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VerificationStatus::Unverified => "unverified",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Stale => "stale",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for VerificationStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "verified" => Ok(VerificationStatus::Verified),
            "stale" => Ok(VerificationStatus::Stale),
            _ => Ok(VerificationStatus::Unverified),
        }
    }
}

/// A job posting as returned by an `AtsClient`, before it has been scored or
/// persisted. `raw_data` carries the provider's original JSON for debugging,
/// mirroring the Python source's `raw_data` dict field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub external_id: String,
    pub title: String,
    pub job_url: String,
    pub department: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub posting_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub raw_data: HashMap<String, serde_json::Value>,

    // Populated by the relevance scorer.
    pub relevance_score: Option<f64>,
    pub matched_category: Option<String>,
}

impl JobPosting {
    pub fn new(external_id: impl Into<String>, title: impl Into<String>, job_url: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            title: title.into(),
            job_url: job_url.into(),
            department: None,
            location: None,
            description: None,
            posting_date: None,
            raw_data: HashMap::new(),
            relevance_score: None,
            matched_category: None,
        }
    }
}

/// A `Job` row as persisted by the Store. Identity is `(company_id, external_id)`.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Option<i64>,
    pub company_id: i64,
    pub external_id: String,
    pub title: String,
    pub category: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub job_url: String,
    pub posting_date: Option<DateTime<Utc>>,
    pub discovered_at: Option<DateTime<Utc>>,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub relevance_score: Option<f64>,
    pub verification_status: VerificationStatus,
}

impl Job {
    pub fn from_posting(posting: JobPosting, company_id: i64) -> Self {
        Self {
            id: None,
            company_id,
            external_id: posting.external_id,
            title: posting.title,
            category: posting.matched_category,
            department: posting.department,
            location: posting.location,
            description: posting.description,
            job_url: posting.job_url,
            posting_date: posting.posting_date,
            discovered_at: None,
            last_seen_at: None,
            is_active: true,
            relevance_score: posting.relevance_score,
            verification_status: VerificationStatus::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_status_round_trips_through_str() {
        use std::str::FromStr;
        assert_eq!(
            VerificationStatus::from_str("verified").unwrap(),
            VerificationStatus::Verified
        );
        assert_eq!(VerificationStatus::Verified.to_string(), "verified");
        assert_eq!(
            VerificationStatus::from_str("garbage").unwrap(),
            VerificationStatus::Unverified
        );
    }
}
