// Runtime configuration, assembled from environment variables (§6).
//
// Grounded on the donor daemon's plain `std::env::var` + `shellexpand`
// style rather than a `config`/`directories` layered loader: every value
// here is a single flat env var with a documented default, which doesn't
// need a config-file cascade.

use anyhow::{bail, Result};
use std::time::Duration;

const DEFAULT_DB_PATH: &str = "~/.leadsignal/leadsignal.db";
const DEFAULT_METRO_STATE_PATH: &str = "~/.leadsignal/metro_state.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub log_format: String,

    pub serpapi_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_batch_size: usize,
    pub apollo_api_key: Option<String>,
    pub apollo_batch_size: usize,

    pub leads_upload_api_key: Option<String>,
    pub vercel_api_url: Option<String>,

    pub max_searches_per_run: usize,
    pub metros_per_run: usize,
    pub metro_state_path: String,

    pub max_employee_count: Option<i64>,
    pub relevance_threshold: f64,
    pub http_timeout: Duration,
    pub delay_between_requests: Duration,
    pub delay_between_companies: Duration,

    pub enable_decision_maker_lookup: bool,
    pub enable_email_lookup: bool,

    // Recognized per §6 but not yet wired to a pipeline stage (no
    // job-verification port exists yet; tracked in DESIGN.md).
    pub enable_job_verification: bool,
    pub job_verification_timeout: Duration,
    pub job_verification_batch_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            db_path: shellexpand::tilde(&env_or("LEADSIGNAL_DB_PATH", DEFAULT_DB_PATH)).into_owned(),
            log_format: env_or("LEADSIGNAL_LOG_FORMAT", "pretty"),

            serpapi_api_key: env_opt("SERPAPI_API_KEY"),
            gemini_api_key: env_opt("GEMINI_API_KEY"),
            gemini_model: env_or("GEMINI_MODEL", "gemini-2.5-flash"),
            gemini_batch_size: env_parse_or("GEMINI_BATCH_SIZE", 5),
            apollo_api_key: env_opt("APOLLO_API_KEY"),
            apollo_batch_size: env_parse_or("APOLLO_BATCH_SIZE", 10),

            leads_upload_api_key: env_opt("LEADS_UPLOAD_API_KEY"),
            vercel_api_url: env_opt("VERCEL_API_URL"),

            max_searches_per_run: env_parse_or("MAX_SEARCHES_PER_RUN", 2),
            metros_per_run: env_parse_or("METROS_PER_RUN", 2),
            metro_state_path: shellexpand::tilde(&env_or("LEADSIGNAL_METRO_STATE_PATH", DEFAULT_METRO_STATE_PATH)).into_owned(),

            max_employee_count: env_opt("MAX_EMPLOYEE_COUNT").and_then(|s| s.parse().ok()),
            relevance_threshold: env_parse_or("RELEVANCE_THRESHOLD", 60.0),
            http_timeout: Duration::from_secs(env_parse_or("HTTP_TIMEOUT", 15)),
            delay_between_requests: Duration::from_millis(env_parse_or::<u64>("DELAY_BETWEEN_REQUESTS", 500)),
            delay_between_companies: Duration::from_secs(env_parse_or("DELAY_BETWEEN_COMPANIES", 2)),

            enable_decision_maker_lookup: env_bool_or("ENABLE_DECISION_MAKER_LOOKUP", true),
            enable_email_lookup: env_bool_or("ENABLE_EMAIL_LOOKUP", true),

            enable_job_verification: env_bool_or("ENABLE_JOB_VERIFICATION", false),
            job_verification_timeout: Duration::from_secs(env_parse_or("JOB_VERIFICATION_TIMEOUT", 10)),
            job_verification_batch_size: env_parse_or("JOB_VERIFICATION_BATCH_SIZE", 10),
        };
        config.validate()?;
        Ok(config)
    }

    /// Programmer/config errors fail fast, before the pipeline begins (§7).
    fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.relevance_threshold) {
            bail!("RELEVANCE_THRESHOLD must be between 0 and 100, got {}", self.relevance_threshold);
        }
        if self.gemini_batch_size == 0 {
            bail!("GEMINI_BATCH_SIZE must be at least 1");
        }
        if self.apollo_batch_size == 0 || self.apollo_batch_size > 10 {
            bail!("APOLLO_BATCH_SIZE must be between 1 and 10 (Apollo's bulk-match maximum)");
        }
        if self.max_searches_per_run == 0 {
            bail!("MAX_SEARCHES_PER_RUN must be at least 1");
        }
        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn env_bool_or(key: &str, default: bool) -> bool {
    std::env::var(key).ok().map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes")).unwrap_or(default)
}
