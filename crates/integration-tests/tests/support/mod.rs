// Shared fakes for the end-to-end / invariant tests below. Real `Store` (an
// in-memory SQLite pool) and real `Orchestrator`, fake everything at the
// network boundary — the point of this crate is to exercise the wiring
// between those two and a genuine `Store` implementation, not to hit real
// ATS APIs.
//
// Two ways a candidate's jobs reach the orchestrator:
// - `pre_extracted_jobs` on the `CompanyCandidate` (the repository-listing
//   adapter's shortcut, §4.7) — used for the relevance/exclusion scenarios.
// - the ATS cache + a `FakeAtsClient` — used for anything that needs the
//   change-detect lifecycle (new/removed/reactivated) across runs, since an
//   empty `pre_extracted_jobs` is indistinguishable from "no pre-extraction"
//   and falls through to ATS detection in the real orchestrator.

use async_trait::async_trait;
use chrono::NaiveDate;
use leadsignal_core::application::{AtsDetectionEngine, Orchestrator, OrchestratorConfig};
use leadsignal_core::domain::ats::AtsProvider;
use leadsignal_core::domain::JobPosting;
use leadsignal_core::error::Result;
use leadsignal_core::port::ats_client::AtsClient;
use leadsignal_core::port::id_provider::IdProvider;
use leadsignal_core::port::llm_client::LlmClient;
use leadsignal_core::port::robots_policy::RobotsPolicy;
use leadsignal_core::port::source_adapter::{CompanyCandidate, SourceAdapter};
use leadsignal_core::port::store::Store;
use leadsignal_core::port::time_provider::SystemTimeProvider;
use leadsignal_infra_sqlite::{create_pool, run_migrations, SqliteStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Yields a fixed, caller-supplied candidate list on every call.
pub struct FixedSource {
    candidates: Mutex<Vec<CompanyCandidate>>,
}

impl FixedSource {
    pub fn new(candidates: Vec<CompanyCandidate>) -> Arc<Self> {
        Arc::new(Self { candidates: Mutex::new(candidates) })
    }
}

#[async_trait]
impl SourceAdapter for FixedSource {
    async fn fetch_candidates(&self, _date_filter: Option<NaiveDate>) -> Result<Vec<CompanyCandidate>> {
        Ok(self.candidates.lock().unwrap().clone())
    }
}

pub struct AllowAllRobots;

#[async_trait]
impl RobotsPolicy for AllowAllRobots {
    async fn is_allowed(&self, _domain: &str, _path: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Deterministic run ids: `run-0`, `run-1`, ... one per `Orchestrator::run` call.
pub struct SequentialIdProvider {
    next: Mutex<u64>,
}

impl SequentialIdProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { next: Mutex::new(0) })
    }
}

impl IdProvider for SequentialIdProvider {
    fn generate_id(&self) -> String {
        let mut next = self.next.lock().unwrap();
        let id = format!("run-{next}");
        *next += 1;
        id
    }
}

/// Returns whatever is currently in the shared `Vec`, letting a test flip
/// the board's contents between runs to drive new/removed/reactivated
/// scenarios through the real `detect_and_fetch` dispatch path.
pub struct ScriptedAtsClient {
    jobs: Mutex<Vec<JobPosting>>,
}

impl ScriptedAtsClient {
    pub fn new(jobs: Vec<JobPosting>) -> Arc<Self> {
        Arc::new(Self { jobs: Mutex::new(jobs) })
    }

    pub fn set(&self, jobs: Vec<JobPosting>) {
        *self.jobs.lock().unwrap() = jobs;
    }
}

#[async_trait]
impl AtsClient for ScriptedAtsClient {
    async fn fetch_jobs(&self, _token: &str) -> Result<Vec<JobPosting>> {
        Ok(self.jobs.lock().unwrap().clone())
    }
}

/// Registered for providers no test in this crate actually dispatches to.
pub struct UnreachableAtsClient;

#[async_trait]
impl AtsClient for UnreachableAtsClient {
    async fn fetch_jobs(&self, _token: &str) -> Result<Vec<JobPosting>> {
        panic!("no test in this crate should reach this AtsClient");
    }
}

pub async fn in_memory_store() -> Arc<SqliteStore> {
    let pool = create_pool("sqlite::memory:").await.expect("open in-memory store");
    run_migrations(&pool).await.expect("run migrations");
    Arc::new(SqliteStore::new(pool))
}

/// Pre-seeds the ATS cache so `AtsDetectionEngine::detect` returns a cache
/// hit for `domain` without ever reaching the `HttpProbe`.
pub async fn seed_ats_cache(store: &SqliteStore, domain: &str, token: &str) {
    store.cache_set(domain, Some(AtsProvider::Greenhouse), Some(token), 7).await.expect("seed ats cache");
}

pub fn build_orchestrator(store: Arc<SqliteStore>, sources: Vec<Arc<dyn SourceAdapter>>, config: OrchestratorConfig) -> Orchestrator {
    build_orchestrator_full(store, sources, config, None, None)
}

pub fn build_orchestrator_with_ats_client(
    store: Arc<SqliteStore>,
    sources: Vec<Arc<dyn SourceAdapter>>,
    config: OrchestratorConfig,
    ats_client: Arc<ScriptedAtsClient>,
) -> Orchestrator {
    build_orchestrator_full(store, sources, config, Some(ats_client), None)
}

pub fn build_orchestrator_with_llm(
    store: Arc<SqliteStore>,
    sources: Vec<Arc<dyn SourceAdapter>>,
    config: OrchestratorConfig,
    llm_client: Option<Arc<dyn LlmClient>>,
) -> Orchestrator {
    build_orchestrator_full(store, sources, config, None, llm_client)
}

fn build_orchestrator_full(
    store: Arc<SqliteStore>,
    sources: Vec<Arc<dyn SourceAdapter>>,
    config: OrchestratorConfig,
    ats_client: Option<Arc<ScriptedAtsClient>>,
    llm_client: Option<Arc<dyn LlmClient>>,
) -> Orchestrator {
    let ats_detect = AtsDetectionEngine::new(Arc::new(NullProbe), store.clone());
    let mut ats_clients: HashMap<AtsProvider, Arc<dyn AtsClient>> = HashMap::new();
    match ats_client {
        Some(client) => {
            ats_clients.insert(AtsProvider::Greenhouse, client);
        }
        None => {
            ats_clients.insert(AtsProvider::Greenhouse, Arc::new(UnreachableAtsClient));
        }
    }

    Orchestrator::new(
        store,
        sources,
        ats_detect,
        ats_clients,
        Arc::new(AllowAllRobots),
        llm_client,
        None,
        Arc::new(SystemTimeProvider),
        SequentialIdProvider::new(),
        config,
    )
}

pub fn candidate(name: &str, domain: &str, jobs: Vec<JobPosting>) -> CompanyCandidate {
    CompanyCandidate {
        name: name.to_string(),
        domain: domain.to_string(),
        website: Some(format!("https://{domain}")),
        industry: None,
        keywords: None,
        employee_count: None,
        pre_extracted_jobs: jobs,
    }
}

pub fn candidate_without_pre_extraction(name: &str, domain: &str) -> CompanyCandidate {
    candidate(name, domain, Vec::new())
}

/// Every candidate in this crate's tests either carries `pre_extracted_jobs`
/// or has its ATS cache pre-seeded, so the probe itself is never called.
pub struct NullProbe;

#[async_trait]
impl leadsignal_core::port::http_probe::HttpProbe for NullProbe {
    async fn get(&self, _url: &str, _timeout: std::time::Duration) -> Result<leadsignal_core::port::http_probe::ProbeResponse> {
        panic!("no test in this crate should reach the HTTP probe");
    }
}
