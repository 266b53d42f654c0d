// End-to-end discovery scenarios, against a real `SqliteStore` and the real
// `Orchestrator`, with the network boundary (sources, ATS clients, LLM,
// email) faked. Mirrors the scenario list used to sign off the pipeline.

mod support;

use leadsignal_core::application::OrchestratorConfig;
use leadsignal_core::domain::DecisionMakerResult;
use leadsignal_core::domain::JobPosting;
use leadsignal_core::error::{AppError, Result};
use leadsignal_core::port::llm_client::{DecisionMakerQuery, LlmClient};
use leadsignal_core::port::source_adapter::SourceAdapter;
use leadsignal_core::port::store::Store;
use std::sync::Arc;
use support::{build_orchestrator, build_orchestrator_with_ats_client, build_orchestrator_with_llm, candidate, candidate_without_pre_extraction, in_memory_store, seed_ats_cache, ScriptedAtsClient};

fn default_config() -> OrchestratorConfig {
    OrchestratorConfig {
        delay_between_companies: std::time::Duration::from_millis(0),
        ..Default::default()
    }
}

async fn run_once(store: Arc<leadsignal_infra_sqlite::SqliteStore>, jobs: Vec<JobPosting>) -> leadsignal_core::application::RunResult {
    let source: Arc<dyn SourceAdapter> = support::FixedSource::new(vec![candidate("Acme Inc", "acme.com", jobs)]);
    let orchestrator = build_orchestrator(store, vec![source], default_config());
    let (_tx, rx) = leadsignal_core::application::shutdown_channel();
    orchestrator.run(None, rx).await.unwrap()
}

/// Runs a company whose jobs come from a live ATS fetch (not the
/// `pre_extracted_jobs` shortcut), so an empty board on a later run is an
/// unambiguous "this company currently has zero postings" rather than
/// "no pre-extraction happened."
async fn run_once_via_ats(store: Arc<leadsignal_infra_sqlite::SqliteStore>, ats_client: Arc<ScriptedAtsClient>) -> leadsignal_core::application::RunResult {
    let source: Arc<dyn SourceAdapter> = support::FixedSource::new(vec![candidate_without_pre_extraction("Acme Inc", "acme.com")]);
    let orchestrator = build_orchestrator_with_ats_client(store, vec![source], default_config(), ats_client);
    let (_tx, rx) = leadsignal_core::application::shutdown_channel();
    orchestrator.run(None, rx).await.unwrap()
}

#[tokio::test]
async fn scenario_1_new_company_new_job_then_idempotent_rerun() {
    let store = in_memory_store().await;
    let posting = JobPosting::new("1", "Marketing Manager", "https://acme.com/jobs/1");

    let result = run_once(store.clone(), vec![posting.clone()]).await;
    assert_eq!(result.summary.total_new_jobs, 1);
    assert_eq!(result.summary.total_jobs_found, 1);

    let company = store.get_company_by_domain("acme.com").await.unwrap().unwrap();
    let jobs = store.active_jobs_for_company(company.id.unwrap()).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert!(jobs[0].is_active);
    assert!(jobs[0].relevance_score.unwrap() > 0.0);

    // second run, same candidate: dedup via is_company_seen means the company
    // is skipped entirely, so no JobChange rows are produced.
    let second = run_once(store.clone(), vec![posting]).await;
    assert_eq!(second.summary.total_new_jobs, 0);
    assert_eq!(second.summary.companies_processed, 0);
}

#[tokio::test]
async fn scenario_2_job_removal_deactivates_and_zeroes_urgency() {
    let store = in_memory_store().await;
    seed_ats_cache(&store, "acme.com", "acme").await;
    let posting = JobPosting::new("1", "Marketing Manager", "https://acme.com/jobs/1");
    let ats_client = ScriptedAtsClient::new(vec![posting]);
    run_once_via_ats(store.clone(), ats_client.clone()).await;

    store.reset_seen_companies().await.unwrap();
    ats_client.set(vec![]);
    let result = run_once_via_ats(store.clone(), ats_client).await;
    assert_eq!(result.summary.total_removed_jobs, 1);

    let company = store.get_company_by_domain("acme.com").await.unwrap().unwrap();
    assert_eq!(company.urgency_score, 0);
    let jobs = store.active_jobs_for_company(company.id.unwrap()).await.unwrap();
    assert!(jobs.is_empty());
}

#[tokio::test]
async fn scenario_3_reactivation_emits_a_new_change_distinct_from_the_original() {
    let store = in_memory_store().await;
    seed_ats_cache(&store, "acme.com", "acme").await;
    let posting = JobPosting::new("1", "Marketing Manager", "https://acme.com/jobs/1");
    let ats_client = ScriptedAtsClient::new(vec![posting.clone()]);

    run_once_via_ats(store.clone(), ats_client.clone()).await;
    store.reset_seen_companies().await.unwrap();
    ats_client.set(vec![]);
    run_once_via_ats(store.clone(), ats_client.clone()).await;
    store.reset_seen_companies().await.unwrap();
    ats_client.set(vec![posting]);
    let result = run_once_via_ats(store.clone(), ats_client).await;

    assert_eq!(result.summary.total_new_jobs, 1);
    let company = store.get_company_by_domain("acme.com").await.unwrap().unwrap();
    let jobs = store.active_jobs_for_company(company.id.unwrap()).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert!(jobs[0].is_active);
}

#[tokio::test]
async fn scenario_4_exclusion_token_filters_a_posting_the_other_keeps() {
    let store = in_memory_store().await;
    let excluded = JobPosting::new("a", "Engineering Manager, Marketing Platform", "https://acme.com/jobs/a");
    let kept = JobPosting::new("b", "Marketing Manager", "https://acme.com/jobs/b");

    let result = run_once(store.clone(), vec![excluded, kept]).await;
    assert_eq!(result.summary.total_jobs_found, 1);

    let company = store.get_company_by_domain("acme.com").await.unwrap().unwrap();
    let jobs = store.active_jobs_for_company(company.id.unwrap()).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].external_id, "b");
}

struct RefusingLlm;

#[async_trait::async_trait]
impl LlmClient for RefusingLlm {
    async fn find_decision_makers(&self, batch: &[DecisionMakerQuery]) -> Result<Vec<DecisionMakerResult>> {
        Ok(batch
            .iter()
            .map(|q| DecisionMakerResult {
                company_name: q.company_name.clone(),
                person_name: Some("Not confidently identifiable".to_string()),
                not_found_reason: Some("No public info".to_string()),
                ..Default::default()
            })
            .collect())
    }
}

#[tokio::test]
async fn scenario_6_enrichment_refusal_is_not_persisted() {
    let store = in_memory_store().await;
    let posting = JobPosting::new("1", "Marketing Manager", "https://acme.com/jobs/1");
    let source: Arc<dyn SourceAdapter> = support::FixedSource::new(vec![candidate("Acme Inc", "acme.com", vec![posting])]);

    let config = OrchestratorConfig { delay_between_companies: std::time::Duration::from_millis(0), ..Default::default() };
    let orchestrator = build_orchestrator_with_llm(store.clone(), vec![source], config, Some(Arc::new(RefusingLlm)));

    let (_tx, rx) = leadsignal_core::application::shutdown_channel();
    orchestrator.run(None, rx).await.unwrap();

    let company = store.get_company_by_domain("acme.com").await.unwrap().unwrap();
    let stored = store.get_decision_maker_for_company(company.id.unwrap()).await.unwrap();
    assert!(stored.is_none(), "a refusal sentinel must never be written as a DecisionMaker row");
}

#[tokio::test]
async fn fetch_error_leaves_active_jobs_untouched() {
    let store = in_memory_store().await;
    let posting = JobPosting::new("1", "Marketing Manager", "https://acme.com/jobs/1");
    run_once(store.clone(), vec![posting]).await;
    store.reset_seen_companies().await.unwrap();

    struct ErroringSource;
    #[async_trait::async_trait]
    impl SourceAdapter for ErroringSource {
        async fn fetch_candidates(&self, _date_filter: Option<chrono::NaiveDate>) -> Result<Vec<leadsignal_core::port::source_adapter::CompanyCandidate>> {
            Err(AppError::Transient("network down".into()))
        }
    }

    let source: Arc<dyn SourceAdapter> = Arc::new(ErroringSource);
    let orchestrator = build_orchestrator(store.clone(), vec![source], default_config());
    let (_tx, rx) = leadsignal_core::application::shutdown_channel();
    assert!(orchestrator.run(None, rx).await.is_err());

    let company = store.get_company_by_domain("acme.com").await.unwrap().unwrap();
    let jobs = store.active_jobs_for_company(company.id.unwrap()).await.unwrap();
    assert_eq!(jobs.len(), 1, "a source-level fetch error must not touch previously active jobs");
}
