// Cross-crate checks for the quantified invariants that only make sense
// against a real `Store` + `Orchestrator` pairing (the pure-function
// invariants already have unit coverage next to the code they describe).

mod support;

use leadsignal_core::application::OrchestratorConfig;
use leadsignal_core::domain::JobPosting;
use leadsignal_core::port::source_adapter::SourceAdapter;
use leadsignal_core::port::store::Store;
use std::sync::Arc;
use support::{build_orchestrator, candidate, in_memory_store};

fn fast_config(max_jobs: Option<usize>) -> OrchestratorConfig {
    OrchestratorConfig { delay_between_companies: std::time::Duration::from_millis(0), max_jobs, ..Default::default() }
}

/// Invariant 1: one domain never produces two `Company` rows, even across runs.
#[tokio::test]
async fn one_company_row_per_domain_across_runs() {
    let store = in_memory_store().await;
    let posting = JobPosting::new("1", "Marketing Manager", "https://acme.com/jobs/1");

    let source: Arc<dyn SourceAdapter> = support::FixedSource::new(vec![candidate("Acme Inc", "acme.com", vec![posting.clone()])]);
    let orchestrator = build_orchestrator(store.clone(), vec![source], fast_config(None));
    let (_tx, rx) = leadsignal_core::application::shutdown_channel();
    orchestrator.run(None, rx).await.unwrap();

    store.reset_seen_companies().await.unwrap();
    let source: Arc<dyn SourceAdapter> = support::FixedSource::new(vec![candidate("Acme Inc", "acme.com", vec![posting])]);
    let orchestrator = build_orchestrator(store.clone(), vec![source], fast_config(None));
    let (_tx, rx) = leadsignal_core::application::shutdown_channel();
    orchestrator.run(None, rx).await.unwrap();

    let stats = store.statistics().await.unwrap();
    assert_eq!(stats.total_companies, 1);
}

/// Invariant 2: every active job has either `discovered_at` (new this run)
/// or `last_seen_at` (still present) equal to the run's date.
#[tokio::test]
async fn active_jobs_have_discovered_or_last_seen_set() {
    let store = in_memory_store().await;
    let first = JobPosting::new("1", "Marketing Manager", "https://acme.com/jobs/1");
    let second = JobPosting::new("2", "SEO Specialist", "https://acme.com/jobs/2");

    let source: Arc<dyn SourceAdapter> = support::FixedSource::new(vec![candidate("Acme Inc", "acme.com", vec![first.clone()])]);
    let orchestrator = build_orchestrator(store.clone(), vec![source], fast_config(None));
    let (_tx, rx) = leadsignal_core::application::shutdown_channel();
    orchestrator.run(None, rx).await.unwrap();

    // second run: job "1" persists (touched), job "2" is new.
    store.reset_seen_companies().await.unwrap();
    let source: Arc<dyn SourceAdapter> = support::FixedSource::new(vec![candidate("Acme Inc", "acme.com", vec![first, second])]);
    let orchestrator = build_orchestrator(store.clone(), vec![source], fast_config(None));
    let (_tx, rx) = leadsignal_core::application::shutdown_channel();
    orchestrator.run(None, rx).await.unwrap();

    let company = store.get_company_by_domain("acme.com").await.unwrap().unwrap();
    let jobs = store.active_jobs_for_company(company.id.unwrap()).await.unwrap();
    assert_eq!(jobs.len(), 2);
    for job in &jobs {
        assert!(job.is_active);
        assert!(job.discovered_at.is_some() || job.last_seen_at.is_some());
    }
}

/// Invariant 5: idempotence. Running twice back-to-back with the same
/// fetched set (and no intervening reset) produces zero new companies and
/// zero new `JobChange` rows on the second run (the company is deduped).
#[tokio::test]
async fn back_to_back_runs_without_reset_are_idempotent() {
    let store = in_memory_store().await;
    let posting = JobPosting::new("1", "Marketing Manager", "https://acme.com/jobs/1");
    let candidates = vec![candidate("Acme Inc", "acme.com", vec![posting])];

    let source: Arc<dyn SourceAdapter> = support::FixedSource::new(candidates.clone());
    let orchestrator = build_orchestrator(store.clone(), vec![source], fast_config(None));
    let (_tx, rx) = leadsignal_core::application::shutdown_channel();
    let first = orchestrator.run(None, rx).await.unwrap();
    assert_eq!(first.summary.total_new_jobs, 1);

    let source: Arc<dyn SourceAdapter> = support::FixedSource::new(candidates);
    let orchestrator = build_orchestrator(store.clone(), vec![source], fast_config(None));
    let (_tx, rx) = leadsignal_core::application::shutdown_channel();
    let second = orchestrator.run(None, rx).await.unwrap();
    assert_eq!(second.summary.total_new_jobs, 0);
    assert_eq!(second.summary.total_removed_jobs, 0);
}

/// Invariant 9: the number of relevant jobs admitted in one run never
/// exceeds `max_jobs`, even when more relevant postings are available.
#[tokio::test]
async fn relevant_job_count_is_bounded_by_max_jobs() {
    let store = in_memory_store().await;
    let company_a = candidate(
        "Acme Inc",
        "acme.com",
        vec![
            JobPosting::new("1", "Marketing Manager", "https://acme.com/jobs/1"),
            JobPosting::new("2", "SEO Specialist", "https://acme.com/jobs/2"),
        ],
    );
    let company_b = candidate(
        "Globex Corp",
        "globex.com",
        vec![
            JobPosting::new("1", "Brand Manager", "https://globex.com/jobs/1"),
            JobPosting::new("2", "Growth Marketing Lead", "https://globex.com/jobs/2"),
        ],
    );

    let source: Arc<dyn SourceAdapter> = support::FixedSource::new(vec![company_a, company_b]);
    let orchestrator = build_orchestrator(store.clone(), vec![source], fast_config(Some(2)));
    let (_tx, rx) = leadsignal_core::application::shutdown_channel();
    let result = orchestrator.run(None, rx).await.unwrap();

    assert!(result.summary.total_jobs_found <= 2, "max_jobs=2 budget was exceeded: found {}", result.summary.total_jobs_found);
}

/// Round-trip law: `UpsertCompany` followed by `GetCompanyByDomain` returns
/// every explicitly supplied field back unchanged.
#[tokio::test]
async fn upsert_then_get_company_round_trips_explicit_fields() {
    let store = in_memory_store().await;
    let mut company = leadsignal_core::domain::Company::new("Acme Inc", "acme.com");
    company.industry = Some("Software".to_string());
    company.employee_count = Some(250);
    company.keywords = Some("b2b saas".to_string());

    let (id, is_new) = store.upsert_company(&company, chrono::Utc::now()).await.unwrap();
    assert!(is_new);

    let fetched = store.get_company_by_domain("acme.com").await.unwrap().unwrap();
    assert_eq!(fetched.id, Some(id));
    assert_eq!(fetched.name, company.name);
    assert_eq!(fetched.domain, company.domain);
    assert_eq!(fetched.industry, company.industry);
    assert_eq!(fetched.employee_count, company.employee_count);
    assert_eq!(fetched.keywords, company.keywords);
}

/// Partial-update law for decision makers (§4.1): a later call with only
/// `email`/`linkedin_url` set must not clobber a previously stored
/// `person_name`/`title`.
#[tokio::test]
async fn decision_maker_partial_update_preserves_prior_fields() {
    let store = in_memory_store().await;
    let company = leadsignal_core::domain::Company::new("Acme Inc", "acme.com");
    let (company_id, _) = store.upsert_company(&company, chrono::Utc::now()).await.unwrap();

    let first = leadsignal_core::domain::DecisionMakerResult {
        company_name: "Acme Inc".to_string(),
        person_name: Some("Jane Doe".to_string()),
        title: Some("VP Marketing".to_string()),
        ..Default::default()
    };
    store.upsert_decision_maker(company_id, &first).await.unwrap();

    let email_only = leadsignal_core::domain::DecisionMakerResult {
        company_name: "Acme Inc".to_string(),
        email: Some("jane@acme.com".to_string()),
        ..Default::default()
    };
    store.upsert_decision_maker(company_id, &email_only).await.unwrap();

    let stored = store.get_decision_maker_for_company(company_id).await.unwrap().unwrap();
    assert_eq!(stored.person_name.as_deref(), Some("Jane Doe"));
    assert_eq!(stored.title.as_deref(), Some("VP Marketing"));
    assert_eq!(stored.email.as_deref(), Some("jane@acme.com"));
}

/// A new job's full scored fields (category, relevance_score) must survive
/// the round trip through `apply_change_report`, not just `external_id`/
/// `title`/`job_url`.
#[tokio::test]
async fn new_job_insert_persists_scored_fields() {
    let store = in_memory_store().await;
    let posting = JobPosting::new("1", "Marketing Manager", "https://acme.com/jobs/1");
    let source: Arc<dyn SourceAdapter> = support::FixedSource::new(vec![candidate("Acme Inc", "acme.com", vec![posting])]);
    let orchestrator = build_orchestrator(store.clone(), vec![source], fast_config(None));
    let (_tx, rx) = leadsignal_core::application::shutdown_channel();
    orchestrator.run(None, rx).await.unwrap();

    let company = store.get_company_by_domain("acme.com").await.unwrap().unwrap();
    let jobs = store.active_jobs_for_company(company.id.unwrap()).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].relevance_score, Some(80.0));
    assert!(jobs[0].category.is_some());
}
