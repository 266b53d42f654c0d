// Discovery Orchestrator (§4.5)
//
// The staged pipeline: source ingestion -> dedup -> upsert -> courtesy check
// -> ATS detect -> fetch -> score -> change-detect -> derived-field update ->
// rate limit -> enrichment -> run summary. Companies are processed strictly
// sequentially (§5); only ATS detection fans out internally.

use crate::application::ats_detect::AtsDetectionEngine;
use crate::application::change_detect::detect_changes;
use crate::application::enrichment::{DecisionMakerFinder, EmailFinder};
use crate::application::shutdown::ShutdownToken;
use crate::domain::ats::AtsProvider;
use crate::domain::job::JobPosting;
use crate::domain::relevance::RoleFamily;
use crate::domain::run::{CompanyStatus, RunSnapshot, RunSummary};
use crate::error::{AppError, Result};
use crate::port::ats_client::AtsClient;
use crate::port::id_provider::IdProvider;
use crate::port::llm_client::DecisionMakerQuery;
use crate::port::robots_policy::RobotsPolicy;
use crate::port::source_adapter::SourceAdapter;
use crate::port::store::Store;
use crate::port::{EmailClient, LlmClient, TimeProvider};
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Outcome of stage 6 (fetch jobs). Kept distinct from an empty vector so
/// stage 8 can be skipped entirely on failure (§4.5 resolved open question).
enum FetchOutcome {
    Ok(Vec<JobPosting>),
    Error(AppError),
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub relevance_threshold: f64,
    pub max_jobs: Option<usize>,
    pub delay_between_companies: Duration,
    pub enable_decision_maker_lookup: bool,
    pub enable_email_lookup: bool,
    pub enrichment_top_n: usize,
    pub dry_run: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: 60.0,
            max_jobs: None,
            delay_between_companies: Duration::from_secs(2),
            enable_decision_maker_lookup: true,
            enable_email_lookup: true,
            enrichment_top_n: 25,
            dry_run: false,
        }
    }
}

pub struct RunResult {
    pub summary: RunSummary,
}

pub struct Orchestrator {
    store: Arc<dyn Store>,
    sources: Vec<Arc<dyn SourceAdapter>>,
    ats_detect: AtsDetectionEngine,
    ats_clients: HashMap<AtsProvider, Arc<dyn AtsClient>>,
    robots: Arc<dyn RobotsPolicy>,
    llm_client: Option<Arc<dyn LlmClient>>,
    email_client: Option<Arc<dyn EmailClient>>,
    time: Arc<dyn TimeProvider>,
    ids: Arc<dyn IdProvider>,
    role_family: RoleFamily,
    config: OrchestratorConfig,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn Store>,
        sources: Vec<Arc<dyn SourceAdapter>>,
        ats_detect: AtsDetectionEngine,
        ats_clients: HashMap<AtsProvider, Arc<dyn AtsClient>>,
        robots: Arc<dyn RobotsPolicy>,
        llm_client: Option<Arc<dyn LlmClient>>,
        email_client: Option<Arc<dyn EmailClient>>,
        time: Arc<dyn TimeProvider>,
        ids: Arc<dyn IdProvider>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            sources,
            ats_detect,
            ats_clients,
            robots,
            llm_client,
            email_client,
            time,
            ids,
            role_family: RoleFamily::marketing(),
            config,
        }
    }

    #[instrument(skip(self, shutdown), fields(run_id))]
    pub async fn run(&self, date_filter: Option<NaiveDate>, mut shutdown: ShutdownToken) -> Result<RunResult> {
        let run_id = self.ids.generate_id();
        let run_date = Utc::now();
        tracing::Span::current().record("run_id", &run_id.as_str());
        info!(run_id, "starting discovery run");

        let mut by_status: HashMap<String, usize> = HashMap::new();
        let mut by_ats: HashMap<String, usize> = HashMap::new();
        let mut total_jobs_found = 0i64;
        let mut total_new_jobs = 0i64;
        let mut total_removed_jobs = 0i64;
        let mut companies_processed = 0usize;
        let mut companies_successful = 0usize;
        let mut relevant_jobs_budgeted = 0usize;

        let mut candidates = Vec::new();
        for source in &self.sources {
            candidates.extend(source.fetch_candidates(date_filter).await?);
        }

        'companies: for candidate in candidates {
            if shutdown.is_shutdown() {
                info!("shutdown requested, stopping before next company");
                break 'companies;
            }
            if let Some(max) = self.config.max_jobs {
                if relevant_jobs_budgeted >= max {
                    info!(max_jobs = max, "max_jobs budget reached, stopping admission of new companies");
                    break 'companies;
                }
            }

            // stage 2: dedup
            if self.store.is_company_seen(&candidate.domain).await? {
                continue;
            }

            companies_processed += 1;
            let span = tracing::info_span!("per_company", domain = %candidate.domain);
            let _enter = span.enter();

            // stage 3: upsert company
            let company = crate::domain::Company {
                id: None,
                name: candidate.name.clone(),
                domain: candidate.domain.clone(),
                website: candidate.website.clone(),
                industry: candidate.industry.clone(),
                keywords: candidate.keywords.clone(),
                employee_count: candidate.employee_count,
                ats_provider: None,
                ats_board_token: None,
                careers_page_url: None,
                urgency_score: 0,
                first_seen_date: None,
                last_csv_date: None,
                current_run_id: Some(run_id.clone()),
            };
            let (company_id, _is_new) = self.store.upsert_company(&company, run_date).await?;

            // stage 4: courtesy check
            if !self.robots.is_allowed(&candidate.domain, "/").await.unwrap_or(true) {
                warn!("robots.txt disallows, skipping");
                self.record(&run_id, run_date, company_id, 0, 0, 0, CompanyStatus::BlockedRobots, None, &mut by_status)
                    .await?;
                continue;
            }

            // stage 5+6: ATS detect and fetch, unless the source already
            // pre-extracted jobs (e.g. RepositoryListingAdapter, §4.7).
            let fetch_outcome = if !candidate.pre_extracted_jobs.is_empty() {
                FetchOutcome::Ok(candidate.pre_extracted_jobs.clone())
            } else {
                match self.detect_and_fetch(&candidate.name, &candidate.domain, company_id).await {
                    DetectOutcome::DetectError(err) => {
                        self.record(
                            &run_id,
                            run_date,
                            company_id,
                            0,
                            0,
                            0,
                            CompanyStatus::FetchError,
                            Some(err.to_string()),
                            &mut by_status,
                        )
                        .await?;
                        continue;
                    }
                    DetectOutcome::NoAts => {
                        self.record(&run_id, run_date, company_id, 0, 0, 0, CompanyStatus::UnknownAts, None, &mut by_status)
                            .await?;
                        continue;
                    }
                    DetectOutcome::LinkedInOnly => {
                        self.record(&run_id, run_date, company_id, 0, 0, 0, CompanyStatus::LinkedInOnly, None, &mut by_status)
                            .await?;
                        continue;
                    }
                    DetectOutcome::Unsupported(provider) => {
                        *by_ats.entry(provider.as_str().to_string()).or_insert(0) += 1;
                        self.record(
                            &run_id,
                            run_date,
                            company_id,
                            0,
                            0,
                            0,
                            CompanyStatus::UnsupportedAts,
                            None,
                            &mut by_status,
                        )
                        .await?;
                        continue;
                    }
                    DetectOutcome::Fetched(provider, outcome) => {
                        *by_ats.entry(provider.as_str().to_string()).or_insert(0) += 1;
                        outcome
                    }
                }
            };

            let fetched = match fetch_outcome {
                FetchOutcome::Ok(jobs) => jobs,
                FetchOutcome::Error(err) => {
                    warn!(error = %err, "fetch failed, skipping change-detect this run");
                    self.record(
                        &run_id,
                        run_date,
                        company_id,
                        0,
                        0,
                        0,
                        CompanyStatus::FetchError,
                        Some(err.to_string()),
                        &mut by_status,
                    )
                    .await?;
                    continue;
                }
            };

            // stage 7: score, keep only relevant
            let mut relevant: Vec<JobPosting> = Vec::new();
            for mut posting in fetched {
                let description = posting.description.clone().unwrap_or_default();
                let scored = self.role_family.score(&posting.title, &description, self.config.relevance_threshold);
                if scored.is_relevant {
                    posting.relevance_score = Some(scored.score);
                    posting.matched_category = Some(scored.matched_category);
                    relevant.push(posting);
                }
            }
            relevant_jobs_budgeted += relevant.len();

            // stage 8: change-detect
            let active_jobs = self.store.active_jobs_for_company(company_id).await?;
            let detected = detect_changes(company_id, &candidate.name, &run_id, run_date, &active_jobs, &relevant);

            if !self.config.dry_run {
                self.store.apply_change_report(&detected.report).await?;
            }

            // stage 9: derived fields
            let urgency = detected.report.total_active as i64;
            if !self.config.dry_run {
                self.store.update_company_urgency(company_id, urgency).await?;
            }

            total_jobs_found += relevant.len() as i64;
            total_new_jobs += detected.report.new_jobs.len() as i64;
            total_removed_jobs += detected.report.removed_jobs.len() as i64;
            companies_successful += 1;

            self.record(
                &run_id,
                run_date,
                company_id,
                relevant.len() as i64,
                detected.report.new_jobs.len() as i64,
                detected.report.removed_jobs.len() as i64,
                CompanyStatus::Success,
                None,
                &mut by_status,
            )
            .await?;

            if !self.config.dry_run {
                self.store
                    .mark_company_seen(&candidate.domain, &candidate.name, run_date, &run_id)
                    .await?;
            }

            drop(_enter);

            // stage 10: rate limit
            tokio::select! {
                _ = tokio::time::sleep(self.config.delay_between_companies) => {}
                _ = shutdown.wait() => break 'companies,
            }
        }

        // stage 11: enrichment pass
        if !self.config.dry_run {
            self.run_enrichment(&run_id, run_date).await?;
        }

        let summary = RunSummary {
            run_id: run_id.clone(),
            run_date,
            elapsed_seconds: (Utc::now() - run_date).num_milliseconds() as f64 / 1000.0,
            companies_processed,
            companies_successful,
            total_jobs_found,
            total_new_jobs,
            total_removed_jobs,
            by_status,
            by_ats,
        };

        info!(run_id, companies_processed, companies_successful, "discovery run complete");
        Ok(RunResult { summary })
    }

    async fn detect_and_fetch(&self, company_name: &str, domain: &str, _company_id: i64) -> DetectOutcome {
        let detection = match self.ats_detect.detect(company_name, domain, None).await {
            Ok(d) => d,
            Err(err) => return DetectOutcome::DetectError(err),
        };

        let Some(provider) = detection.provider else {
            return DetectOutcome::NoAts;
        };
        if provider == AtsProvider::LinkedInOnly {
            return DetectOutcome::LinkedInOnly;
        }

        if !self.config.dry_run {
            let _ = self
                .store
                .update_company_ats(_company_id, Some(provider), detection.board_token.as_deref())
                .await;
        }

        let Some(client) = self.ats_clients.get(&provider) else {
            return DetectOutcome::Unsupported(provider);
        };
        let Some(token) = detection.board_token.as_deref() else {
            return DetectOutcome::Unsupported(provider);
        };

        let outcome = match client.fetch_jobs(token).await {
            Ok(jobs) => FetchOutcome::Ok(jobs),
            Err(err) => FetchOutcome::Error(err),
        };
        DetectOutcome::Fetched(provider, outcome)
    }

    #[allow(clippy::too_many_arguments)]
    async fn record(
        &self,
        run_id: &str,
        run_date: chrono::DateTime<Utc>,
        company_id: i64,
        jobs_found: i64,
        new_jobs: i64,
        removed_jobs: i64,
        status: CompanyStatus,
        error_message: Option<String>,
        by_status: &mut HashMap<String, usize>,
    ) -> Result<()> {
        *by_status.entry(status.as_str().to_string()).or_insert(0) += 1;
        if self.config.dry_run {
            return Ok(());
        }
        self.store
            .record_run_snapshot(&RunSnapshot {
                run_id: run_id.to_string(),
                run_date,
                company_id,
                jobs_found,
                new_jobs,
                removed_jobs,
                status,
                error_message,
            })
            .await
    }

    async fn run_enrichment(&self, _run_id: &str, _run_date: chrono::DateTime<Utc>) -> Result<()> {
        if !self.config.enable_decision_maker_lookup {
            return Ok(());
        }
        let Some(llm) = &self.llm_client else {
            return Ok(());
        };

        let companies = self.store.top_companies_by_urgency(self.config.enrichment_top_n as i64).await?;
        let queries: Vec<DecisionMakerQuery> = companies
            .iter()
            .map(|c| DecisionMakerQuery {
                company_name: c.name.clone(),
                website: c.website.clone(),
            })
            .collect();
        if queries.is_empty() {
            return Ok(());
        }

        let finder = DecisionMakerFinder::new(llm.as_ref());
        let results = finder.find_all(&queries).await;

        let mut persisted = Vec::new();
        for (company, result) in companies.iter().zip(results.iter()) {
            if let Some(id) = company.id {
                if result.is_persistable() {
                    self.store.upsert_decision_maker(id, result).await?;
                }
            }
            persisted.push(result.clone());
        }

        if self.config.enable_email_lookup {
            if let Some(email_client) = &self.email_client {
                let finder = EmailFinder::new(email_client.as_ref());
                let emails = finder.find_all(&persisted).await;
                info!(count = emails.len(), "email lookup pass complete");

                for email in &emails {
                    let Some(company) = companies
                        .iter()
                        .find(|c| c.name.eq_ignore_ascii_case(&email.company_name))
                    else {
                        continue;
                    };
                    let Some(company_id) = company.id else { continue };
                    if email.email.is_none() && email.linkedin_url.is_none() {
                        continue;
                    }
                    let update = crate::domain::DecisionMakerResult {
                        company_name: email.company_name.clone(),
                        email: email.email.clone(),
                        linkedin_url: email.linkedin_url.clone(),
                        ..Default::default()
                    };
                    self.store.upsert_decision_maker(company_id, &update).await?;
                }
            }
        }

        Ok(())
    }
}

enum DetectOutcome {
    DetectError(AppError),
    NoAts,
    LinkedInOnly,
    Unsupported(AtsProvider),
    Fetched(AtsProvider, FetchOutcome),
}
