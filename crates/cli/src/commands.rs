use crate::config::Config;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use colored::Colorize;
use leadsignal_core::application::{AtsDetectionEngine, Orchestrator, OrchestratorConfig};
use leadsignal_core::domain::ats::AtsProvider;
use leadsignal_core::port::ats_client::AtsClient;
use leadsignal_core::port::email_client::EmailClient;
use leadsignal_core::port::id_provider::UuidProvider;
use leadsignal_core::port::llm_client::LlmClient;
use leadsignal_core::port::robots_policy::RobotsPolicy;
use leadsignal_core::port::source_adapter::SourceAdapter;
use leadsignal_core::port::store::Store;
use leadsignal_core::port::time_provider::SystemTimeProvider;
use leadsignal_infra_http::{AggregatorSearchAdapter, ApolloEmailClient, AshbyClient, BreezyHrClient, CuratedCsvAdapter, GeminiDecisionMakerClient, GreenhouseClient, JobviteClient, LeverClient, PersonioClient, RecruiteeClient, ReqwestProbe, RepositoryListingAdapter, RobotsChecker, SmartRecruitersClient, WorkableClient};
use leadsignal_infra_sqlite::{create_pool, run_migrations, SqliteStore};
use std::collections::HashMap;
use std::sync::Arc;
use tabled::{Table, Tabled};

const DEFAULT_SEARCH_QUERY: &str = "marketing agency jobs";
const DEFAULT_REPO_LISTING: &str = "jobright-ai/2026-Marketing-New-Grad";
const DEFAULT_METROS: &[&str] = &["New York, NY", "Los Angeles, CA", "Chicago, IL", "Austin, TX", "Seattle, WA", "Denver, CO"];

pub struct RunArgs {
    pub dry_run: bool,
    pub max_searches: Option<usize>,
    pub date: Option<NaiveDate>,
    pub skip_decision_makers: bool,
    pub skip_email_lookup: bool,
    pub verbose: bool,
}

pub struct ExportArgs {
    pub path: String,
    pub all: bool,
}

pub struct UploadArgs {
    pub location: String,
}

pub struct ResetArgs {
    pub force: bool,
}

async fn open_store(config: &Config) -> Result<Arc<SqliteStore>> {
    let pool = create_pool(&config.db_path).await.map_err(|e| anyhow::anyhow!("failed to open store at {}: {e}", config.db_path))?;
    run_migrations(&pool).await.map_err(|e| anyhow::anyhow!("migration failed: {e}"))?;
    Ok(Arc::new(SqliteStore::new(pool)))
}

fn ats_clients(client: reqwest::Client) -> HashMap<AtsProvider, Arc<dyn AtsClient>> {
    let mut map: HashMap<AtsProvider, Arc<dyn AtsClient>> = HashMap::new();
    map.insert(AtsProvider::Greenhouse, Arc::new(GreenhouseClient::new(client.clone())));
    map.insert(AtsProvider::Lever, Arc::new(LeverClient::new(client.clone())));
    map.insert(AtsProvider::Ashby, Arc::new(AshbyClient::new(client.clone())));
    map.insert(AtsProvider::Workable, Arc::new(WorkableClient::new(client.clone())));
    map.insert(AtsProvider::Jobvite, Arc::new(JobviteClient::new(client.clone())));
    map.insert(AtsProvider::SmartRecruiters, Arc::new(SmartRecruitersClient::new(client.clone())));
    map.insert(AtsProvider::Recruitee, Arc::new(RecruiteeClient::new(client.clone())));
    map.insert(AtsProvider::BreezyHr, Arc::new(BreezyHrClient::new(client.clone())));
    map.insert(AtsProvider::Personio, Arc::new(PersonioClient::new(client)));
    map
}

fn build_sources(config: &Config, client: reqwest::Client, time_provider: Arc<dyn leadsignal_core::port::time_provider::TimeProvider>) -> Vec<Arc<dyn SourceAdapter>> {
    let mut sources: Vec<Arc<dyn SourceAdapter>> = Vec::new();

    if let Ok(path) = std::env::var("LEADSIGNAL_CURATED_CSV_PATH") {
        sources.push(Arc::new(CuratedCsvAdapter::new(path)));
    }

    sources.push(Arc::new(RepositoryListingAdapter::new(client.clone(), time_provider.clone(), std::env::var("LEADSIGNAL_REPO_LISTING").unwrap_or_else(|_| DEFAULT_REPO_LISTING.to_string()))));

    if let Some(api_key) = &config.serpapi_api_key {
        let metros: Vec<String> = DEFAULT_METROS.iter().map(|s| s.to_string()).collect();
        sources.push(Arc::new(AggregatorSearchAdapter::new(
            client,
            time_provider,
            api_key.clone(),
            DEFAULT_SEARCH_QUERY,
            metros,
            config.metros_per_run,
            config.max_searches_per_run,
            config.metro_state_path.clone(),
        )));
    }

    sources
}

pub async fn run(config: &Config, args: RunArgs) -> Result<i32> {
    let store = open_store(config).await?;
    let http_client = reqwest::Client::new();
    let time_provider: Arc<dyn leadsignal_core::port::time_provider::TimeProvider> = Arc::new(SystemTimeProvider);

    let probe = Arc::new(ReqwestProbe::new());
    let ats_detect = AtsDetectionEngine::new(probe.clone(), store.clone());
    let robots: Arc<dyn RobotsPolicy> = Arc::new(RobotsChecker::new());
    let sources = build_sources(config, http_client.clone(), time_provider.clone());

    let llm_client: Option<Arc<dyn LlmClient>> = if args.skip_decision_makers {
        None
    } else {
        config.gemini_api_key.as_ref().map(|key| Arc::new(GeminiDecisionMakerClient::new(http_client.clone(), key.clone(), config.gemini_model.clone(), config.gemini_batch_size)) as Arc<dyn LlmClient>)
    };
    let email_client: Option<Arc<dyn EmailClient>> = if args.skip_email_lookup {
        None
    } else {
        config.apollo_api_key.as_ref().map(|key| Arc::new(ApolloEmailClient::new(http_client.clone(), key.clone(), config.apollo_batch_size)) as Arc<dyn EmailClient>)
    };

    let max_searches = args.max_searches.unwrap_or(config.max_searches_per_run);
    let orchestrator_config = OrchestratorConfig {
        relevance_threshold: config.relevance_threshold,
        max_jobs: Some(max_searches * 50),
        delay_between_companies: config.delay_between_companies,
        enable_decision_maker_lookup: llm_client.is_some(),
        enable_email_lookup: email_client.is_some(),
        enrichment_top_n: 25,
        dry_run: args.dry_run,
    };

    let orchestrator = Orchestrator::new(store.clone(), sources, ats_detect, ats_clients(http_client), robots, llm_client, email_client, time_provider, Arc::new(UuidProvider), orchestrator_config);

    let (_shutdown_tx, shutdown_rx) = leadsignal_core::application::shutdown_channel();
    install_interrupt_handler(_shutdown_tx);

    match orchestrator.run(args.date, shutdown_rx).await {
        Ok(result) => {
            print_run_summary(&result.summary, args.verbose);
            Ok(0)
        }
        Err(e) => {
            eprintln!("{} {e}", "fatal:".red().bold());
            Ok(2)
        }
    }
}

fn install_interrupt_handler(sender: leadsignal_core::application::ShutdownSender) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            sender.shutdown();
        }
    });
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn print_run_summary(summary: &leadsignal_core::domain::RunSummary, verbose: bool) {
    println!("{}", "Run complete".green().bold());
    println!("  {} {}", "Run ID:".bold(), summary.run_id);
    println!("  {} {:.1}s", "Elapsed:".bold(), summary.elapsed_seconds);
    println!("  {} {}", "Companies processed:".bold(), summary.companies_processed);
    println!("  {} {}", "Companies successful:".bold(), summary.companies_successful);
    println!("  {} {}", "Jobs found:".bold(), summary.total_jobs_found);
    println!("  {} {}", "New jobs:".bold(), summary.total_new_jobs);
    println!("  {} {}", "Removed jobs:".bold(), summary.total_removed_jobs);

    if verbose {
        println!();
        println!("{}", "By status:".cyan().bold());
        for (status, count) in &summary.by_status {
            println!("  {status}: {count}");
        }
        println!("{}", "By ATS provider:".cyan().bold());
        for (provider, count) in &summary.by_ats {
            println!("  {provider}: {count}");
        }
    }
}

pub async fn status(config: &Config) -> Result<i32> {
    let store = open_store(config).await?;
    let stats = store.statistics().await.context("failed to load statistics")?;

    println!("{}", "LeadSignal Status".cyan().bold());
    println!();

    let rows = vec![
        StatusRow { metric: "Total companies".into(), value: stats.total_companies.to_string() },
        StatusRow { metric: "Active jobs".into(), value: stats.active_jobs.to_string() },
        StatusRow { metric: "Relevant jobs".into(), value: stats.relevant_jobs.to_string() },
    ];
    println!("{}", Table::new(rows));

    if !stats.by_ats.is_empty() {
        println!();
        println!("{}", "By ATS provider:".bold());
        for (provider, count) in &stats.by_ats {
            println!("  {provider}: {count}");
        }
    }
    if !stats.by_category.is_empty() {
        println!();
        println!("{}", "By job category:".bold());
        for (category, count) in &stats.by_category {
            println!("  {category}: {count}");
        }
    }

    Ok(0)
}

pub async fn export(config: &Config, args: ExportArgs) -> Result<i32> {
    let store = open_store(config).await?;
    let rows = store.export_rows(!args.all).await.context("failed to load export rows")?;

    let file = std::fs::File::create(&args.path).with_context(|| format!("failed to create {}", args.path))?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(["company_name", "domain", "industry", "job_title", "job_url", "department", "location", "posting_date", "relevance_score", "decision_maker_name", "decision_maker_email", "is_new_company"])?;
    for row in &rows {
        writer.write_record(&[
            row.company_name.clone(),
            row.domain.clone(),
            row.industry.clone().unwrap_or_default(),
            row.job_title.clone(),
            row.job_url.clone(),
            row.department.clone().unwrap_or_default(),
            row.location.clone().unwrap_or_default(),
            row.posting_date.map(|d| d.to_rfc3339()).unwrap_or_default(),
            row.relevance_score.map(|s| s.to_string()).unwrap_or_default(),
            row.decision_maker_name.clone().unwrap_or_default(),
            row.decision_maker_email.clone().unwrap_or_default(),
            row.is_new_company.to_string(),
        ])?;
    }
    writer.flush()?;

    println!("{} {} rows to {}", "✓".green().bold(), rows.len(), args.path);
    Ok(0)
}

pub async fn upload(config: &Config, args: UploadArgs) -> Result<i32> {
    let Some(url) = &config.vercel_api_url else {
        eprintln!("{} VERCEL_API_URL is not set", "error:".red().bold());
        return Ok(1);
    };
    let Some(api_key) = &config.leads_upload_api_key else {
        eprintln!("{} LEADS_UPLOAD_API_KEY is not set", "error:".red().bold());
        return Ok(1);
    };

    let store = open_store(config).await?;
    let rows = store.export_rows(true).await.context("failed to load leads for upload")?;
    let leads: Vec<serde_json::Value> = rows
        .iter()
        .map(|r| {
            serde_json::json!({
                "company_name": r.company_name,
                "domain": r.domain,
                "job_title": r.job_title,
                "job_url": r.job_url,
                "decision_maker_name": r.decision_maker_name,
                "decision_maker_email": r.decision_maker_email,
            })
        })
        .collect();

    let payload = serde_json::json!({ "location": args.location, "leads": leads });

    let client = reqwest::Client::new();
    let response = client.post(url).header("X-API-Key", api_key).json(&payload).send().await.context("upload request failed")?;

    if response.status().is_success() {
        println!("{} uploaded {} leads", "✓".green().bold(), leads.len());
        Ok(0)
    } else {
        eprintln!("{} upload failed with status {}", "✗".red().bold(), response.status());
        Ok(1)
    }
}

pub async fn reset(config: &Config, args: ResetArgs) -> Result<i32> {
    if !args.force {
        print!("This will clear every seen-company marker, causing the next run to re-process all companies. Continue? [y/N] ");
        use std::io::Write;
        std::io::stdout().flush().ok();
        let mut input = String::new();
        std::io::stdin().read_line(&mut input).ok();
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(0);
        }
    }

    let store = open_store(config).await?;
    let cleared = store.reset_seen_companies().await.context("failed to reset seen companies")?;
    println!("{} cleared {} seen-company markers", "✓".green().bold(), cleared);
    Ok(0)
}
