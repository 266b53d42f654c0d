// SQLite Store Implementation
//
// One adapter for `leadsignal_core::port::store::Store`, grounded on the
// donor's `SqliteJobRepository`/`map_sqlx_error` shape: sqlx queries built
// and bound at runtime (no compile-time `query!` macros, so the crate builds
// without a live `DATABASE_URL`), constraint violations translated from
// SQLite's extended result codes into `AppError::Conflict`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use leadsignal_core::domain::ats::AtsProvider;
use leadsignal_core::domain::job::VerificationStatus;
use leadsignal_core::domain::{ChangeReport, ChangeType, Company, DecisionMakerResult, Job, JobChange, RunSnapshot};
use leadsignal_core::error::{AppError, Result};
use leadsignal_core::port::store::{AtsCacheEntry, ExportRow, Store, StoreStatistics};
use sqlx::{Row, SqlitePool};

fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                match code.as_ref() {
                    "2067" | "1555" => AppError::Conflict(format!("unique constraint violation: {}", db_err.message())),
                    "787" | "3850" => AppError::Conflict(format!("foreign key constraint violation: {}", db_err.message())),
                    "5" => AppError::Database(format!("database locked: {}", db_err.message())),
                    "13" => AppError::Database(format!("database full: {}", db_err.message())),
                    code => AppError::Database(format!("database error [{code}]: {}", db_err.message())),
                }
            } else {
                AppError::Database(format!("database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::NotFound("row not found".to_string()),
        _ => AppError::Database(err.to_string()),
    }
}

fn provider_token(provider: Option<AtsProvider>) -> Option<&'static str> {
    provider.map(|p| p.as_str())
}

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_company(row: &sqlx::sqlite::SqliteRow) -> Company {
        Company {
            id: Some(row.get("id")),
            name: row.get("name"),
            domain: row.get("domain"),
            website: row.get("website"),
            industry: row.get("industry"),
            keywords: row.get("keywords"),
            employee_count: row.get("employee_count"),
            ats_provider: row.get("ats_provider"),
            ats_board_token: row.get("ats_board_token"),
            careers_page_url: row.get("careers_page_url"),
            urgency_score: row.get("urgency_score"),
            first_seen_date: row.get::<Option<String>, _>("first_seen_date").and_then(|s| s.parse::<NaiveDate>().ok()),
            last_csv_date: row.get::<Option<String>, _>("last_csv_date").and_then(|s| s.parse::<NaiveDate>().ok()),
            current_run_id: row.get("current_run_id"),
        }
    }

    fn row_to_job(row: &sqlx::sqlite::SqliteRow) -> Job {
        Job {
            id: Some(row.get("id")),
            company_id: row.get("company_id"),
            external_id: row.get("external_id"),
            title: row.get("title"),
            category: row.get("category"),
            department: row.get("department"),
            location: row.get("location"),
            description: row.get("description"),
            job_url: row.get("job_url"),
            posting_date: parse_ts(row.get("posting_date")),
            discovered_at: parse_ts(row.get("discovered_at")),
            last_seen_at: parse_ts(row.get("last_seen_at")),
            is_active: row.get::<i64, _>("is_active") != 0,
            relevance_score: row.get("relevance_score"),
            verification_status: row
                .get::<Option<String>, _>("verification_status")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
        }
    }
}

fn parse_ts(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(&s).ok()).map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
impl Store for SqliteStore {
    async fn upsert_company(&self, company: &Company, run_date: DateTime<Utc>) -> Result<(i64, bool)> {
        let existing = sqlx::query("SELECT id, last_csv_date FROM companies WHERE domain = ?")
            .bind(&company.domain)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let today = run_date.date_naive().to_string();

        if let Some(row) = existing {
            let id: i64 = row.get("id");
            let last_csv_date: Option<String> = row.get("last_csv_date");
            let is_resurfacing = last_csv_date.as_deref() != Some(today.as_str());

            sqlx::query(
                "UPDATE companies SET name = ?, website = ?, industry = ?, keywords = ?, employee_count = ?, \
                 last_csv_date = ?, current_run_id = ?, updated_at = datetime('now') WHERE id = ?",
            )
            .bind(&company.name)
            .bind(&company.website)
            .bind(&company.industry)
            .bind(&company.keywords)
            .bind(company.employee_count)
            .bind(&today)
            .bind(&company.current_run_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

            Ok((id, is_resurfacing))
        } else {
            let result = sqlx::query(
                "INSERT INTO companies (name, domain, website, industry, keywords, employee_count, \
                 first_seen_date, last_csv_date, current_run_id) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&company.name)
            .bind(&company.domain)
            .bind(&company.website)
            .bind(&company.industry)
            .bind(&company.keywords)
            .bind(company.employee_count)
            .bind(&today)
            .bind(&today)
            .bind(&company.current_run_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

            Ok((result.last_insert_rowid(), true))
        }
    }

    async fn update_company_ats(&self, company_id: i64, provider: Option<AtsProvider>, token: Option<&str>) -> Result<()> {
        sqlx::query("UPDATE companies SET ats_provider = ?, ats_board_token = ?, updated_at = datetime('now') WHERE id = ?")
            .bind(provider_token(provider))
            .bind(token)
            .bind(company_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn update_company_urgency(&self, company_id: i64, score: i64) -> Result<()> {
        sqlx::query("UPDATE companies SET urgency_score = ?, updated_at = datetime('now') WHERE id = ?")
            .bind(score)
            .bind(company_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn get_company_by_domain(&self, domain: &str) -> Result<Option<Company>> {
        let row = sqlx::query("SELECT * FROM companies WHERE domain = ?")
            .bind(domain)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.as_ref().map(Self::row_to_company))
    }

    async fn companies_sorted_by_recency(&self, limit: i64) -> Result<Vec<Company>> {
        let rows = sqlx::query("SELECT * FROM companies ORDER BY last_csv_date DESC LIMIT ?")
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.iter().map(Self::row_to_company).collect())
    }

    async fn top_companies_by_urgency(&self, limit: i64) -> Result<Vec<Company>> {
        let rows = sqlx::query("SELECT * FROM companies WHERE urgency_score > 0 ORDER BY urgency_score DESC LIMIT ?")
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.iter().map(Self::row_to_company).collect())
    }

    async fn insert_job(&self, job: &Job) -> Result<i64> {
        let existing = sqlx::query("SELECT id FROM jobs WHERE company_id = ? AND external_id = ?")
            .bind(job.company_id)
            .bind(&job.external_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if let Some(row) = existing {
            let id: i64 = row.get("id");
            sqlx::query(
                "UPDATE jobs SET title = ?, category = ?, department = ?, location = ?, description = ?, \
                 job_url = ?, posting_date = ?, is_active = 1, last_seen_at = datetime('now') WHERE id = ?",
            )
            .bind(&job.title)
            .bind(&job.category)
            .bind(&job.department)
            .bind(&job.location)
            .bind(&job.description)
            .bind(&job.job_url)
            .bind(job.posting_date.map(|d| d.to_rfc3339()))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
            Ok(id)
        } else {
            let result = sqlx::query(
                "INSERT INTO jobs (company_id, external_id, title, category, department, location, description, \
                 job_url, posting_date, discovered_at, last_seen_at, is_active, relevance_score) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, datetime('now'), datetime('now'), 1, ?)",
            )
            .bind(job.company_id)
            .bind(&job.external_id)
            .bind(&job.title)
            .bind(&job.category)
            .bind(&job.department)
            .bind(&job.location)
            .bind(&job.description)
            .bind(&job.job_url)
            .bind(job.posting_date.map(|d| d.to_rfc3339()))
            .bind(job.relevance_score)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
            Ok(result.last_insert_rowid())
        }
    }

    async fn mark_job_inactive(&self, job_id: i64, seen_at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE jobs SET is_active = 0, last_seen_at = ? WHERE id = ?")
            .bind(seen_at.to_rfc3339())
            .bind(job_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn update_job_last_seen(&self, job_id: i64, seen_at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE jobs SET last_seen_at = ? WHERE id = ?")
            .bind(seen_at.to_rfc3339())
            .bind(job_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn update_job_verification(&self, job_id: i64, status: VerificationStatus) -> Result<()> {
        sqlx::query("UPDATE jobs SET verification_status = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(job_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn active_jobs_for_company(&self, company_id: i64) -> Result<Vec<Job>> {
        let rows = sqlx::query("SELECT * FROM jobs WHERE company_id = ? AND is_active = 1")
            .bind(company_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.iter().map(Self::row_to_job).collect())
    }

    async fn apply_change_report(&self, report: &ChangeReport) -> Result<Vec<JobChange>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        let mut applied = Vec::new();

        let jobs_by_external_id: std::collections::HashMap<&str, &Job> =
            report.jobs_to_insert.iter().map(|j| (j.external_id.as_str(), j)).collect();

        for change in &report.new_jobs {
            let existing = sqlx::query("SELECT id FROM jobs WHERE company_id = ? AND external_id = ?")
                .bind(report.company_id)
                .bind(&change.external_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;

            let full = jobs_by_external_id.get(change.external_id.as_str()).copied();

            let job_id = if let Some(row) = existing {
                let id: i64 = row.get("id");
                sqlx::query(
                    "UPDATE jobs SET is_active = 1, last_seen_at = datetime('now'), category = ?, \
                     department = ?, location = ?, description = ?, posting_date = ?, relevance_score = ? WHERE id = ?",
                )
                .bind(full.and_then(|j| j.category.as_deref()))
                .bind(full.and_then(|j| j.department.as_deref()))
                .bind(full.and_then(|j| j.location.as_deref()))
                .bind(full.and_then(|j| j.description.as_deref()))
                .bind(full.and_then(|j| j.posting_date).map(|d| d.to_rfc3339()))
                .bind(full.and_then(|j| j.relevance_score))
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
                id
            } else {
                let result = sqlx::query(
                    "INSERT INTO jobs (company_id, external_id, title, category, department, location, \
                     description, job_url, posting_date, relevance_score, discovered_at, last_seen_at, is_active) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, datetime('now'), datetime('now'), 1)",
                )
                .bind(report.company_id)
                .bind(&change.external_id)
                .bind(&change.title)
                .bind(full.and_then(|j| j.category.as_deref()))
                .bind(full.and_then(|j| j.department.as_deref()))
                .bind(full.and_then(|j| j.location.as_deref()))
                .bind(full.and_then(|j| j.description.as_deref()))
                .bind(&change.job_url)
                .bind(full.and_then(|j| j.posting_date).map(|d| d.to_rfc3339()))
                .bind(full.and_then(|j| j.relevance_score))
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
                result.last_insert_rowid()
            };

            sqlx::query("INSERT INTO job_changes (job_id, run_id, change_type) VALUES (?, ?, ?)")
                .bind(job_id)
                .bind(&report.run_id)
                .bind(ChangeType::New.to_string())
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;

            applied.push(JobChange {
                job_id: Some(job_id),
                ..change.clone()
            });
        }

        for change in &report.removed_jobs {
            if let Some(job_id) = change.job_id {
                sqlx::query("UPDATE jobs SET is_active = 0 WHERE id = ?")
                    .bind(job_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_sqlx_error)?;

                sqlx::query("INSERT INTO job_changes (job_id, run_id, change_type) VALUES (?, ?, ?)")
                    .bind(job_id)
                    .bind(&report.run_id)
                    .bind(ChangeType::Removed.to_string())
                    .execute(&mut *tx)
                    .await
                    .map_err(map_sqlx_error)?;
            }
            applied.push(change.clone());
        }

        for &job_id in &report.touched_ids {
            sqlx::query("UPDATE jobs SET last_seen_at = datetime('now') WHERE id = ?")
                .bind(job_id)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(applied)
    }

    async fn upsert_decision_maker(&self, company_id: i64, result: &DecisionMakerResult) -> Result<()> {
        // Partial update: a field absent from `result` (None) must not
        // clobber whatever is already stored (§4.1 "fields present in the
        // call overwrite, fields absent do not"), hence COALESCE against the
        // pre-existing row rather than an unconditional `excluded.x`.
        sqlx::query(
            "INSERT INTO decision_makers (company_id, person_name, title, source_url, confidence, email, linkedin_url) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(company_id) DO UPDATE SET \
               person_name = COALESCE(excluded.person_name, decision_makers.person_name), \
               title = COALESCE(excluded.title, decision_makers.title), \
               source_url = COALESCE(excluded.source_url, decision_makers.source_url), \
               confidence = COALESCE(excluded.confidence, decision_makers.confidence), \
               email = COALESCE(excluded.email, decision_makers.email), \
               linkedin_url = COALESCE(excluded.linkedin_url, decision_makers.linkedin_url), \
               updated_at = datetime('now')",
        )
        .bind(company_id)
        .bind(&result.person_name)
        .bind(&result.title)
        .bind(&result.source_url)
        .bind(result.confidence.map(|c| c.as_str()))
        .bind(&result.email)
        .bind(&result.linkedin_url)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn get_decision_maker_for_company(&self, company_id: i64) -> Result<Option<DecisionMakerResult>> {
        let row = sqlx::query("SELECT dm.*, c.name AS company_name FROM decision_makers dm JOIN companies c ON c.id = dm.company_id WHERE dm.company_id = ?")
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(|row| DecisionMakerResult {
            company_name: row.get("company_name"),
            person_name: row.get("person_name"),
            title: row.get("title"),
            source_url: row.get("source_url"),
            confidence: row
                .get::<Option<String>, _>("confidence")
                .and_then(|s| leadsignal_core::domain::decision_maker::Confidence::parse(&s)),
            employee_count: None,
            industry: None,
            not_found_reason: None,
            raw_text: None,
            email: row.get("email"),
            linkedin_url: row.get("linkedin_url"),
        }))
    }

    async fn is_company_seen(&self, domain: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM seen_companies WHERE domain = ?")
            .bind(domain)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.is_some())
    }

    async fn mark_company_seen(&self, domain: &str, company_name: &str, source_date: DateTime<Utc>, run_id: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO seen_companies (domain, company_name, source_date, run_id) VALUES (?, ?, ?, ?) \
             ON CONFLICT(domain) DO UPDATE SET company_name = excluded.company_name, \
               source_date = excluded.source_date, run_id = excluded.run_id",
        )
        .bind(domain)
        .bind(company_name)
        .bind(source_date.date_naive().to_string())
        .bind(run_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn reset_seen_companies(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM seen_companies").execute(&self.pool).await.map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    async fn cache_get(&self, domain: &str) -> Result<Option<AtsCacheEntry>> {
        sqlx::query("DELETE FROM ats_cache WHERE domain = ? AND expires_at < datetime('now')")
            .bind(domain)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let row = sqlx::query("SELECT * FROM ats_cache WHERE domain = ?")
            .bind(domain)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(|row| AtsCacheEntry {
            domain: row.get("domain"),
            provider: row
                .get::<Option<String>, _>("ats_provider")
                .and_then(|s| AtsProvider::from_str_opt(&s)),
            board_token: row.get("board_token"),
            detected_at: parse_ts(Some(row.get("detected_at"))).unwrap_or_else(Utc::now),
            expires_at: parse_ts(Some(row.get("expires_at"))).unwrap_or_else(Utc::now),
        }))
    }

    async fn cache_set(&self, domain: &str, provider: Option<AtsProvider>, token: Option<&str>, ttl_days: i64) -> Result<()> {
        let expires_at = (Utc::now() + chrono::Duration::days(ttl_days)).to_rfc3339();
        sqlx::query(
            "INSERT INTO ats_cache (domain, ats_provider, board_token, detected_at, expires_at) \
             VALUES (?, ?, ?, datetime('now'), ?) \
             ON CONFLICT(domain) DO UPDATE SET ats_provider = excluded.ats_provider, \
               board_token = excluded.board_token, detected_at = excluded.detected_at, \
               expires_at = excluded.expires_at",
        )
        .bind(domain)
        .bind(provider_token(provider))
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn cache_clear_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM ats_cache WHERE expires_at < datetime('now')")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    async fn record_run_snapshot(&self, snapshot: &RunSnapshot) -> Result<()> {
        sqlx::query(
            "INSERT INTO run_snapshots (run_id, run_date, company_id, jobs_found, new_jobs, removed_jobs, status, error_message) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&snapshot.run_id)
        .bind(snapshot.run_date.to_rfc3339())
        .bind(snapshot.company_id)
        .bind(snapshot.jobs_found)
        .bind(snapshot.new_jobs)
        .bind(snapshot.removed_jobs)
        .bind(snapshot.status.as_str())
        .bind(&snapshot.error_message)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn statistics(&self) -> Result<StoreStatistics> {
        let total_companies: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        let active_jobs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        let relevant_jobs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE is_active = 1 AND relevance_score IS NOT NULL")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let by_ats_rows = sqlx::query("SELECT ats_provider, COUNT(*) AS n FROM companies WHERE ats_provider IS NOT NULL GROUP BY ats_provider")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        let by_ats = by_ats_rows.iter().map(|r| (r.get("ats_provider"), r.get("n"))).collect();

        let by_category_rows = sqlx::query("SELECT category, COUNT(*) AS n FROM jobs WHERE category IS NOT NULL AND is_active = 1 GROUP BY category")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        let by_category = by_category_rows.iter().map(|r| (r.get("category"), r.get("n"))).collect();

        Ok(StoreStatistics {
            total_companies,
            active_jobs,
            relevant_jobs,
            by_ats,
            by_category,
        })
    }

    async fn export_rows(&self, only_relevant: bool) -> Result<Vec<ExportRow>> {
        let query = if only_relevant {
            "SELECT c.name AS company_name, c.domain, c.industry, j.title AS job_title, j.job_url, \
             j.department, j.location, j.posting_date, j.relevance_score, \
             dm.person_name AS decision_maker_name, dm.email AS decision_maker_email, \
             (c.first_seen_date = c.last_csv_date) AS is_new_company \
             FROM jobs j JOIN companies c ON c.id = j.company_id \
             LEFT JOIN decision_makers dm ON dm.company_id = c.id \
             WHERE j.is_active = 1 AND j.relevance_score IS NOT NULL"
        } else {
            "SELECT c.name AS company_name, c.domain, c.industry, j.title AS job_title, j.job_url, \
             j.department, j.location, j.posting_date, j.relevance_score, \
             dm.person_name AS decision_maker_name, dm.email AS decision_maker_email, \
             (c.first_seen_date = c.last_csv_date) AS is_new_company \
             FROM jobs j JOIN companies c ON c.id = j.company_id \
             LEFT JOIN decision_makers dm ON dm.company_id = c.id \
             WHERE j.is_active = 1"
        };

        let rows = sqlx::query(query).fetch_all(&self.pool).await.map_err(map_sqlx_error)?;
        Ok(rows
            .iter()
            .map(|row| ExportRow {
                company_name: row.get("company_name"),
                domain: row.get("domain"),
                industry: row.get("industry"),
                job_title: row.get("job_title"),
                job_url: row.get("job_url"),
                department: row.get("department"),
                location: row.get("location"),
                posting_date: parse_ts(row.get("posting_date")),
                relevance_score: row.get("relevance_score"),
                decision_maker_name: row.get("decision_maker_name"),
                decision_maker_email: row.get("decision_maker_email"),
                is_new_company: row.get::<i64, _>("is_new_company") != 0,
            })
            .collect())
    }
}
