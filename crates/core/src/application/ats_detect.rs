// ATS Detection Engine (§4.3)
//
// Owns the cache -> api_probe -> html_fingerprint -> careers_sweep ->
// linkedin_fallback pipeline. Generic over an `HttpProbe` port so the fan-out
// logic is testable against a scripted fake without a real network (§8
// scenario 5), and over a `Store` for the detection cache.

use crate::domain::ats::{
    self, build_endpoint_url, extract_linkedin_slug, fingerprint_match, redirect_match, validate_probe_response,
    AtsDetectionResult, AtsProvider, API_PROBED_ORDER, CAREERS_SUBDOMAINS, FINGERPRINT_ONLY, PRIORITY_CAREERS_PATHS,
    SECONDARY_CAREERS_PATHS,
};
use crate::error::Result;
use crate::port::http_probe::HttpProbe;
use crate::port::store::Store;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);
const HOMEPAGE_TIMEOUT: Duration = Duration::from_secs(5);
const CACHE_TTL_DAYS: i64 = 7;

pub struct AtsDetectionEngine {
    probe: Arc<dyn HttpProbe>,
    store: Arc<dyn Store>,
}

impl AtsDetectionEngine {
    pub fn new(probe: Arc<dyn HttpProbe>, store: Arc<dyn Store>) -> Self {
        Self { probe, store }
    }

    pub async fn detect(
        &self,
        company_name: &str,
        domain: &str,
        technologies_hint: Option<&str>,
    ) -> Result<AtsDetectionResult> {
        if let Some(entry) = self.store.cache_get(domain).await? {
            debug!(domain, "ats cache hit");
            return Ok(AtsDetectionResult::cache_hit(entry.provider, entry.board_token));
        }

        let candidates = ats::generate_token_candidates(company_name, domain, None);
        let priority_order = priority_provider_order(technologies_hint);

        if let Some(result) = self.probe_apis(&priority_order, &candidates).await? {
            self.cache_success(domain, &result).await?;
            return Ok(result);
        }

        let (homepage, www_homepage) = tokio::join!(
            self.fetch_homepage(&format!("https://{domain}")),
            self.fetch_homepage(&format!("https://www.{domain}")),
        );
        let bodies: Vec<String> = [homepage, www_homepage].into_iter().flatten().collect();

        if let Some(result) = fingerprint_bodies(&bodies) {
            self.cache_success(domain, &result).await?;
            return Ok(result);
        }

        if let Some(result) = self.careers_sweep(domain).await? {
            self.cache_success(domain, &result).await?;
            return Ok(result);
        }

        let result = bodies
            .iter()
            .find_map(|html| extract_linkedin_slug(html))
            .map(AtsDetectionResult::linkedin_fallback)
            .unwrap_or_else(AtsDetectionResult::default_fallback);

        if !matches!(result.detection_method, "default_fallback") {
            self.cache_success(domain, &result).await?;
        }
        Ok(result)
    }

    async fn cache_success(&self, domain: &str, result: &AtsDetectionResult) -> Result<()> {
        info!(domain, provider = ?result.provider, method = result.detection_method, "ats detected");
        self.store
            .cache_set(domain, result.provider, result.board_token.as_deref(), CACHE_TTL_DAYS)
            .await
    }

    async fn probe_apis(
        &self,
        order: &[AtsProvider],
        candidates: &[String],
    ) -> Result<Option<AtsDetectionResult>> {
        let mut futures = Vec::new();
        for provider in order {
            for token in candidates {
                let Some(url) = build_endpoint_url(*provider, token) else {
                    continue;
                };
                futures.push(self.probe_one(*provider, token.clone(), url));
            }
        }

        let results = join_all(futures).await;
        for provider in order {
            for hit in results.iter().flatten() {
                if hit.0 == *provider {
                    return Ok(Some(AtsDetectionResult::api_probe(hit.0, hit.1.clone())));
                }
            }
        }
        Ok(None)
    }

    async fn probe_one(&self, provider: AtsProvider, token: String, url: String) -> Option<(AtsProvider, String)> {
        let response = self.probe.get(&url, PROBE_TIMEOUT).await.ok()?;
        if response.is_ok() && validate_probe_response(provider, &response.body) {
            Some((provider, token))
        } else {
            None
        }
    }

    async fn fetch_homepage(&self, url: &str) -> Option<String> {
        let response = self.probe.get(url, HOMEPAGE_TIMEOUT).await.ok()?;
        response.is_ok().then_some(response.body)
    }

    async fn careers_sweep(&self, domain: &str) -> Result<Option<AtsDetectionResult>> {
        let mut urls: Vec<String> = PRIORITY_CAREERS_PATHS
            .iter()
            .map(|path| format!("https://{domain}{path}"))
            .collect();
        urls.extend(CAREERS_SUBDOMAINS.iter().map(|sub| format!("https://{sub}.{domain}")));
        let priority_count = urls.len();
        urls.extend(SECONDARY_CAREERS_PATHS.iter().map(|path| format!("https://{domain}{path}")));

        let futures = urls.iter().map(|url| self.probe.get(url, HOMEPAGE_TIMEOUT));
        let responses = join_all(futures).await;

        // priority tier first, then secondary, matching §4.3.5's two-tier order.
        let tiers = [0..priority_count, priority_count..urls.len()];
        for tier in tiers {
            for response in &responses[tier] {
                let Ok(response) = response else { continue };
                if !response.is_ok() {
                    continue;
                }
                if let Some(hit) = find_redirect_hit(&response.final_url) {
                    return Ok(Some(hit));
                }
                if let Some(hit) = find_fingerprint_hit(&response.body) {
                    return Ok(Some(hit));
                }
            }
        }
        Ok(None)
    }
}

fn priority_provider_order(technologies_hint: Option<&str>) -> Vec<AtsProvider> {
    let mut order: Vec<AtsProvider> = API_PROBED_ORDER.to_vec();
    if let Some(hint) = technologies_hint {
        let hint_lower = hint.to_lowercase();
        if let Some(pos) = order.iter().position(|p| hint_lower.contains(p.as_str())) {
            let named = order.remove(pos);
            order.insert(0, named);
        }
    }
    order
}

fn fingerprint_bodies(bodies: &[String]) -> Option<AtsDetectionResult> {
    for body in bodies {
        if let Some(hit) = find_fingerprint_hit(body) {
            return Some(hit);
        }
    }
    None
}

fn find_fingerprint_hit(html: &str) -> Option<AtsDetectionResult> {
    API_PROBED_ORDER
        .into_iter()
        .chain(FINGERPRINT_ONLY.into_iter())
        .find_map(|provider| fingerprint_match(provider, html).map(|token| AtsDetectionResult::html_fingerprint(provider, token)))
}

fn find_redirect_hit(final_url: &str) -> Option<AtsDetectionResult> {
    API_PROBED_ORDER
        .into_iter()
        .chain(FINGERPRINT_ONLY.into_iter())
        .find_map(|provider| redirect_match(provider, final_url).map(|token| AtsDetectionResult::url_redirect(provider, token)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::store::{AtsCacheEntry, ExportRow, StoreStatistics};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    struct ScriptedProbe {
        responses: Mutex<std::collections::HashMap<String, crate::port::http_probe::ProbeResponse>>,
    }

    #[async_trait]
    impl HttpProbe for ScriptedProbe {
        async fn get(&self, url: &str, _timeout: Duration) -> Result<crate::port::http_probe::ProbeResponse> {
            self.responses
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| crate::error::AppError::Transient("no route".into()))
        }
    }

    struct NullStore;

    #[async_trait]
    impl Store for NullStore {
        async fn upsert_company(&self, _c: &crate::domain::Company, _run_date: chrono::DateTime<Utc>) -> Result<(i64, bool)> {
            unimplemented!()
        }
        async fn update_company_ats(&self, _id: i64, _p: Option<AtsProvider>, _t: Option<&str>) -> Result<()> {
            Ok(())
        }
        async fn update_company_urgency(&self, _id: i64, _score: i64) -> Result<()> {
            Ok(())
        }
        async fn get_company_by_domain(&self, _domain: &str) -> Result<Option<crate::domain::Company>> {
            Ok(None)
        }
        async fn companies_sorted_by_recency(&self, _limit: i64) -> Result<Vec<crate::domain::Company>> {
            Ok(vec![])
        }
        async fn top_companies_by_urgency(&self, _limit: i64) -> Result<Vec<crate::domain::Company>> {
            Ok(vec![])
        }
        async fn insert_job(&self, _job: &crate::domain::Job) -> Result<i64> {
            unimplemented!()
        }
        async fn mark_job_inactive(&self, _id: i64, _seen_at: chrono::DateTime<Utc>) -> Result<()> {
            Ok(())
        }
        async fn update_job_last_seen(&self, _id: i64, _seen_at: chrono::DateTime<Utc>) -> Result<()> {
            Ok(())
        }
        async fn update_job_verification(&self, _id: i64, _status: crate::domain::job::VerificationStatus) -> Result<()> {
            Ok(())
        }
        async fn active_jobs_for_company(&self, _id: i64) -> Result<Vec<crate::domain::Job>> {
            Ok(vec![])
        }
        async fn apply_change_report(&self, _report: &crate::domain::ChangeReport) -> Result<Vec<crate::domain::JobChange>> {
            Ok(vec![])
        }
        async fn upsert_decision_maker(&self, _id: i64, _r: &crate::domain::DecisionMakerResult) -> Result<()> {
            Ok(())
        }
        async fn get_decision_maker_for_company(&self, _id: i64) -> Result<Option<crate::domain::DecisionMakerResult>> {
            Ok(None)
        }
        async fn is_company_seen(&self, _domain: &str) -> Result<bool> {
            Ok(false)
        }
        async fn mark_company_seen(&self, _domain: &str, _name: &str, _date: chrono::DateTime<Utc>, _run_id: &str) -> Result<()> {
            Ok(())
        }
        async fn reset_seen_companies(&self) -> Result<u64> {
            Ok(0)
        }
        async fn cache_get(&self, _domain: &str) -> Result<Option<AtsCacheEntry>> {
            Ok(None)
        }
        async fn cache_set(&self, _domain: &str, _p: Option<AtsProvider>, _t: Option<&str>, _ttl: i64) -> Result<()> {
            Ok(())
        }
        async fn cache_clear_expired(&self) -> Result<u64> {
            Ok(0)
        }
        async fn record_run_snapshot(&self, _s: &crate::domain::RunSnapshot) -> Result<()> {
            Ok(())
        }
        async fn statistics(&self) -> Result<StoreStatistics> {
            Ok(StoreStatistics::default())
        }
        async fn export_rows(&self, _only_relevant: bool) -> Result<Vec<ExportRow>> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn api_probe_hit_wins_over_fallback() {
        let mut responses = std::collections::HashMap::new();
        responses.insert(
            "https://api.greenhouse.io/v1/boards/acme/jobs".to_string(),
            crate::port::http_probe::ProbeResponse {
                status: 200,
                final_url: "https://api.greenhouse.io/v1/boards/acme/jobs".to_string(),
                body: r#"{"jobs":[{"id":1}]}"#.to_string(),
            },
        );
        let probe = Arc::new(ScriptedProbe {
            responses: Mutex::new(responses),
        });
        let store = Arc::new(NullStore);
        let engine = AtsDetectionEngine::new(probe, store);

        let result = engine.detect("Acme", "acme.com", None).await.unwrap();
        assert_eq!(result.provider, Some(AtsProvider::Greenhouse));
        assert_eq!(result.detection_method, "api_probe");
        assert_eq!(result.board_token.as_deref(), Some("acme"));
    }

    #[tokio::test]
    async fn no_hits_anywhere_falls_back_to_default() {
        let probe = Arc::new(ScriptedProbe {
            responses: Mutex::new(std::collections::HashMap::new()),
        });
        let store = Arc::new(NullStore);
        let engine = AtsDetectionEngine::new(probe, store);

        let result = engine.detect("Nobody", "nobody.example", None).await.unwrap();
        assert!(result.is_unknown());
        assert_eq!(result.detection_method, "default_fallback");
    }
}
