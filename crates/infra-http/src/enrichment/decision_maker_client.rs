// Gemini-backed decision-maker finder.
//
// Ported from the original source's `ITDecisionMakerFinder`: batches
// companies, prompts Gemini (with Google Search grounding) for exactly one
// decision maker per company, and parses the response through a tolerant
// cascade (direct JSON -> fenced-code-stripped JSON -> longest JSON-array
// substring -> per-company regex sweep) since the model's output is
// natural-language-adjacent, not a guaranteed API contract.

use leadsignal_core::application::RetryPolicy;
use leadsignal_core::domain::decision_maker::{Confidence, NOT_CONFIDENTLY_IDENTIFIABLE};
use leadsignal_core::domain::{DecisionMakerResult, Industry};
use leadsignal_core::error::{AppError, Result};
use leadsignal_core::port::llm_client::{DecisionMakerQuery, LlmClient};
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(30);

const PROMPT_TEMPLATE: &str = "You have access to Google Search grounding. Your task is to identify \
the single most appropriate current decision maker responsible for IT purchasing, technology \
operations, or general business operations at each of the companies listed below.\n\n\
For each company, return exactly one person, chosen using this strict priority order:\n\
1. Owner, CEO, Founder, or Co-Founder (most common IT buyer at small businesses)\n\
2. IT Director, IT Manager, or CTO\n\
3. Office Manager, COO, or Operations Manager\n\n\
You must use only publicly verifiable sources such as LinkedIn profiles, company \"About\" or \
\"Team\" pages, or reputable press articles. Do not guess, infer, or hallucinate names or titles. \
If you cannot confidently identify a suitable person, explicitly return \"Not confidently \
identifiable\" and briefly state why.\n\n\
Do not return multiple people, do not list alternatives, and do not select individual \
contributors. Exclude recruiters, HR, engineers, designers, consultants, agencies, and former \
employees.\n\n\
For each company, output the company name, the decision maker's full name, exact current title, \
a source URL proving the role, a confidence level (High if the LinkedIn title clearly matches and \
is current, Medium if there is one strong but slightly ambiguous source), and the approximate \
employee count for the company. Also determine the industry category for each company. Choose \
exactly one from this list: Healthcare, Legal, Financial Services, Manufacturing, Professional \
Services, Construction, Real Estate, Retail / E-commerce, Education, Nonprofits, Food & Beverage, \
Other.\n\n\
IMPORTANT: Return your results as a JSON array. Each element must be an object with these exact \
keys: \"company_name\", \"person_name\", \"title\", \"source_url\", \"confidence\", \
\"employee_count\", \"industry\". If not identifiable, set person_name to \"Not confidently \
identifiable\" and add a \"reason\" key.\n\n\
Companies:\n{company_list}";

pub struct GeminiDecisionMakerClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    batch_size: usize,
    retry: RetryPolicy,
}

impl GeminiDecisionMakerClient {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, model: impl Into<String>, batch_size: usize) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            batch_size: batch_size.max(1),
            retry: RetryPolicy::default_enricher(),
        }
    }

    fn prompt_for(batch: &[DecisionMakerQuery]) -> String {
        let company_list = batch
            .iter()
            .map(|c| match &c.website {
                Some(site) if !site.is_empty() => format!("- {} (website: {})", c.company_name, site),
                _ => format!("- {}", c.company_name),
            })
            .collect::<Vec<_>>()
            .join("\n");
        PROMPT_TEMPLATE.replace("{company_list}", &company_list)
    }

    async fn call_gemini(&self, prompt: &str) -> Result<String> {
        let url = format!("https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}", self.model, self.api_key);
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "tools": [{ "google_search": {} }],
            "generationConfig": { "temperature": 0.0 },
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .timeout(TIMEOUT)
            .send()
            .await
            .map_err(|e| if e.is_timeout() || e.is_connect() { AppError::Transient(format!("gemini: {e}")) } else { AppError::Http(format!("gemini: {e}")) })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::Transient(format!("gemini rate limited: {status}")));
        }
        if !status.is_success() {
            return Err(AppError::Http(format!("gemini returned {status}")));
        }

        let parsed: serde_json::Value = response.json().await.map_err(|e| AppError::ParseFailed(format!("gemini body: {e}")))?;
        parsed
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or_else(|| AppError::ParseFailed("gemini response missing text".into()))
    }

    async fn process_batch(&self, batch: &[DecisionMakerQuery]) -> Result<Vec<DecisionMakerResult>> {
        let prompt = Self::prompt_for(batch);
        let raw_text = self.retry.run(|| self.call_gemini(&prompt)).await?;
        Ok(parse_response(&raw_text, batch))
    }
}

#[async_trait]
impl LlmClient for GeminiDecisionMakerClient {
    async fn find_decision_makers(&self, companies: &[DecisionMakerQuery]) -> Result<Vec<DecisionMakerResult>> {
        let mut all_results = Vec::new();
        for batch in companies.chunks(self.batch_size) {
            match self.process_batch(batch).await {
                Ok(results) => all_results.extend(results),
                Err(e) => {
                    for company in batch {
                        all_results.push(DecisionMakerResult::not_found(company.company_name.clone(), format!("API error: {e}")));
                    }
                }
            }
        }
        Ok(all_results)
    }
}

fn parse_response(raw_text: &str, batch: &[DecisionMakerQuery]) -> Vec<DecisionMakerResult> {
    let batch_names: Vec<&str> = batch.iter().map(|c| c.company_name.as_str()).collect();
    let mut by_company: HashMap<String, DecisionMakerResult> = HashMap::new();

    if let Some(entries) = try_parse_json(raw_text) {
        for entry in entries {
            let name = entry.get("company_name").and_then(|v| v.as_str()).unwrap_or_default();
            let Some(matched) = match_company_name(name, &batch_names) else { continue };

            let person = entry.get("person_name").and_then(|v| v.as_str()).unwrap_or_default();
            if !person.is_empty() && person.to_lowercase().contains("not confidently") {
                let reason = entry.get("reason").and_then(|v| v.as_str()).unwrap_or(person).to_string();
                by_company.insert(matched.to_string(), DecisionMakerResult::not_found(matched, reason));
                continue;
            }

            let employee_count = entry.get("employee_count").and_then(parse_employee_count);
            let industry = entry.get("industry").and_then(|v| v.as_str()).map(Industry::parse_or_other);
            let confidence = entry.get("confidence").and_then(|v| v.as_str()).and_then(Confidence::parse);

            by_company.insert(
                matched.to_string(),
                DecisionMakerResult {
                    company_name: matched.to_string(),
                    person_name: if person.is_empty() { None } else { Some(person.to_string()) },
                    title: entry.get("title").and_then(|v| v.as_str()).map(str::to_string),
                    source_url: entry.get("source_url").and_then(|v| v.as_str()).map(str::to_string),
                    confidence,
                    employee_count,
                    industry,
                    not_found_reason: None,
                    raw_text: Some(entry.to_string()),
                    email: None,
                    linkedin_url: None,
                },
            );
        }
    } else {
        regex_parse(raw_text, &batch_names, &mut by_company);
    }

    for name in &batch_names {
        by_company.entry((*name).to_string()).or_insert_with(|| DecisionMakerResult::not_found(*name, "Not found in Gemini response"));
    }

    by_company.into_values().collect()
}

fn parse_employee_count(value: &serde_json::Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

fn try_parse_json(text: &str) -> Option<Vec<serde_json::Value>> {
    let trimmed = text.trim();
    let cleaned = if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() >= 2 {
            lines[1..lines.len() - 1].join("\n")
        } else {
            trimmed.to_string()
        }
    } else {
        trimmed.to_string()
    };

    if let Ok(serde_json::Value::Array(arr)) = serde_json::from_str::<serde_json::Value>(&cleaned) {
        return Some(arr);
    }

    let re = Regex::new(r"(?s)\[.*\]").ok()?;
    let candidate = re.find(text)?.as_str();
    match serde_json::from_str::<serde_json::Value>(candidate) {
        Ok(serde_json::Value::Array(arr)) => Some(arr),
        _ => None,
    }
}

fn match_company_name<'a>(name: &str, candidates: &[&'a str]) -> Option<&'a str> {
    if name.is_empty() {
        return None;
    }
    let lower = name.to_lowercase();
    for candidate in candidates {
        let candidate_lower = candidate.to_lowercase();
        if candidate_lower == lower || lower.contains(&candidate_lower) || candidate_lower.contains(&lower) {
            return Some(candidate);
        }
    }
    None
}

fn regex_parse(text: &str, candidates: &[&str], out: &mut HashMap<String, DecisionMakerResult>) {
    let person_re = Regex::new(r"(?i)(?:name|person|decision maker)[:\s]*([A-Z][a-z]+ [A-Z][a-z]+(?:\s[A-Z][a-z]+)?)").unwrap();
    let title_re = Regex::new(r"(?i)(?:title|role|position)[:\s]*(.+?)(?:\n|,|$)").unwrap();
    let url_re = Regex::new(r"(?i)(?:source|url|link)[:\s]*(https?://\S+)").unwrap();
    let conf_re = Regex::new(r"(?i)confidence[:\s]*(high|medium)").unwrap();

    for &company_name in candidates {
        let block_re = match Regex::new(&format!(r"(?is){}[:\s\-]*(.+?)(?:\n\n|\n-|\z)", regex::escape(company_name))) {
            Ok(re) => re,
            Err(_) => continue,
        };
        let Some(caps) = block_re.captures(text) else { continue };
        let block = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();

        if block.to_lowercase().contains("not confidently") {
            out.insert(company_name.to_string(), DecisionMakerResult::not_found(company_name, block.chars().take(200).collect::<String>()));
            continue;
        }

        out.insert(
            company_name.to_string(),
            DecisionMakerResult {
                company_name: company_name.to_string(),
                person_name: person_re.captures(block).and_then(|c| c.get(1)).map(|m| m.as_str().trim().to_string()),
                title: title_re.captures(block).and_then(|c| c.get(1)).map(|m| m.as_str().trim().to_string()),
                source_url: url_re.captures(block).and_then(|c| c.get(1)).map(|m| m.as_str().trim().to_string()),
                confidence: conf_re.captures(block).and_then(|c| c.get(1)).and_then(|m| Confidence::parse(m.as_str())),
                employee_count: None,
                industry: None,
                not_found_reason: None,
                raw_text: Some(block.to_string()),
                email: None,
                linkedin_url: None,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> Vec<DecisionMakerQuery> {
        vec![
            DecisionMakerQuery { company_name: "Acme Corp".into(), website: Some("acme.com".into()) },
            DecisionMakerQuery { company_name: "Beta LLC".into(), website: None },
        ]
    }

    #[test]
    fn parses_direct_json_array() {
        let text = r#"[
            {"company_name": "Acme Corp", "person_name": "Jane Doe", "title": "CEO",
             "source_url": "https://linkedin.com/in/jane", "confidence": "High",
             "employee_count": 25, "industry": "Manufacturing"},
            {"company_name": "Beta LLC", "person_name": "Not confidently identifiable",
             "reason": "No public sources found"}
        ]"#;
        let results = parse_response(text, &batch());
        assert_eq!(results.len(), 2);
        let acme = results.iter().find(|r| r.company_name == "Acme Corp").unwrap();
        assert_eq!(acme.person_name.as_deref(), Some("Jane Doe"));
        assert!(matches!(acme.industry, Some(Industry::Manufacturing)));
        let beta = results.iter().find(|r| r.company_name == "Beta LLC").unwrap();
        assert_eq!(beta.not_found_reason.as_deref(), Some("No public sources found"));
        assert!(!beta.is_persistable());
    }

    #[test]
    fn strips_fenced_code_block() {
        let text = "```json\n[{\"company_name\": \"Acme Corp\", \"person_name\": \"Not confidently identifiable\"}]\n```";
        let results = parse_response(text, &batch());
        let acme = results.iter().find(|r| r.company_name == "Acme Corp").unwrap();
        assert!(acme.not_found_reason.is_some());
    }

    #[test]
    fn unmatched_company_gets_default_not_found() {
        let text = r#"[{"company_name": "Acme Corp", "person_name": "Jane Doe"}]"#;
        let results = parse_response(text, &batch());
        let beta = results.iter().find(|r| r.company_name == "Beta LLC").unwrap();
        assert_eq!(beta.not_found_reason.as_deref(), Some("Not found in Gemini response"));
    }

    #[test]
    fn unknown_industry_coerces_to_other() {
        let text = r#"[{"company_name": "Acme Corp", "person_name": "Jane Doe", "industry": "Aerospace"}]"#;
        let results = parse_response(text, &batch());
        let acme = results.iter().find(|r| r.company_name == "Acme Corp").unwrap();
        assert!(matches!(acme.industry, Some(Industry::Other)));
    }

    #[test]
    fn sentinel_string_is_not_persistable() {
        let result = DecisionMakerResult {
            person_name: Some(NOT_CONFIDENTLY_IDENTIFIABLE.to_string()),
            ..DecisionMakerResult::not_found("Acme", "x")
        };
        assert!(!result.is_persistable());
    }
}
