// RobotsPolicy Adapter
//
// Ported from the original source's `RobotsChecker` (MarketingListDiscovery/
// scrapers/robots_checker.py): fetch `{scheme}://{domain}/robots.txt` once,
// cache the parsed rule set for 24h on success or 1h on failure, and
// default-allow whenever robots.txt cannot be retrieved or parsed. The
// in-process cache is scoped to one invocation (§5: "the robots-policy cache
// is in-memory only and scoped to the invocation").

use async_trait::async_trait;
use leadsignal_core::error::Result;
use leadsignal_core::port::robots_policy::RobotsPolicy;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const USER_AGENT: &str = "LeadSignal";
const SUCCESS_TTL: Duration = Duration::from_secs(24 * 3600);
const FAILURE_TTL: Duration = Duration::from_secs(3600);

struct CacheEntry {
    rules: Option<Vec<Rule>>,
    expires_at: Instant,
}

#[derive(Debug, Clone)]
struct Rule {
    prefix: String,
    allow: bool,
}

/// A minimal `robots.txt` rule evaluator: longest-matching-prefix wins among
/// the rules scoped to our user agent or `*`, mirroring the precedence
/// Python's `urllib.robotparser` applies.
fn parse_robots_txt(body: &str) -> Vec<Rule> {
    let mut rules = Vec::new();
    let mut applies_to_us = false;
    let mut seen_any_agent = false;

    for raw_line in body.lines() {
        let line = raw_line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else { continue };
        let key = key.trim().to_lowercase();
        let value = value.trim();

        match key.as_str() {
            "user-agent" => {
                seen_any_agent = true;
                applies_to_us = value == "*" || value.eq_ignore_ascii_case(USER_AGENT);
            }
            "disallow" if applies_to_us && !value.is_empty() => {
                rules.push(Rule { prefix: value.to_string(), allow: false });
            }
            "allow" if applies_to_us => {
                rules.push(Rule { prefix: value.to_string(), allow: true });
            }
            _ => {}
        }
    }

    if !seen_any_agent {
        return Vec::new();
    }
    rules
}

fn evaluate(rules: &[Rule], path: &str) -> bool {
    let mut best: Option<&Rule> = None;
    for rule in rules {
        if path.starts_with(rule.prefix.as_str()) {
            if best.map(|b| rule.prefix.len() > b.prefix.len()).unwrap_or(true) {
                best = Some(rule);
            }
        }
    }
    best.map(|r| r.allow).unwrap_or(true)
}

pub struct RobotsChecker {
    client: reqwest::Client,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl RobotsChecker {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client, cache: Mutex::new(HashMap::new()) }
    }

    async fn fetch_rules(&self, domain: &str) -> Option<Vec<Rule>> {
        let url = format!("https://{domain}/robots.txt");
        match self.client.get(&url).timeout(Duration::from_secs(10)).send().await {
            Ok(response) if response.status().is_success() => {
                let body = response.text().await.ok()?;
                Some(parse_robots_txt(&body))
            }
            Ok(response) => {
                debug!(domain, status = %response.status(), "robots.txt not found, allowing all");
                None
            }
            Err(err) => {
                warn!(domain, %err, "failed to fetch robots.txt");
                None
            }
        }
    }
}

#[async_trait]
impl RobotsPolicy for RobotsChecker {
    async fn is_allowed(&self, domain: &str, path: &str) -> Result<bool> {
        let cached = {
            let cache = self.cache.lock().unwrap();
            cache.get(domain).filter(|e| e.expires_at > Instant::now()).map(|e| e.rules.clone())
        };

        let rules = if let Some(rules) = cached {
            rules
        } else {
            let fetched = self.fetch_rules(domain).await;
            let ttl = if fetched.is_some() { SUCCESS_TTL } else { FAILURE_TTL };
            let mut cache = self.cache.lock().unwrap();
            cache.insert(domain.to_string(), CacheEntry { rules: fetched.clone(), expires_at: Instant::now() + ttl });
            fetched
        };

        Ok(match rules {
            Some(rules) => evaluate(&rules, path),
            None => true,
        })
    }
}

impl Clone for Rule {
    fn clone(&self) -> Self {
        Rule { prefix: self.prefix.clone(), allow: self.allow }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disallow_rule_blocks_matching_prefix() {
        let rules = parse_robots_txt("User-agent: *\nDisallow: /private\n");
        assert!(!evaluate(&rules, "/private/data"));
        assert!(evaluate(&rules, "/public"));
    }

    #[test]
    fn longest_prefix_wins() {
        let rules = parse_robots_txt("User-agent: *\nDisallow: /a\nAllow: /a/b\n");
        assert!(evaluate(&rules, "/a/b/c"));
        assert!(!evaluate(&rules, "/a/x"));
    }

    #[test]
    fn no_matching_agent_section_allows_everything() {
        let rules = parse_robots_txt("User-agent: Googlebot\nDisallow: /\n");
        assert!(evaluate(&rules, "/anything"));
    }

    #[tokio::test]
    async fn unreachable_domain_defaults_to_allowed() {
        let checker = RobotsChecker::new(reqwest::Client::new());
        let allowed = checker.is_allowed("this-domain-should-not-resolve.invalid", "/careers").await.unwrap();
        assert!(allowed);
    }
}
