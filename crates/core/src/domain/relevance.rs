// Relevance Scoring Domain Model
//
// Deterministic substring classifier. Ported signal-for-signal from the
// Python source's `RoleRelevanceScorer` (marketing variant); the shape
// generalizes to other role families via `RoleFamily`.

/// Result of scoring one `(title, description)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct RelevanceResult {
    pub score: f64,
    pub matched_category: String,
    pub matched_keywords: Vec<String>,
    pub is_relevant: bool,
}

/// A parameterized role family: required signals (mapped to a category),
/// an exclusion list that dominates any signal match, and description terms
/// that add a bounded boost.
pub struct RoleFamily {
    pub signals: &'static [(&'static str, &'static str)],
    pub exclusions: &'static [&'static str],
    pub description_terms: &'static [&'static str],
    pub category_refinements: &'static [(&'static str, &'static str)],
}

const MARKETING_SIGNALS: &[(&str, &str)] = &[
    ("marketing", "marketing_generalist"),
    ("seo", "seo"),
    ("ppc", "performance_marketing"),
    ("copywriter", "content_marketing"),
    ("copywriting", "content_marketing"),
    ("social media", "social_media"),
    ("brand manager", "brand_marketing"),
    ("demand gen", "demand_generation"),
    ("demand generation", "demand_generation"),
    ("paid media", "performance_marketing"),
    ("growth marketing", "growth_marketing"),
    ("cmo", "marketing_leadership"),
    ("chief marketing", "marketing_leadership"),
    ("public relations", "marketing_generalist"),
    ("communications manager", "marketing_generalist"),
    ("media buyer", "performance_marketing"),
];

const MARKETING_EXCLUSIONS: &[&str] = &[
    // Engineering / Tech
    "engineer",
    "engineering",
    "developer",
    "software",
    "devops",
    "sre",
    "qa ",
    "data scientist",
    "data engineer",
    "architect",
    // Sales
    "account executive",
    "sales development",
    "sdr",
    "bdr",
    "sales manager",
    "sales rep",
    "account manager",
    // HR / Recruiting
    "recruiter",
    "recruiting",
    "talent acquisition",
    "human resources",
    "hr generalist",
    "hr manager",
    // Finance / Legal
    "accountant",
    "accounting",
    "controller",
    "bookkeeper",
    "attorney",
    "lawyer",
    "paralegal",
    "auditor",
    // Customer / Support
    "customer support",
    "customer service",
    "technical support",
    "help desk",
    // Operations / Admin
    "office manager",
    "administrative assistant",
    "receptionist",
    "warehouse",
    // Product
    "product manager",
    "product owner",
    // Shipping / Logistics
    "shipping",
    "logistics",
    "driver",
    "warehouse associate",
    // Education / Childcare
    "teacher",
    "tutor",
    "childcare",
    "daycare",
    // Other
    "nurse",
    "physician",
    "chef",
    "cook",
    "server",
    "bartender",
    "janitor",
    "security guard",
];

const MARKETING_DESCRIPTION_TERMS: &[&str] = &[
    "marketing",
    "campaign",
    "brand",
    "content",
    "seo",
    "growth",
    "acquisition",
    "funnel",
    "conversion",
    "analytics",
    "strategy",
];

const MARKETING_CATEGORY_REFINEMENTS: &[(&str, &str)] = &[
    ("director", "marketing_leadership"),
    ("vp", "marketing_leadership"),
    ("head of", "marketing_leadership"),
    ("product marketing", "product_marketing"),
    ("content", "content_marketing"),
    ("brand", "brand_marketing"),
    ("demand", "demand_generation"),
    ("growth", "growth_marketing"),
    ("social", "social_media"),
    ("seo", "seo"),
    ("paid", "performance_marketing"),
    ("ppc", "performance_marketing"),
    ("performance", "performance_marketing"),
    ("email", "lifecycle_crm"),
    ("lifecycle", "lifecycle_crm"),
    ("retention", "lifecycle_crm"),
];

impl RoleFamily {
    /// The marketing role family: the default and only family carried end
    /// to end by this implementation. IT/sales variants in the original
    /// source would be constructed the same way from their own enumerations.
    pub const fn marketing() -> Self {
        RoleFamily {
            signals: MARKETING_SIGNALS,
            exclusions: MARKETING_EXCLUSIONS,
            description_terms: MARKETING_DESCRIPTION_TERMS,
            category_refinements: MARKETING_CATEGORY_REFINEMENTS,
        }
    }

    /// Score a `(title, description)` pair. See SPEC_FULL.md §4.2 for the
    /// exact step ordering this follows.
    pub fn score(&self, title: &str, description: &str, threshold: f64) -> RelevanceResult {
        let title_lower = title.trim().to_lowercase();

        if let Some(hit) = self.exclusions.iter().find(|kw| title_lower.contains(**kw)) {
            let _ = hit;
            return RelevanceResult {
                score: 0.0,
                matched_category: "excluded".to_string(),
                matched_keywords: Vec::new(),
                is_relevant: false,
            };
        }

        let signal_hit = self.signals.iter().find(|(sig, _)| title_lower.contains(sig));
        let Some((signal, base_category)) = signal_hit else {
            return RelevanceResult {
                score: 0.0,
                matched_category: "no_marketing_signal".to_string(),
                matched_keywords: Vec::new(),
                is_relevant: false,
            };
        };

        let mut category = base_category.to_string();
        for (keyword, refined) in self.category_refinements {
            if title_lower.contains(keyword) {
                category = refined.to_string();
                break;
            }
        }

        let description_lower = description.to_lowercase();
        let hits = self
            .description_terms
            .iter()
            .filter(|term| description_lower.contains(**term))
            .count();
        let boost = ((hits * 4) as f64).min(20.0);
        let score = (80.0 + boost).min(100.0);

        RelevanceResult {
            score,
            matched_category: category,
            matched_keywords: vec![signal.to_string()],
            is_relevant: score >= threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusion_dominates_any_signal() {
        let family = RoleFamily::marketing();
        let result = family.score("Engineering Manager, Marketing Platform", "", 60.0);
        assert_eq!(result.matched_category, "excluded");
        assert_eq!(result.score, 0.0);
        assert!(!result.is_relevant);
    }

    #[test]
    fn no_signal_is_not_relevant() {
        let family = RoleFamily::marketing();
        let result = family.score("Warehouse Associate", "", 60.0);
        assert_eq!(result.matched_category, "no_marketing_signal");
        assert!(!result.is_relevant);
    }

    #[test]
    fn plain_marketing_manager_scores_base() {
        let family = RoleFamily::marketing();
        let result = family.score("Marketing Manager", "", 60.0);
        assert_eq!(result.score, 80.0);
        assert!(result.is_relevant);
    }

    #[test]
    fn description_boost_is_capped_at_20() {
        let family = RoleFamily::marketing();
        let description = "marketing campaign brand content seo growth acquisition funnel conversion analytics strategy";
        let result = family.score("Marketing Manager", description, 60.0);
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn leadership_title_refines_category() {
        let family = RoleFamily::marketing();
        let result = family.score("Director of Marketing", "", 60.0);
        assert_eq!(result.matched_category, "marketing_leadership");
    }

    #[test]
    fn score_is_always_in_bounds_and_consistent_with_threshold() {
        let family = RoleFamily::marketing();
        for title in ["Marketing Manager", "Senior SEO Specialist", "Recruiter", "Totally Unrelated"] {
            let result = family.score(title, "", 60.0);
            assert!((0.0..=100.0).contains(&result.score));
            assert_eq!(result.is_relevant, result.score >= 60.0);
        }
    }
}
