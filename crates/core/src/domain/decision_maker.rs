// Decision Maker / Email Enrichment Domain Model

/// The closed industry vocabulary from the original source's
/// `ITDecisionMakerFinder`. Values outside this set are coerced to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Industry {
    Healthcare,
    Legal,
    FinancialServices,
    Manufacturing,
    ProfessionalServices,
    Construction,
    RealEstate,
    RetailEcommerce,
    Education,
    Nonprofits,
    FoodAndBeverage,
    Other,
}

impl Industry {
    pub fn parse_or_other(raw: &str) -> Self {
        match raw {
            "Healthcare" => Industry::Healthcare,
            "Legal" => Industry::Legal,
            "Financial Services" => Industry::FinancialServices,
            "Manufacturing" => Industry::Manufacturing,
            "Professional Services" => Industry::ProfessionalServices,
            "Construction" => Industry::Construction,
            "Real Estate" => Industry::RealEstate,
            "Retail / E-commerce" => Industry::RetailEcommerce,
            "Education" => Industry::Education,
            "Nonprofits" => Industry::Nonprofits,
            "Food & Beverage" => Industry::FoodAndBeverage,
            _ => Industry::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Industry::Healthcare => "Healthcare",
            Industry::Legal => "Legal",
            Industry::FinancialServices => "Financial Services",
            Industry::Manufacturing => "Manufacturing",
            Industry::ProfessionalServices => "Professional Services",
            Industry::Construction => "Construction",
            Industry::RealEstate => "Real Estate",
            Industry::RetailEcommerce => "Retail / E-commerce",
            Industry::Education => "Education",
            Industry::Nonprofits => "Nonprofits",
            Industry::FoodAndBeverage => "Food & Beverage",
            Industry::Other => "Other",
        }
    }
}

/// Confidence label a decision-maker lookup assigns, per §4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    High,
    Medium,
}

impl Confidence {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "high" => Some(Confidence::High),
            "medium" => Some(Confidence::Medium),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
        }
    }
}

/// The sentinel the LLM returns when it declines to name anyone (§4.6).
pub const NOT_CONFIDENTLY_IDENTIFIABLE: &str = "Not confidently identifiable";

/// Result of a decision-maker lookup for one company.
#[derive(Debug, Clone, Default)]
pub struct DecisionMakerResult {
    pub company_name: String,
    pub person_name: Option<String>,
    pub title: Option<String>,
    pub source_url: Option<String>,
    pub confidence: Option<Confidence>,
    pub employee_count: Option<i64>,
    pub industry: Option<Industry>,
    /// Populated when the lookup failed or the model refused (never an
    /// `AppError` — §7 `ModelRefused` is data, not an error).
    pub not_found_reason: Option<String>,
    pub raw_text: Option<String>,
    /// Filled in by a later `EmailFinder` pass (§4.6); absent on the
    /// `DecisionMakerFinder`'s own output. `UpsertDecisionMaker` only
    /// overwrites a stored field when the corresponding one here is `Some`.
    pub email: Option<String>,
    pub linkedin_url: Option<String>,
}

impl Default for Confidence {
    fn default() -> Self {
        Confidence::Medium
    }
}

impl DecisionMakerResult {
    pub fn not_found(company_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            not_found_reason: Some(reason.into()),
            ..Default::default()
        }
    }

    /// A result is persistable only when `person_name` is present and is not
    /// the refusal sentinel (§3 invariant: `DecisionMaker.person_name` is
    /// either absent or a non-placeholder).
    pub fn is_persistable(&self) -> bool {
        matches!(&self.person_name, Some(name) if name != NOT_CONFIDENTLY_IDENTIFIABLE)
    }
}

/// Result of a bulk-enrichment email lookup for one decision maker.
#[derive(Debug, Clone, Default)]
pub struct EmailLookupResult {
    pub company_name: String,
    pub person_name: String,
    pub email: Option<String>,
    pub linkedin_url: Option<String>,
    pub apollo_title: Option<String>,
    pub not_found_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_industry_coerces_to_other() {
        assert!(matches!(Industry::parse_or_other("Aerospace"), Industry::Other));
    }

    #[test]
    fn refusal_sentinel_is_not_persistable() {
        let result = DecisionMakerResult {
            company_name: "Acme".into(),
            person_name: Some(NOT_CONFIDENTLY_IDENTIFIABLE.to_string()),
            ..Default::default()
        };
        assert!(!result.is_persistable());
    }

    #[test]
    fn named_person_is_persistable() {
        let result = DecisionMakerResult {
            company_name: "Acme".into(),
            person_name: Some("Jane Doe".to_string()),
            ..Default::default()
        };
        assert!(result.is_persistable());
    }
}
