// Domain Layer - Pure business logic and entities

pub mod ats;
pub mod change;
pub mod company;
pub mod decision_maker;
pub mod job;
pub mod relevance;
pub mod run;

// Re-exports
pub use ats::{AtsDetectionResult, AtsProvider};
pub use change::{ChangeReport, ChangeType, JobChange};
pub use company::Company;
pub use decision_maker::{DecisionMakerResult, EmailLookupResult, Industry};
pub use job::{Job, JobPosting, VerificationStatus};
pub use relevance::{RelevanceResult, RoleFamily};
pub use run::{CompanyStatus, RunSnapshot, RunSummary};
