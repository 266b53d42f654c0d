// LeadSignal Infra HTTP - reqwest-backed port adapters
//
// HttpProbe, the nine AtsClient implementations, RobotsPolicy, the three
// SourceAdapter implementations, and the LlmClient/EmailClient enrichment
// callers. No Store logic lives here (that's `leadsignal-infra-sqlite`).

pub mod ats_clients;
pub mod enrichment;
pub mod probe;
pub mod robots;
pub mod sources;

pub use ats_clients::{AshbyClient, BreezyHrClient, GreenhouseClient, JobviteClient, LeverClient, PersonioClient, RecruiteeClient, SmartRecruitersClient, WorkableClient};
pub use enrichment::{ApolloEmailClient, GeminiDecisionMakerClient};
pub use probe::ReqwestProbe;
pub use robots::RobotsChecker;
pub use sources::{AggregatorSearchAdapter, CuratedCsvAdapter, RepositoryListingAdapter};
