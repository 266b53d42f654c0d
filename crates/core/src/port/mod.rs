// Port Layer - Interfaces for external dependencies

pub mod ats_client;
pub mod email_client;
pub mod http_probe;
pub mod id_provider; // For deterministic testing
pub mod llm_client;
pub mod robots_policy;
pub mod source_adapter;
pub mod store;
pub mod time_provider;

// Re-exports
pub use ats_client::AtsClient;
pub use email_client::EmailClient;
pub use http_probe::{HttpProbe, ProbeResponse};
pub use id_provider::IdProvider;
pub use llm_client::LlmClient;
pub use robots_policy::RobotsPolicy;
pub use source_adapter::{CompanyCandidate, SourceAdapter};
pub use store::Store;
pub use time_provider::TimeProvider;
