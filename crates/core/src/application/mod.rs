// Application Layer - Use Cases and Business Logic

pub mod ats_detect;
pub mod change_detect;
pub mod enrichment;
pub mod orchestrator;
pub mod retry;
pub mod shutdown;

pub use ats_detect::AtsDetectionEngine;
pub use change_detect::detect_changes;
pub use orchestrator::{Orchestrator, OrchestratorConfig, RunResult};
pub use retry::RetryPolicy;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
