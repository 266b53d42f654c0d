// Robots Policy Port
//
// The courtesy check (§4.5 stage 4): before scraping a company's own
// website (homepage fingerprinting, careers-page sweep), honor any
// `Disallow` directive in its robots.txt. Scoped to one invocation — the
// cache backing this is in-memory only (§5).

use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait RobotsPolicy: Send + Sync {
    /// Whether `path` on `domain` may be fetched. Implementations default to
    /// `true` when robots.txt cannot be fetched or parsed (§9 courtesy, not
    /// a hard requirement).
    async fn is_allowed(&self, domain: &str, path: &str) -> Result<bool>;
}
