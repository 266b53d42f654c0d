// HTTP Probe Port
//
// The one capability the ATS detection engine needs from the network: issue
// a timed GET and get back a status code, the final (post-redirect) URL, and
// a body. Modeled as a single narrow trait so the engine's fan-out logic is
// testable against a scripted fake without a real HTTP client.

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status: u16,
    pub final_url: String,
    pub body: String,
}

impl ProbeResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

#[async_trait]
pub trait HttpProbe: Send + Sync {
    /// Issue a GET to `url` with the given timeout. A non-2xx status is
    /// returned as `Ok(ProbeResponse)`, not an error — only connection-level
    /// failures (timeout, DNS, reset) are `Err`, mirroring §4.3.3's "timeout,
    /// parse failure -> miss" (a miss is data, not a propagated error).
    async fn get(&self, url: &str, timeout: Duration) -> Result<ProbeResponse>;
}
