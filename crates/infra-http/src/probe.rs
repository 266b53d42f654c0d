// HttpProbe Adapter
//
// §4.3.3: "timeout, parse failure -> miss" — a miss is data, not an error.
// Only connection-level failures that prevent any response from forming
// propagate as `Err`; a non-2xx status still comes back as `Ok(ProbeResponse)`
// so the detection engine's fan-out logic can inspect it.

use async_trait::async_trait;
use leadsignal_core::error::{AppError, Result};
use leadsignal_core::port::http_probe::{HttpProbe, ProbeResponse};
use std::time::Duration;

const USER_AGENT: &str = "LeadSignal/1.0 (+https://leadsignal.example/bot)";

pub struct ReqwestProbe {
    client: reqwest::Client,
}

impl ReqwestProbe {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .expect("reqwest client builder never fails with this configuration"),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn get(&self, url: &str, timeout: Duration) -> Result<ProbeResponse> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| AppError::Transient(format!("request to {url} failed: {e}")))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Transient(format!("reading body from {url} failed: {e}")))?;

        Ok(ProbeResponse { status, final_url, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn construction_does_not_panic() {
        let _probe = ReqwestProbe::new();
    }
}
