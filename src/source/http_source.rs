use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::traits::{FetchMode, NetworkFetch};
use crate::store::traits::{InspectableResponse, OpaqueResponse, ResponsePayload};

/// reqwest-backed fetcher. The client keeps no cookie store, so opaque
/// fetches carry no credentials.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NetworkFetch for HttpFetcher {
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<ResponsePayload> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        debug!("fetch url={} mode={:?} status={}", url, mode, status.as_u16());

        match mode {
            FetchMode::Inspectable => {
                if !status.is_success() {
                    warn!(
                        "inspectable fetch failed status={} url={}",
                        status.as_u16(),
                        url
                    );
                    return Err(anyhow!("fetch failed: HTTP {}", status.as_u16()));
                }
                let headers = resp
                    .headers()
                    .iter()
                    .filter_map(|(name, value)| {
                        value
                            .to_str()
                            .ok()
                            .map(|v| (name.to_string(), v.to_string()))
                    })
                    .collect();
                let body = resp.bytes().await?;
                Ok(ResponsePayload::Inspectable(InspectableResponse {
                    status: status.as_u16(),
                    headers,
                    body,
                }))
            }
            FetchMode::Opaque => {
                // An opaque fetch resolves whatever the HTTP status; only
                // transport failures reject. Nothing of the response is
                // exposed beyond the sealed payload.
                let body = resp.bytes().await?;
                Ok(ResponsePayload::Opaque(OpaqueResponse::capture(body)))
            }
        }
    }
}
