use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use claim_core::Allocation;
use reqwest::StatusCode;
use tracing::debug;

/// Client for the published allocation files, one JSON list per account.
pub struct AllocationsApi {
    client: reqwest::Client,
    base_url: String,
    chain_id: u64,
}

impl AllocationsApi {
    pub fn new(base_url: &str, chain_id: u64, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("build allocations http client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            chain_id,
        })
    }

    pub fn allocations_url(&self, account: Address) -> String {
        format!(
            "{}/{}/{}.json",
            self.base_url,
            self.chain_id,
            account.to_checksum(None)
        )
    }

    /// Accounts without a published file have no allocations.
    pub async fn get_allocations(&self, account: Address) -> Result<Vec<Allocation>> {
        let url = self.allocations_url(account);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;

        if allocations_absent(response.status()) {
            debug!("No allocation file for {} ({})", account, response.status());
            return Ok(Vec::new());
        }

        let allocations: Vec<Allocation> = response
            .error_for_status()
            .with_context(|| format!("GET {url}"))?
            .json()
            .await
            .with_context(|| format!("decode allocations from {url}"))?;
        Ok(allocations)
    }
}

/// The file host answers 403 as well as 404 for accounts it has never seen.
fn allocations_absent(status: StatusCode) -> bool {
    matches!(status, StatusCode::NOT_FOUND | StatusCode::FORBIDDEN)
}
