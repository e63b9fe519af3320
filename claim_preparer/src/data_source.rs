use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use claim_core::{Allocation, ClaimDataSource, VestingRecord};

use crate::{allocations_api::AllocationsApi, eth_client::EthClient};

/// Allocation files over HTTP plus contract reads over RPC.
pub struct ChainDataSource {
    pub eth: EthClient,
    pub allocations: AllocationsApi,
}

#[async_trait]
impl ClaimDataSource for ChainDataSource {
    async fn get_allocations(&self, account: Address) -> anyhow::Result<Vec<Allocation>> {
        self.allocations.get_allocations(account).await
    }

    async fn get_vesting_record(
        &self,
        contract: Address,
        vesting_id: B256,
    ) -> anyhow::Result<VestingRecord> {
        self.eth.vesting(contract, vesting_id).await
    }

    async fn is_token_paused(&self, token: Address) -> anyhow::Result<bool> {
        self.eth.paused(token).await
    }

    async fn get_delegate(
        &self,
        registry: Address,
        delegator: Address,
        delegate_id: B256,
    ) -> anyhow::Result<Address> {
        self.eth.delegation(registry, delegator, delegate_id).await
    }
}
