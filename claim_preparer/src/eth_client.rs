use alloy::{
    primitives::{Address, B256},
    providers::DynProvider,
    sol,
};
use anyhow::{anyhow, Context, Result};
use claim_core::{CurveType, VestingRecord};

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract VestingPool {
        function vestings(bytes32 vestingId) external view returns (
            address account,
            uint8 curveType,
            bool managed,
            uint16 durationWeeks,
            uint64 startDate,
            uint128 amount,
            uint128 amountClaimed,
            uint64 pausingDate,
            bool cancelled
        );
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract PausableToken {
        function paused() external view returns (bool);
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract DelegateRegistry {
        function delegation(address delegator, bytes32 id) external view returns (address);
    }
}

/// Read-only contract calls against the configured chain.
#[derive(Clone)]
pub struct EthClient {
    pub provider: DynProvider,
}

impl EthClient {
    pub async fn vesting(&self, contract: Address, vesting_id: B256) -> Result<VestingRecord> {
        let vesting = VestingPool::new(contract, &self.provider)
            .vestings(vesting_id)
            .call()
            .await
            .with_context(|| format!("vestings({vesting_id}) on {contract}"))?;

        let curve = CurveType::try_from(vesting.curveType)
            .map_err(|e| anyhow!("vesting {vesting_id} on {contract}: {e}"))?;
        Ok(VestingRecord {
            account: vesting.account,
            curve,
            managed: vesting.managed,
            duration_weeks: vesting.durationWeeks,
            start_date: vesting.startDate,
            amount: vesting.amount,
            amount_claimed: vesting.amountClaimed,
            pausing_date: vesting.pausingDate,
            cancelled: vesting.cancelled,
        })
    }

    pub async fn paused(&self, token: Address) -> Result<bool> {
        PausableToken::new(token, &self.provider)
            .paused()
            .call()
            .await
            .with_context(|| format!("paused() on {token}"))
    }

    pub async fn delegation(
        &self,
        registry: Address,
        delegator: Address,
        id: B256,
    ) -> Result<Address> {
        DelegateRegistry::new(registry, &self.provider)
            .delegation(delegator, id)
            .call()
            .await
            .with_context(|| format!("delegation({delegator}, {id}) on {registry}"))
    }
}
