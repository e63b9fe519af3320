use alloy_primitives::{Address, B256};
use tracing::debug;

use crate::{
    encoder::{encode_claim, encode_redeem, encode_set_delegate},
    multisend::BatchCombinator,
    types::{Allocation, ClaimingData, ContractCall, SafeTransaction, VestingRecord},
    vesting,
};

/// Claim amount asking every allocation for its whole available balance.
pub const CLAIM_ALL: u128 = u128::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimRequest {
    /// Token amount to claim, or [`CLAIM_ALL`]
    pub amount: u128,
    pub beneficiary: Address,
    /// Voting delegate to set along with the claim
    pub delegate: Option<Address>,
}

/// Where the delegate call goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelegateTarget {
    pub registry: Address,
    pub id: B256,
}

/// Turns a claim request into the ordered contract calls executing it.
///
/// Allocations are consumed in the given order until the requested amount is
/// covered. Unredeemed allocations get a redeem call right before their claim.
pub fn build_claim_calls(
    request: &ClaimRequest,
    delegate_target: &DelegateTarget,
    as_of: u64,
    allocations: &[(Allocation, VestingRecord)],
    token_paused: bool,
) -> Vec<ContractCall> {
    let mut calls = Vec::new();

    if let Some(delegate) = request.delegate {
        calls.push(ContractCall::new(
            delegate_target.registry,
            encode_set_delegate(delegate_target.id, delegate),
        ));
    }

    let claim_all = request.amount == CLAIM_ALL;
    let mut remaining = request.amount;

    for (allocation, record) in allocations {
        if !claim_all && remaining == 0 {
            break;
        }

        let effective = if record.is_redeemed() {
            record.clone()
        } else {
            VestingRecord::unredeemed(allocation)
        };
        let available = vesting::available(&effective, as_of);
        let claimed_now = if claim_all {
            CLAIM_ALL
        } else {
            available.min(remaining)
        };
        if claimed_now == 0 {
            continue;
        }

        if !record.is_redeemed() {
            calls.push(ContractCall::new(
                allocation.contract,
                encode_redeem(
                    allocation.curve,
                    allocation.duration_weeks,
                    allocation.start_date,
                    allocation.amount,
                    allocation.proof.as_deref().unwrap_or_default(),
                ),
            ));
        }
        calls.push(ContractCall::new(
            allocation.contract,
            encode_claim(token_paused, allocation.vesting_id, request.beneficiary, claimed_now),
        ));
        debug!(
            "Claiming {} of {} available from vesting {}",
            claimed_now, available, allocation.vesting_id
        );

        if !claim_all {
            remaining -= claimed_now;
        }
    }

    calls
}

/// Plans the claim against a loaded snapshot and folds it into one transaction.
///
/// The delegate call is left out when the requested delegate is already set.
pub fn prepare_claim_transaction(
    data: &ClaimingData,
    request: &ClaimRequest,
    delegate_target: &DelegateTarget,
    combinator: &BatchCombinator,
    safe_version: Option<&str>,
    as_of: u64,
) -> Option<SafeTransaction> {
    let request = ClaimRequest {
        delegate: request.delegate.filter(|delegate| Some(*delegate) != data.delegate),
        ..*request
    };
    let calls = build_claim_calls(
        &request,
        delegate_target,
        as_of,
        &data.allocation_records(),
        data.token_paused,
    );
    combinator.combine(calls, data.account, safe_version)
}
