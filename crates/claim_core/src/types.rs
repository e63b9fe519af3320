use std::collections::HashMap;

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::{error::CurveTypeError, serde_util::decimal_u128, vesting};

/// Unlock curve of a vesting schedule, stored on chain as `uint8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CurveType {
    Linear,
    Exponential,
}

impl TryFrom<u8> for CurveType {
    type Error = CurveTypeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CurveType::Linear),
            1 => Ok(CurveType::Exponential),
            other => Err(CurveTypeError(other)),
        }
    }
}

impl From<CurveType> for u8 {
    fn from(curve: CurveType) -> Self {
        match curve {
            CurveType::Linear => 0,
            CurveType::Exponential => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationTag {
    #[default]
    User,
    Ecosystem,
    Investor,
    #[serde(other)]
    Other,
}

/// A grant published by the allocation source. Never mutated locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    #[serde(default)]
    pub tag: AllocationTag,
    pub account: Address,
    #[serde(default)]
    pub chain_id: u64,
    /// Vesting (airdrop) contract holding the schedule
    pub contract: Address,
    pub vesting_id: B256,
    pub duration_weeks: u16,
    pub start_date: u64,
    #[serde(with = "decimal_u128")]
    pub amount: u128,
    pub curve: CurveType,
    /// Merkle proof authorizing the redeem call
    #[serde(default)]
    pub proof: Option<Vec<B256>>,
}

impl Allocation {
    pub fn vesting_key(&self) -> VestingKey {
        VestingKey {
            contract: self.contract,
            vesting_id: self.vesting_id,
        }
    }
}

/// Identifies a vesting record inside a [`ClaimingData`] snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VestingKey {
    pub contract: Address,
    pub vesting_id: B256,
}

/// On-chain state of a vesting schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VestingRecord {
    /// Zero until the allocation has been redeemed
    pub account: Address,
    pub curve: CurveType,
    pub managed: bool,
    pub duration_weeks: u16,
    pub start_date: u64,
    pub amount: u128,
    pub amount_claimed: u128,
    /// Nonzero only if the token was paused while the schedule was running
    pub pausing_date: u64,
    pub cancelled: bool,
}

impl VestingRecord {
    /// The record as it would look right after redeeming `allocation`, but with the
    /// account still unset.
    pub fn unredeemed(allocation: &Allocation) -> Self {
        Self {
            account: Address::ZERO,
            curve: allocation.curve,
            managed: false,
            duration_weeks: allocation.duration_weeks,
            start_date: allocation.start_date,
            amount: allocation.amount,
            amount_claimed: 0,
            pausing_date: 0,
            cancelled: false,
        }
    }

    pub fn is_redeemed(&self) -> bool {
        self.account != Address::ZERO
    }
}

/// Everything needed to plan a claim for one beneficiary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimingData {
    pub account: Address,
    pub allocations: Vec<Allocation>,
    pub vestings: HashMap<VestingKey, VestingRecord>,
    pub token_paused: bool,
    pub delegate: Option<Address>,
}

impl ClaimingData {
    pub fn vesting_for(&self, allocation: &Allocation) -> Option<&VestingRecord> {
        self.vestings.get(&allocation.vesting_key())
    }

    /// Pairs each allocation with its on-chain record, keeping allocation order.
    pub fn allocation_records(&self) -> Vec<(Allocation, VestingRecord)> {
        self.allocations
            .iter()
            .map(|allocation| {
                let record = self
                    .vesting_for(allocation)
                    .cloned()
                    .unwrap_or_else(|| VestingRecord::unredeemed(allocation));
                (allocation.clone(), record)
            })
            .collect()
    }

    pub fn summary(&self, as_of: u64) -> ClaimingSummary {
        let mut summary = ClaimingSummary::default();
        for (allocation, record) in self.allocation_records() {
            let effective = if record.is_redeemed() {
                record
            } else {
                summary.unredeemed += 1;
                VestingRecord::unredeemed(&allocation)
            };
            let vested = vesting::vested_amount(&effective, as_of);
            summary.allocated = summary.allocated.saturating_add(allocation.amount);
            summary.vested = summary.vested.saturating_add(vested);
            summary.claimed = summary.claimed.saturating_add(effective.amount_claimed);
            summary.available = summary
                .available
                .saturating_add(vesting::available(&effective, as_of));
            summary.locked = summary
                .locked
                .saturating_add(effective.amount.saturating_sub(vested));
        }
        summary
    }
}

/// Totals over every allocation of a [`ClaimingData`] snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimingSummary {
    #[serde(with = "decimal_u128")]
    pub allocated: u128,
    #[serde(with = "decimal_u128")]
    pub vested: u128,
    #[serde(with = "decimal_u128")]
    pub claimed: u128,
    #[serde(with = "decimal_u128")]
    pub available: u128,
    #[serde(with = "decimal_u128")]
    pub locked: u128,
    pub unredeemed: usize,
}

/// A single contract invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCall {
    pub to: Address,
    pub data: Bytes,
}

impl ContractCall {
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to,
            data: data.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Operation {
    Call,
    DelegateCall,
}

impl From<Operation> for u8 {
    fn from(operation: Operation) -> Self {
        match operation {
            Operation::Call => 0,
            Operation::DelegateCall => 1,
        }
    }
}

impl TryFrom<u8> for Operation {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Operation::Call),
            1 => Ok(Operation::DelegateCall),
            other => Err(format!("unknown operation {other}")),
        }
    }
}

/// Unsigned Safe transaction. Nonce and gas are left to the signing side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeTransaction {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: Operation,
}
