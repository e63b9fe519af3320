//! Planning of vested Safe token claims and their packing into one Safe transaction.

pub mod claim_plan;
pub mod contracts;
pub mod deployments;
pub mod encoder;
pub mod error;
pub mod loader;
pub mod multisend;
pub mod serde_util;
pub mod types;
pub mod vesting;

pub use claim_plan::{
    build_claim_calls, prepare_claim_transaction, ClaimRequest, DelegateTarget, CLAIM_ALL,
};
pub use deployments::{ContractVersion, DeploymentRegistry, StaticDeployments};
pub use error::{ConfigurationError, LoadError, MultiSendError, ReadKind};
pub use loader::{ClaimDataSource, ClaimingDataLoader, LoaderSettings};
pub use multisend::{unpack_multisend, BatchCombinator, MultiSendEntry};
pub use types::{
    Allocation, AllocationTag, ClaimingData, ClaimingSummary, ContractCall, CurveType, Operation,
    SafeTransaction, VestingKey, VestingRecord,
};
