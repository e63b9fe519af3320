use std::time::Duration;

use alloy_primitives::Address;
use thiserror::Error;

/// Remote read that failed while assembling claiming data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadKind {
    Allocations,
    VestingRecord,
    TokenPaused,
    Delegate,
}

impl std::fmt::Display for ReadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReadKind::Allocations => "allocations",
            ReadKind::VestingRecord => "vesting record",
            ReadKind::TokenPaused => "token paused flag",
            ReadKind::Delegate => "delegate",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {read} for {account}: {source:#}")]
    DataUnavailable {
        read: ReadKind,
        account: Address,
        source: anyhow::Error,
    },

    #[error("Claiming data was not loaded within {0:?}")]
    TimedOut(Duration),

    #[error("Read task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("No {name} {version} deployment on chain {chain_id}")]
    MissingDeployment {
        name: &'static str,
        version: String,
        chain_id: u64,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MultiSendError {
    #[error("Truncated multisend entry at offset {0}")]
    Truncated(usize),

    #[error("Unknown operation {operation} at offset {offset}")]
    UnknownOperation { operation: u8, offset: usize },

    #[error("Data length at offset {0} does not fit in memory")]
    LengthOverflow(usize),

    #[error("Not a multiSend call: {0}")]
    InvalidCalldata(String),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Unknown vesting curve type {0}")]
pub struct CurveTypeError(pub u8);
