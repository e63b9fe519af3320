use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use tracing::{debug, info};

use crate::{
    contracts::IMultiSend,
    deployments::{ContractVersion, DeploymentRegistry, MULTI_SEND, MULTI_SEND_CALL_ONLY},
    error::{ConfigurationError, MultiSendError},
    types::{ContractCall, Operation, SafeTransaction},
};

/// First Safe version batching through `MultiSendCallOnly`.
pub const CALL_ONLY_SINCE: ContractVersion = ContractVersion::new(1, 3, 0);
const LEGACY_MULTI_SEND: ContractVersion = ContractVersion::new(1, 1, 1);

// operation (1) + to (20) + value (32) + data length (32)
const ENTRY_HEADER_LEN: usize = 85;

/// One entry of a packed multisend buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSendEntry {
    pub operation: Operation,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

/// Packs calls the way `multiSend(bytes)` expects them: no padding between
/// entries, each one a plain call with zero value.
pub fn pack_multisend(calls: &[ContractCall]) -> Vec<u8> {
    let len = calls
        .iter()
        .map(|call| ENTRY_HEADER_LEN + call.data.len())
        .sum();
    let mut packed = Vec::with_capacity(len);
    for call in calls {
        packed.push(u8::from(Operation::Call));
        packed.extend_from_slice(call.to.as_slice());
        packed.extend_from_slice(&U256::ZERO.to_be_bytes::<32>());
        packed.extend_from_slice(&U256::from(call.data.len()).to_be_bytes::<32>());
        packed.extend_from_slice(&call.data);
    }
    packed
}

pub fn unpack_multisend(packed: &[u8]) -> Result<Vec<MultiSendEntry>, MultiSendError> {
    let mut entries = Vec::new();
    let mut offset = 0;
    while offset < packed.len() {
        if packed.len() - offset < ENTRY_HEADER_LEN {
            return Err(MultiSendError::Truncated(offset));
        }
        let header = &packed[offset..offset + ENTRY_HEADER_LEN];
        let operation = Operation::try_from(header[0]).map_err(|_| {
            MultiSendError::UnknownOperation {
                operation: header[0],
                offset,
            }
        })?;
        let to = Address::from_slice(&header[1..21]);
        let value = U256::from_be_slice(&header[21..53]);
        let data_len: usize = U256::from_be_slice(&header[53..85])
            .try_into()
            .map_err(|_| MultiSendError::LengthOverflow(offset))?;

        let data_start = offset + ENTRY_HEADER_LEN;
        let data_end = data_start
            .checked_add(data_len)
            .ok_or(MultiSendError::LengthOverflow(offset))?;
        if data_end > packed.len() {
            return Err(MultiSendError::Truncated(offset));
        }
        entries.push(MultiSendEntry {
            operation,
            to,
            value,
            data: Bytes::copy_from_slice(&packed[data_start..data_end]),
        });
        offset = data_end;
    }
    Ok(entries)
}

/// Decodes `multiSend(bytes)` calldata and unpacks its entries.
pub fn unpack_multisend_call(calldata: &[u8]) -> Result<Vec<MultiSendEntry>, MultiSendError> {
    let call = IMultiSend::multiSendCall::abi_decode(calldata)
        .map_err(|e| MultiSendError::InvalidCalldata(e.to_string()))?;
    unpack_multisend(&call.transactions)
}

/// Collapses a list of calls into the single transaction a Safe executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCombinator {
    chain_id: u64,
    call_only: Address,
    legacy: Address,
}

impl BatchCombinator {
    /// Resolves both multisend deployments for `chain_id` up front, so a missing
    /// deployment fails at start-up instead of in the middle of a claim.
    pub fn new(
        registry: &dyn DeploymentRegistry,
        chain_id: u64,
    ) -> Result<Self, ConfigurationError> {
        let resolve = |name: &'static str, version: ContractVersion| {
            registry
                .resolve(name, &version, chain_id)
                .ok_or(ConfigurationError::MissingDeployment {
                    name,
                    version: version.to_string(),
                    chain_id,
                })
        };
        Ok(Self {
            chain_id,
            call_only: resolve(MULTI_SEND_CALL_ONLY, CALL_ONLY_SINCE)?,
            legacy: resolve(MULTI_SEND, LEGACY_MULTI_SEND)?,
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Multisend deployment matching `safe_version`. Safes reporting no version
    /// are assumed current; versions that do not parse get the legacy contract.
    pub fn multisend_address(&self, safe_version: Option<&str>) -> Address {
        let Some(version) = safe_version else {
            return self.call_only;
        };
        match version.parse::<ContractVersion>() {
            Ok(version) if version >= CALL_ONLY_SINCE => self.call_only,
            _ => self.legacy,
        }
    }

    pub fn combine(
        &self,
        calls: Vec<ContractCall>,
        safe: Address,
        safe_version: Option<&str>,
    ) -> Option<SafeTransaction> {
        match calls.len() {
            0 => None,
            1 => {
                let call = calls.into_iter().next()?;
                debug!("Single call from {} to {}", safe, call.to);
                Some(SafeTransaction {
                    to: call.to,
                    value: U256::ZERO,
                    data: call.data,
                    operation: Operation::Call,
                })
            }
            count => {
                let multisend = self.multisend_address(safe_version);
                info!(
                    "Batching {} calls from {} (version {:?}) through multisend {}",
                    count, safe, safe_version, multisend
                );
                let data = IMultiSend::multiSendCall {
                    transactions: pack_multisend(&calls).into(),
                }
                .abi_encode();
                Some(SafeTransaction {
                    to: multisend,
                    value: U256::ZERO,
                    data: data.into(),
                    operation: Operation::DelegateCall,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployments::StaticDeployments;
    use alloy_primitives::address;

    const SAFE: Address = address!("1111111111111111111111111111111111111111");
    const CALL_ONLY: Address = address!("40a2accbd92bca938b02010e17a5b8929b49130d");
    const LEGACY: Address = address!("8d29be29923b68abfdd21e541b9374737b49cdad");

    fn combinator() -> BatchCombinator {
        BatchCombinator::new(&StaticDeployments::default(), 1).unwrap()
    }

    fn calls() -> Vec<ContractCall> {
        vec![
            ContractCall::new(
                address!("a0b937d5c8e32a80e3a8ed4227cd020221544ee6"),
                vec![1, 2, 3, 4],
            ),
            ContractCall::new(
                address!("29067f28306419923bcff96e37f95e0f58abdbbe"),
                vec![0xff; 68],
            ),
        ]
    }

    #[test]
    fn test_empty_is_none() {
        assert_eq!(combinator().combine(vec![], SAFE, Some("1.3.0")), None);
    }

    #[test]
    fn test_single_call_passes_through() {
        let call = calls().remove(0);
        for version in [None, Some("1.1.1"), Some("1.3.0")] {
            let transaction = combinator().combine(vec![call.clone()], SAFE, version).unwrap();
            assert_eq!(transaction.to, call.to);
            assert_eq!(transaction.data, call.data);
            assert_eq!(transaction.value, U256::ZERO);
            assert_eq!(transaction.operation, Operation::Call);
        }
    }

    #[test]
    fn test_pack_layout() {
        let calls = calls();
        let packed = pack_multisend(&calls);
        assert_eq!(packed.len(), 2 * ENTRY_HEADER_LEN + 4 + 68);

        assert_eq!(packed[0], 0);
        assert_eq!(packed[1..21], calls[0].to[..]);
        assert!(packed[21..53].iter().all(|b| *b == 0));
        assert_eq!(packed[53..85], U256::from(4).to_be_bytes::<32>());
        assert_eq!(packed[85..89], [1, 2, 3, 4]);
        assert_eq!(packed[89], 0);
        assert_eq!(packed[90..110], calls[1].to[..]);
    }

    #[test]
    fn test_batch_round_trip() {
        let calls = calls();
        let transaction = combinator().combine(calls.clone(), SAFE, Some("1.3.0")).unwrap();
        assert_eq!(transaction.to, CALL_ONLY);
        assert_eq!(transaction.operation, Operation::DelegateCall);
        assert_eq!(transaction.value, U256::ZERO);
        assert_eq!(transaction.data[..4], IMultiSend::multiSendCall::SELECTOR);

        let entries = unpack_multisend_call(&transaction.data).unwrap();
        assert_eq!(entries.len(), calls.len());
        for (entry, call) in entries.iter().zip(&calls) {
            assert_eq!(entry.operation, Operation::Call);
            assert_eq!(entry.to, call.to);
            assert_eq!(entry.value, U256::ZERO);
            assert_eq!(entry.data, call.data);
        }
    }

    #[test]
    fn test_version_routing() {
        let combinator = combinator();
        assert_eq!(combinator.multisend_address(Some("1.1.1")), LEGACY);
        assert_eq!(combinator.multisend_address(Some("1.2.0")), LEGACY);
        assert_eq!(combinator.multisend_address(Some("1.3.0")), CALL_ONLY);
        assert_eq!(combinator.multisend_address(Some("1.3.0+L2")), CALL_ONLY);
        assert_eq!(combinator.multisend_address(Some("1.3.0-rc.1")), LEGACY);
        assert_eq!(combinator.multisend_address(Some("v1.3.0")), CALL_ONLY);
        assert_eq!(combinator.multisend_address(Some("1.4.1")), CALL_ONLY);
        assert_eq!(combinator.multisend_address(Some("1.10.0")), CALL_ONLY);
        assert_eq!(combinator.multisend_address(None), CALL_ONLY);
        assert_eq!(combinator.multisend_address(Some("unknown")), LEGACY);

        let transaction = combinator.combine(calls(), SAFE, Some("1.1.1")).unwrap();
        assert_eq!(transaction.to, LEGACY);
        let transaction = combinator.combine(calls(), SAFE, None).unwrap();
        assert_eq!(transaction.to, CALL_ONLY);
    }

    #[test]
    fn test_missing_deployment() {
        let res = BatchCombinator::new(&StaticDeployments::default(), 424242);
        assert_eq!(
            res,
            Err(ConfigurationError::MissingDeployment {
                name: MULTI_SEND_CALL_ONLY,
                version: "1.3.0".to_string(),
                chain_id: 424242,
            })
        );

        let only_call_only =
            StaticDeployments::empty().with(MULTI_SEND_CALL_ONLY, CALL_ONLY_SINCE, 7, CALL_ONLY);
        let res = BatchCombinator::new(&only_call_only, 7);
        assert!(matches!(
            res,
            Err(ConfigurationError::MissingDeployment { name: MULTI_SEND, .. })
        ));
    }

    #[test]
    fn test_unpack_rejects_truncated() {
        let mut packed = pack_multisend(&calls());
        packed.pop();
        assert_eq!(
            unpack_multisend(&packed),
            Err(MultiSendError::Truncated(ENTRY_HEADER_LEN + 4))
        );
        assert_eq!(unpack_multisend(&[0u8; 10]), Err(MultiSendError::Truncated(0)));
    }

    #[test]
    fn test_unpack_rejects_unknown_operation() {
        let mut packed = pack_multisend(&calls());
        packed[0] = 2;
        assert_eq!(
            unpack_multisend(&packed),
            Err(MultiSendError::UnknownOperation {
                operation: 2,
                offset: 0
            })
        );
    }
}
