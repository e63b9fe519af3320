use alloy_primitives::{Address, Bytes, B256};
use alloy_sol_types::SolCall;

use crate::{
    contracts::{IAirdrop, IDelegateRegistry},
    types::CurveType,
};

pub fn encode_redeem(
    curve: CurveType,
    duration_weeks: u16,
    start_date: u64,
    amount: u128,
    proof: &[B256],
) -> Bytes {
    IAirdrop::redeemCall {
        curveType: curve.into(),
        durationWeeks: duration_weeks,
        startDate: start_date,
        amount,
        proof: proof.to_vec(),
    }
    .abi_encode()
    .into()
}

/// Claims through the token module while the token is paused, directly otherwise.
pub fn encode_claim(
    via_module: bool,
    vesting_id: B256,
    beneficiary: Address,
    amount: u128,
) -> Bytes {
    let encoded = if via_module {
        IAirdrop::claimVestedTokensViaModuleCall {
            vestingId: vesting_id,
            beneficiary,
            tokensToClaim: amount,
        }
        .abi_encode()
    } else {
        IAirdrop::claimVestedTokensCall {
            vestingId: vesting_id,
            beneficiary,
            tokensToClaim: amount,
        }
        .abi_encode()
    };
    encoded.into()
}

pub fn encode_set_delegate(delegate_id: B256, delegate: Address) -> Bytes {
    IDelegateRegistry::setDelegateCall {
        id: delegate_id,
        delegate,
    }
    .abi_encode()
    .into()
}

/// Registry id under which Safe token delegations are stored: the ASCII name
/// left-aligned in 32 bytes.
pub fn delegate_id(name: &str) -> B256 {
    let mut id = B256::ZERO;
    let len = name.len().min(32);
    id[..len].copy_from_slice(&name.as_bytes()[..len]);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256, keccak256};

    fn selector(signature: &str) -> [u8; 4] {
        keccak256(signature.as_bytes())[..4].try_into().unwrap()
    }

    #[test]
    fn test_encode_redeem() {
        let proof = [B256::repeat_byte(0xaa), B256::repeat_byte(0xbb)];
        let data = encode_redeem(CurveType::Exponential, 416, 1_663_761_600, 1_000, &proof);

        assert_eq!(data[..4], selector("redeem(uint8,uint16,uint64,uint128,bytes32[])"));
        // 5 head words, then array length and two elements
        assert_eq!(data.len(), 4 + 32 * 8);
        assert_eq!(data[4 + 31], 1);
        assert_eq!(data[4 + 32 + 30..4 + 64], 416u16.to_be_bytes());
        assert_eq!(data[4 + 96 + 16..4 + 128], 1_000u128.to_be_bytes());

        let decoded = IAirdrop::redeemCall::abi_decode(&data).unwrap();
        assert_eq!(decoded.curveType, 1);
        assert_eq!(decoded.startDate, 1_663_761_600);
        assert_eq!(decoded.proof, proof.to_vec());
    }

    #[test]
    fn test_encode_claim_selects_signature() {
        let vesting_id = B256::repeat_byte(7);
        let beneficiary = address!("8d29be29923b68abfdd21e541b9374737b49cdad");

        let direct = encode_claim(false, vesting_id, beneficiary, u128::MAX);
        let module = encode_claim(true, vesting_id, beneficiary, u128::MAX);

        assert_eq!(direct[..4], selector("claimVestedTokens(bytes32,address,uint128)"));
        assert_eq!(module[..4], selector("claimVestedTokensViaModule(bytes32,address,uint128)"));
        assert_eq!(direct[4..], module[4..]);
        assert_eq!(direct.len(), 4 + 32 * 3);
        assert_eq!(direct[4 + 64 + 16..], u128::MAX.to_be_bytes());
    }

    #[test]
    fn test_encode_set_delegate() {
        let delegate = address!("40a2accbd92bca938b02010e17a5b8929b49130d");
        let data = encode_set_delegate(delegate_id("safe.eth"), delegate);

        assert_eq!(data[..4], selector("setDelegate(bytes32,address)"));
        assert_eq!(
            data[4..36],
            b256!("736166652e657468000000000000000000000000000000000000000000000000")[..]
        );
        assert_eq!(data[36 + 12..], delegate[..]);
    }

    #[test]
    fn test_delegate_id_truncates() {
        let id = delegate_id(&"x".repeat(40));
        assert_eq!(id, B256::repeat_byte(b'x'));
    }
}
