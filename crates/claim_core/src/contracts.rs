use alloy_sol_types::sol;

sol! {
    /// Safe token airdrop / vesting pool.
    interface IAirdrop {
        function redeem(
            uint8 curveType,
            uint16 durationWeeks,
            uint64 startDate,
            uint128 amount,
            bytes32[] calldata proof
        ) external;

        function claimVestedTokens(
            bytes32 vestingId,
            address beneficiary,
            uint128 tokensToClaim
        ) external;

        function claimVestedTokensViaModule(
            bytes32 vestingId,
            address beneficiary,
            uint128 tokensToClaim
        ) external;
    }

    interface IDelegateRegistry {
        function setDelegate(bytes32 id, address delegate) external;
    }

    interface IMultiSend {
        function multiSend(bytes memory transactions) external payable;
    }
}
