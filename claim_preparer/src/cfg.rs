use alloy::primitives::Address;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct Cfg {
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    #[arg(long, env = "ETH_RPC_URL")]
    pub eth_rpc_url: String,

    #[arg(long, env = "CHAIN_ID", default_value_t = 1)]
    pub chain_id: u64,

    /// Base URL of the published allocation files
    #[arg(long, env = "ALLOCATIONS_URL")]
    pub allocations_url: String,

    #[arg(long, env = "SAFE_TOKEN_ADDRESS")]
    pub safe_token_address: Address,

    #[arg(long, env = "DELEGATE_REGISTRY_ADDRESS")]
    pub delegate_registry_address: Address,

    #[arg(long, env = "DELEGATE_ID", default_value = "safe.eth")]
    pub delegate_id: String,

    #[arg(long, env = "LOAD_TIMEOUT_SECS", default_value_t = 30)]
    pub load_timeout_secs: u64,

    #[arg(long, env = "MAX_IN_FLIGHT_READS", default_value_t = 8)]
    pub max_in_flight_reads: usize,
}
