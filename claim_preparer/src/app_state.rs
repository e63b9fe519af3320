use std::sync::Arc;

use claim_core::{BatchCombinator, ClaimingDataLoader, DelegateTarget};

use crate::data_source::ChainDataSource;

#[derive(Clone)]
pub struct AppState {
    pub loader: Arc<ClaimingDataLoader<ChainDataSource>>,
    pub combinator: Arc<BatchCombinator>,
    pub delegate_target: DelegateTarget,
}
