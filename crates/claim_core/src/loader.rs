use std::{future::Future, sync::Arc, time::Duration};

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use tokio::{
    sync::{watch, Semaphore},
    task::JoinSet,
    time::timeout,
};
use tracing::{debug, info, warn};

use crate::{
    error::{LoadError, ReadKind},
    types::{Allocation, ClaimingData, VestingKey, VestingRecord},
};

/// Remote reads backing a [`ClaimingData`] snapshot.
#[async_trait]
pub trait ClaimDataSource: Send + Sync {
    async fn get_allocations(&self, account: Address) -> anyhow::Result<Vec<Allocation>>;

    /// Record of `vesting_id` in `contract`. Ids that were never redeemed come back
    /// with a zero account.
    async fn get_vesting_record(
        &self,
        contract: Address,
        vesting_id: B256,
    ) -> anyhow::Result<VestingRecord>;

    async fn is_token_paused(&self, token: Address) -> anyhow::Result<bool>;

    /// Zero address when `delegator` has no delegate for `delegate_id`.
    async fn get_delegate(
        &self,
        registry: Address,
        delegator: Address,
        delegate_id: B256,
    ) -> anyhow::Result<Address>;
}

#[derive(Debug, Clone)]
pub struct LoaderSettings {
    pub deadline: Duration,
    pub max_in_flight: usize,
    pub token: Address,
    pub delegate_registry: Address,
    pub delegate_id: B256,
}

enum Fetched {
    Allocations(Vec<Allocation>),
    Vesting(VestingKey, VestingRecord),
    TokenPaused(bool),
    Delegate(Address),
}

type Read = (ReadKind, anyhow::Result<Fetched>);

pub struct ClaimingDataLoader<S: ?Sized> {
    source: Arc<S>,
    settings: LoaderSettings,
}

impl<S> ClaimingDataLoader<S>
where
    S: ClaimDataSource + ?Sized + 'static,
{
    pub fn new(source: Arc<S>, settings: LoaderSettings) -> Self {
        Self { source, settings }
    }

    pub fn settings(&self) -> &LoaderSettings {
        &self.settings
    }

    /// Loads everything needed to plan a claim for `account` within the deadline.
    /// Either every read succeeds or no data is returned.
    pub async fn fetch(&self, account: Address) -> Result<ClaimingData, LoadError> {
        let deadline = self.settings.deadline;
        match timeout(deadline, self.join(account)).await {
            Ok(res) => res,
            Err(_) => {
                warn!("Loading claiming data for {} timed out after {:?}", account, deadline);
                Err(LoadError::TimedOut(deadline))
            }
        }
    }

    /// Like [`fetch`](Self::fetch), but gives up silently with `Ok(None)` once
    /// `cancel` turns true. Outstanding reads are aborted.
    pub async fn fetch_cancellable(
        &self,
        account: Address,
        cancel: &mut watch::Receiver<bool>,
    ) -> Result<Option<ClaimingData>, LoadError> {
        let cancelled = async {
            let sender_dropped = cancel.wait_for(|cancelled| *cancelled).await.is_err();
            // a dropped sender can no longer cancel
            if sender_dropped {
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => {
                info!("Loading claiming data for {} cancelled", account);
                Ok(None)
            }
            res = self.fetch(account) => res.map(Some),
        }
    }

    async fn join(&self, account: Address) -> Result<ClaimingData, LoadError> {
        let permits = Arc::new(Semaphore::new(
            self.settings
                .max_in_flight
                .clamp(1, Semaphore::MAX_PERMITS),
        ));
        let mut reads = JoinSet::new();

        let source = self.source.clone();
        spawn_read(&mut reads, &permits, ReadKind::Allocations, async move {
            source.get_allocations(account).await.map(Fetched::Allocations)
        });

        let source = self.source.clone();
        let token = self.settings.token;
        spawn_read(&mut reads, &permits, ReadKind::TokenPaused, async move {
            source.is_token_paused(token).await.map(Fetched::TokenPaused)
        });

        let source = self.source.clone();
        let registry = self.settings.delegate_registry;
        let delegate_id = self.settings.delegate_id;
        spawn_read(&mut reads, &permits, ReadKind::Delegate, async move {
            source
                .get_delegate(registry, account, delegate_id)
                .await
                .map(Fetched::Delegate)
        });

        debug!("Loading claiming data for {}", account);

        let mut draft = ClaimingData {
            account,
            ..Default::default()
        };
        // returning early drops the set, which aborts whatever is still running
        while let Some(joined) = reads.join_next().await {
            let (read, fetched) = joined?;
            let fetched = fetched.map_err(|source| LoadError::DataUnavailable {
                read,
                account,
                source,
            })?;

            match fetched {
                Fetched::Allocations(allocations) => {
                    debug!(
                        "Found {} allocations for {}, reading their vestings",
                        allocations.len(),
                        account
                    );
                    for allocation in &allocations {
                        let source = self.source.clone();
                        let key = allocation.vesting_key();
                        spawn_read(&mut reads, &permits, ReadKind::VestingRecord, async move {
                            source
                                .get_vesting_record(key.contract, key.vesting_id)
                                .await
                                .map(|record| Fetched::Vesting(key, record))
                        });
                    }
                    draft.allocations = allocations;
                }
                Fetched::Vesting(key, record) => {
                    draft.vestings.insert(key, record);
                }
                Fetched::TokenPaused(paused) => draft.token_paused = paused,
                Fetched::Delegate(delegate) => {
                    draft.delegate = (delegate != Address::ZERO).then_some(delegate);
                }
            }
        }

        info!(
            "Loaded claiming data for {}: {} allocations, {} vestings, token paused: {}",
            account,
            draft.allocations.len(),
            draft.vestings.len(),
            draft.token_paused
        );
        Ok(draft)
    }
}

fn spawn_read<F>(reads: &mut JoinSet<Read>, permits: &Arc<Semaphore>, read: ReadKind, fetch: F)
where
    F: Future<Output = anyhow::Result<Fetched>> + Send + 'static,
{
    let permits = permits.clone();
    reads.spawn(async move {
        // the semaphore is never closed
        let _permit = permits.acquire_owned().await.ok();
        (read, fetch.await)
    });
}
