//! Async worker - runs in the Tokio runtime and performs every fetch
//!
//! Each command becomes its own task. Results are tagged with the generation
//! of the command that asked for them; deciding whether they are still wanted
//! is left to the receiving side.

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::domain::address::{looks_like_address, parse_address};
use crate::domain::aggregate::{
    count_holders_by_token, owners_of_token, ownership_records, splice_names, summarize_by_holder,
};
use crate::domain::catalog::{owned_tokens, token_items, total_balance};
use crate::domain::models::{HolderSummary, OwnedToken, TokenItem, TokenOwner, WalletOwner};
use crate::infrastructure::provider::{CollectionProvider, NameResolver, WalletProvider};
use crate::infrastructure::runtime::batch::{resolve_in_batches, unresolved, BatchPolicy};
use crate::infrastructure::runtime::bridge::{RuntimeCommand, RuntimeEvent, Screen};
use crate::store::{CachedName, NameCache};

// Progress is reported every this many cards, and on the last one
const PROGRESS_STEP: usize = 25;

/// Everything a fetch needs, cheap to clone into a task
#[derive(Clone)]
pub struct Worker {
    collection: Arc<dyn CollectionProvider>,
    wallet: Arc<dyn WalletProvider>,
    resolver: Arc<dyn NameResolver>,
    names: Arc<NameCache>,
    contract: Address,
    policy: BatchPolicy,
}

impl Worker {
    pub fn new(
        collection: Arc<dyn CollectionProvider>,
        wallet: Arc<dyn WalletProvider>,
        resolver: Arc<dyn NameResolver>,
        names: Arc<NameCache>,
        contract: Address,
        policy: BatchPolicy,
    ) -> Self {
        Self {
            collection,
            wallet,
            resolver,
            names,
            contract,
            policy,
        }
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Run one command to completion, publishing its events
    pub async fn handle(&self, cmd: RuntimeCommand, evt_tx: &Sender<RuntimeEvent>) {
        let Some(screen) = cmd.screen() else {
            return;
        };
        match cmd {
            RuntimeCommand::FetchCollection { generation } => {
                info!(generation, "loading collection");
                match self.load_collection(generation, evt_tx).await {
                    Ok(items) => {
                        info!(generation, tokens = items.len(), "collection ready");
                        let _ = evt_tx.send(RuntimeEvent::CollectionReady { generation, items });
                    }
                    Err(err) => fail(evt_tx, screen, generation, err),
                }
            }

            RuntimeCommand::FetchLeaderboard { generation } => {
                info!(generation, "loading leaderboard");
                match self.load_leaderboard().await {
                    Ok(holders) => {
                        info!(generation, holders = holders.len(), "leaderboard ready");
                        let pending = unresolved(&self.names, holders.iter().map(|h| h.holder));
                        let _ = evt_tx.send(RuntimeEvent::LeaderboardReady { generation, holders });
                        self.resolve_names(screen, generation, &pending, evt_tx).await;
                    }
                    Err(err) => fail(evt_tx, screen, generation, err),
                }
            }

            RuntimeCommand::FetchOwners { generation, token_id } => {
                info!(generation, token_id = %token_id, "loading token owners");
                match self.load_owners(&token_id).await {
                    Ok(owners) => {
                        info!(generation, owners = owners.len(), "token owners ready");
                        let pending = unresolved(&self.names, owners.iter().map(|o| o.holder));
                        let _ = evt_tx.send(RuntimeEvent::OwnersReady {
                            generation,
                            token_id,
                            owners,
                        });
                        self.resolve_names(screen, generation, &pending, evt_tx).await;
                    }
                    Err(err) => fail(evt_tx, screen, generation, err),
                }
            }

            RuntimeCommand::SearchWallet { generation, input } => {
                info!(generation, input = %input, "searching wallet");
                match self.load_wallet(&input).await {
                    Ok((owner, tokens)) => {
                        info!(generation, tokens = tokens.len(), "wallet ready");
                        let _ = evt_tx.send(RuntimeEvent::WalletReady {
                            generation,
                            owner,
                            tokens,
                        });
                    }
                    Err(err) => fail(evt_tx, screen, generation, err),
                }
            }

            RuntimeCommand::Shutdown => {}
        }
    }

    /// Token cards with holder counts, newest first
    pub async fn load_collection(
        &self,
        generation: u64,
        evt_tx: &Sender<RuntimeEvent>,
    ) -> Result<Vec<TokenItem>> {
        let (tokens, owners) = tokio::try_join!(
            self.collection.tokens_for_contract(self.contract),
            self.collection.owners_for_contract(self.contract),
        )
        .context("Failed to load collection")?;

        let counts = count_holders_by_token(&ownership_records(&owners));
        let items = token_items(&tokens, &counts, |loaded, total| {
            if loaded % PROGRESS_STEP == 0 || loaded == total {
                let _ = evt_tx.send(RuntimeEvent::Progress {
                    screen: Screen::Collection,
                    generation,
                    loaded,
                    total,
                });
            }
        });
        Ok(items)
    }

    /// Holder summaries, biggest first, with already known names filled in
    pub async fn load_leaderboard(&self) -> Result<Vec<HolderSummary>> {
        let owners = self
            .collection
            .owners_for_contract(self.contract)
            .await
            .context("Failed to load holders")?;

        let mut holders = summarize_by_holder(&ownership_records(&owners));
        let known = self.known_names(holders.iter().map(|h| h.holder));
        splice_names(&mut holders, &known);
        Ok(holders)
    }

    /// Owners of one token, with already known names filled in
    pub async fn load_owners(&self, token_id: &str) -> Result<Vec<TokenOwner>> {
        let owners = self
            .collection
            .owners_for_contract(self.contract)
            .await
            .with_context(|| format!("Failed to load owners of token {token_id}"))?;

        let mut rows = owners_of_token(&owners, token_id);
        let known = self.known_names(rows.iter().map(|o| o.holder));
        splice_names(&mut rows, &known);
        Ok(rows)
    }

    /// Wallet lookup by address or by name.
    ///
    /// A name that resolves to nothing yields an empty wallet.
    pub async fn load_wallet(&self, input: &str) -> Result<(WalletOwner, Vec<OwnedToken>)> {
        let input = input.trim();

        let (address, name) = if looks_like_address(input) {
            let Some(address) = parse_address(input) else {
                anyhow::bail!("Invalid address: {input}");
            };
            (Some(address), None)
        } else {
            match self.resolver.resolve_name(input).await {
                Ok(Some(address)) => (Some(address), Some(input.to_string())),
                Ok(None) => {
                    debug!(input, "name does not resolve");
                    (None, None)
                }
                Err(e) => {
                    warn!(input, error = %e, "name resolution failed");
                    (None, None)
                }
            }
        };

        let Some(address) = address else {
            return Ok((
                WalletOwner {
                    input: input.to_string(),
                    address: None,
                    name: None,
                    total_balance: 0,
                },
                Vec::new(),
            ));
        };

        let display_name = async move {
            match name {
                Some(name) => Some(name),
                None => self.names.lookup(address).await,
            }
        };
        let (name, owned) = tokio::join!(
            display_name,
            self.wallet.tokens_for_owner(self.contract, address)
        );
        let owned = owned.context("Failed to load wallet tokens")?;

        let tokens = owned_tokens(&owned);
        let owner = WalletOwner {
            input: input.to_string(),
            address: Some(address),
            name,
            total_balance: total_balance(&tokens),
        };
        Ok((owner, tokens))
    }

    /// Settled cache entries for `addresses`
    fn known_names(&self, addresses: impl Iterator<Item = Address>) -> Vec<(Address, Option<String>)> {
        addresses
            .filter_map(|address| match self.names.peek(&address) {
                CachedName::Resolved(name) => Some((address, name)),
                CachedName::Unresolved => None,
            })
            .collect()
    }

    /// Resolve `pending` in paced batches, publishing each batch, then signal completion
    pub async fn resolve_names(
        &self,
        screen: Screen,
        generation: u64,
        pending: &[Address],
        evt_tx: &Sender<RuntimeEvent>,
    ) {
        let batches = resolve_in_batches(&self.names, self.policy, pending, |names| {
            let _ = evt_tx.send(RuntimeEvent::NamesResolved {
                screen,
                generation,
                names,
            });
        })
        .await;
        debug!(screen = screen.label(), generation, batches, "names complete");
        let _ = evt_tx.send(RuntimeEvent::NamesComplete { screen, generation });
    }
}

fn fail(evt_tx: &Sender<RuntimeEvent>, screen: Screen, generation: u64, err: anyhow::Error) {
    let message = format!("{err:#}");
    warn!(screen = screen.label(), generation, error = %message, "fetch failed");
    let _ = evt_tx.send(RuntimeEvent::Failed {
        screen,
        generation,
        message,
    });
}

/// Run the async worker loop
pub async fn run_async_worker(
    worker: Worker,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    loop {
        // Process commands (non-blocking)
        loop {
            match cmd_rx.try_recv() {
                Ok(RuntimeCommand::Shutdown) => return Ok(()),
                Ok(cmd) => {
                    let worker = worker.clone();
                    let evt_tx = evt_tx.clone();
                    tokio::spawn(async move {
                        worker.handle(cmd, &evt_tx).await;
                    });
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
