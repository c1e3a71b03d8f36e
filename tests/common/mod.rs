//! In-memory providers shared by the integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::{address, Address};

use mintscope::domain::{
    Attribute, ContractOwner, ContractToken, ImageUris, OwnedNft, TokenBalance,
};
use mintscope::infrastructure::runtime::{BatchPolicy, Worker};
use mintscope::infrastructure::{
    CollectionProvider, NameResolver, ProviderError, ResolveError, WalletProvider,
};
use mintscope::store::NameCache;

pub const CONTRACT: Address = address!("c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0");

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn token(token_id: &str, title: &str, date: &str) -> ContractToken {
    ContractToken {
        token_id: token_id.to_string(),
        title: Some(title.to_string()),
        image: ImageUris {
            thumbnail: Some(format!("https://img/{token_id}.png")),
            cached: None,
            original: None,
        },
        attributes: vec![Attribute {
            trait_type: "Date".into(),
            value: date.to_string(),
        }],
    }
}

pub fn owner(holder: Address, balances: &[(&str, u64)]) -> ContractOwner {
    ContractOwner {
        owner: holder,
        token_balances: balances
            .iter()
            .map(|(token_id, balance)| TokenBalance {
                token_id: token_id.to_string(),
                balance: *balance,
            })
            .collect(),
    }
}

#[derive(Default)]
pub struct FakeCollection {
    pub tokens: Vec<ContractToken>,
    pub owners: Vec<ContractOwner>,
    pub fail_owners: AtomicBool,
    pub owner_calls: AtomicUsize,
}

#[async_trait::async_trait]
impl CollectionProvider for FakeCollection {
    async fn tokens_for_contract(&self, _contract: Address) -> Result<Vec<ContractToken>, ProviderError> {
        Ok(self.tokens.clone())
    }

    async fn owners_for_contract(&self, _contract: Address) -> Result<Vec<ContractOwner>, ProviderError> {
        self.owner_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_owners.load(Ordering::SeqCst) {
            return Err(ProviderError::Status {
                status: 503,
                body: "upstream unavailable".into(),
            });
        }
        Ok(self.owners.clone())
    }
}

#[derive(Default)]
pub struct FakeWallet {
    pub holdings: HashMap<Address, Vec<OwnedNft>>,
}

#[async_trait::async_trait]
impl WalletProvider for FakeWallet {
    async fn tokens_for_owner(
        &self,
        _contract: Address,
        owner: Address,
    ) -> Result<Vec<OwnedNft>, ProviderError> {
        Ok(self.holdings.get(&owner).cloned().unwrap_or_default())
    }
}

/// Name resolver that records every reverse lookup
#[derive(Default)]
pub struct FakeResolver {
    pub names: HashMap<Address, String>,
    pub failing: Vec<Address>,
    pub delay: Duration,
    pub lookups: Mutex<Vec<Address>>,
    /// Shared with the test to interleave lookups with other markers
    pub log: Option<Arc<Mutex<Vec<String>>>>,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeResolver {
    pub fn with_names(names: &[(Address, &str)]) -> Self {
        Self {
            names: names.iter().map(|(a, n)| (*a, n.to_string())).collect(),
            ..Self::default()
        }
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl NameResolver for FakeResolver {
    async fn lookup_name(&self, address: Address) -> Result<Option<String>, ResolveError> {
        self.lookups.lock().unwrap().push(address);
        if let Some(log) = &self.log {
            log.lock().unwrap().push(format!("lookup {}", address.as_slice()[0]));
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&address) {
            return Err(ResolveError::Rpc("connection reset".into()));
        }
        Ok(self.names.get(&address).cloned())
    }

    async fn resolve_name(&self, name: &str) -> Result<Option<Address>, ResolveError> {
        Ok(self
            .names
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(address, _)| *address))
    }
}

pub fn fast_policy() -> BatchPolicy {
    BatchPolicy::new(5, Duration::from_millis(5))
}

pub fn worker(
    collection: Arc<FakeCollection>,
    wallet: Arc<FakeWallet>,
    resolver: Arc<FakeResolver>,
    policy: BatchPolicy,
) -> (Worker, Arc<NameCache>) {
    let names = Arc::new(NameCache::new(resolver.clone()));
    let worker = Worker::new(collection, wallet, resolver, names.clone(), CONTRACT, policy);
    (worker, names)
}
