//! Provider contracts
//!
//! These traits are the only way the rest of the crate talks to the outside
//! world. Payloads are already typed and validated when they cross them.

use alloy_primitives::Address;

use crate::domain::models::{ContractOwner, ContractToken, OwnedNft};
use crate::infrastructure::error::{ProviderError, ResolveError};

/// Read access to one NFT contract
#[async_trait::async_trait]
pub trait CollectionProvider: Send + Sync + 'static {
    /// Every token of the contract with its metadata
    async fn tokens_for_contract(&self, contract: Address) -> Result<Vec<ContractToken>, ProviderError>;

    /// Every holder of the contract with per-token balances
    async fn owners_for_contract(&self, contract: Address) -> Result<Vec<ContractOwner>, ProviderError>;
}

/// Read access to a wallet's holdings
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync + 'static {
    /// Tokens of `contract` held by `owner`
    async fn tokens_for_owner(
        &self,
        contract: Address,
        owner: Address,
    ) -> Result<Vec<OwnedNft>, ProviderError>;
}

/// Human-readable names for addresses, both directions
#[async_trait::async_trait]
pub trait NameResolver: Send + Sync + 'static {
    /// Primary name of `address`, `None` when it has none
    async fn lookup_name(&self, address: Address) -> Result<Option<String>, ResolveError>;

    /// Address a name points to, `None` when unset
    async fn resolve_name(&self, name: &str) -> Result<Option<Address>, ResolveError>;
}
