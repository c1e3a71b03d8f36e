//! Collection data model
//!
//! Two groups of types live here:
//! - typed provider payloads (`ContractToken`, `ContractOwner`, `OwnedNft`),
//!   parsed once at the provider boundary
//! - derived view data (`TokenItem`, `HolderSummary`, `TokenOwner`, `OwnedToken`),
//!   rebuilt from scratch on every fetch

use alloy_primitives::Address;

/// Image URIs as reported by the provider, best first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageUris {
    pub thumbnail: Option<String>,
    pub cached: Option<String>,
    pub original: Option<String>,
}

/// Metadata attribute (`trait_type` / `value`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub trait_type: String,
    pub value: String,
}

/// One token of the contract as returned by the collection provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractToken {
    pub token_id: String,
    pub title: Option<String>,
    pub image: ImageUris,
    pub attributes: Vec<Attribute>,
}

/// Balance of one token id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalance {
    pub token_id: String,
    pub balance: u64,
}

/// One holder of the contract with every token they hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractOwner {
    pub owner: Address,
    pub token_balances: Vec<TokenBalance>,
}

/// A token held by a wallet, with the wallet's balance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedNft {
    pub token: ContractToken,
    pub balance: u64,
}

/// Flat (holder, token, balance) row consumed by the aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipRecord {
    pub holder: Address,
    pub token_id: String,
    pub balance: u64,
}

/// Card shown in the collection grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenItem {
    pub token_id: String,
    pub title: String,
    pub image: Option<String>,
    pub date: String,
    pub topic: String,
    pub holder_count: u64,
}

/// Leaderboard row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolderSummary {
    pub holder: Address,
    pub total_count: u64,
    pub token_balances: Vec<TokenBalance>,
    pub name: Option<String>,
}

/// Holder of one specific token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenOwner {
    pub holder: Address,
    pub balance: u64,
    pub name: Option<String>,
}

/// Card shown in the wallet view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedToken {
    pub token_id: String,
    pub title: String,
    pub image: Option<String>,
    pub date: String,
    pub topic: String,
    pub balance: u64,
}

/// Who a wallet search landed on.
///
/// `address` is `None` when the input was a name that resolved to nothing;
/// that is an empty result, not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletOwner {
    pub input: String,
    pub address: Option<Address>,
    pub name: Option<String>,
    pub total_balance: u64,
}

/// Rows that carry a holder address and an optional resolved name.
pub trait NamedHolder {
    fn holder(&self) -> Address;
    fn set_name(&mut self, name: Option<String>);
}

impl NamedHolder for HolderSummary {
    fn holder(&self) -> Address {
        self.holder
    }

    fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }
}

impl NamedHolder for TokenOwner {
    fn holder(&self) -> Address {
        self.holder
    }

    fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }
}
