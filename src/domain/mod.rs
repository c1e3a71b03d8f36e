//! Domain layer - collection models and the pure transforms over them
//!
//! Nothing here performs I/O:
//! - `models`: provider payloads and view rows
//! - `aggregate`: holder counts and per-holder totals
//! - `catalog`: provider tokens to display cards
//! - `search`: filtering and pagination

pub mod address;
pub mod aggregate;
pub mod catalog;
pub mod links;
pub mod models;
pub mod search;

pub use address::{format_address, looks_like_address, parse_address, short_addr};
pub use aggregate::SortDirection;
pub use models::{
    Attribute, ContractOwner, ContractToken, HolderSummary, ImageUris, OwnedNft, OwnedToken,
    OwnershipRecord, TokenBalance, TokenItem, TokenOwner, WalletOwner,
};
pub use search::{PageView, Query, PAGE_SIZE_OPTIONS};
