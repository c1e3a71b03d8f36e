//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - provider contracts and their errors
//! - the Alchemy NFT API client (reqwest)
//! - ENS name resolution over JSON-RPC (alloy)
//! - the Tokio runtime bridge and fetch worker

pub mod alchemy;
pub mod ens;
pub mod error;
pub mod provider;
pub mod runtime;

pub use alchemy::AlchemyClient;
pub use ens::EnsResolver;
pub use error::{ProviderError, ResolveError};
pub use provider::{CollectionProvider, NameResolver, WalletProvider};
