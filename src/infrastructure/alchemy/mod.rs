//! Alchemy NFT API adapter

mod client;
mod types;

pub use client::AlchemyClient;
