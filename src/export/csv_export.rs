//! CSV Export

use std::path::Path;

use alloy_primitives::Address;

use crate::domain::address::format_address;
use crate::domain::links::{opensea_url, polygonscan_url};
use crate::domain::models::{HolderSummary, TokenItem, TokenOwner};

pub fn write_holders(path: &Path, holders: &[&HolderSummary]) -> anyhow::Result<usize> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["rank", "address", "name", "total_count", "tokens", "polygonscan"])?;

    for (index, holder) in holders.iter().enumerate() {
        let tokens = holder
            .token_balances
            .iter()
            .map(|t| format!("{}:{}", t.token_id, t.balance))
            .collect::<Vec<_>>()
            .join(" ");
        wtr.write_record([
            (index + 1).to_string(),
            format_address(&holder.holder),
            holder.name.clone().unwrap_or_default(),
            holder.total_count.to_string(),
            tokens,
            polygonscan_url(&holder.holder),
        ])?;
    }

    wtr.flush()?;
    Ok(holders.len())
}

pub fn write_tokens(path: &Path, contract: &Address, tokens: &[&TokenItem]) -> anyhow::Result<usize> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["token_id", "title", "date", "topic", "holders", "image", "opensea"])?;

    for token in tokens {
        wtr.write_record([
            token.token_id.clone(),
            token.title.clone(),
            token.date.clone(),
            token.topic.clone(),
            token.holder_count.to_string(),
            token.image.clone().unwrap_or_default(),
            opensea_url(contract, &token.token_id),
        ])?;
    }

    wtr.flush()?;
    Ok(tokens.len())
}

pub fn write_owners(path: &Path, owners: &[&TokenOwner]) -> anyhow::Result<usize> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["address", "name", "balance"])?;

    for owner in owners {
        wtr.write_record([
            format_address(&owner.holder),
            owner.name.clone().unwrap_or_default(),
            owner.balance.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(owners.len())
}
