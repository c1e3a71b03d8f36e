//! JSON Export

use std::fs::File;
use std::io::Write;
use std::path::Path;

use alloy_primitives::Address;
use serde::Serialize;

use crate::domain::address::format_address;
use crate::domain::links::{opensea_url, polygonscan_url};
use crate::domain::models::{HolderSummary, TokenItem, TokenOwner};

#[derive(Serialize)]
struct ExportableBalance<'a> {
    token_id: &'a str,
    balance: u64,
}

#[derive(Serialize)]
struct ExportableHolder<'a> {
    rank: usize,
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    total_count: u64,
    tokens: Vec<ExportableBalance<'a>>,
    polygonscan: String,
}

#[derive(Serialize)]
struct ExportableToken<'a> {
    token_id: &'a str,
    title: &'a str,
    date: &'a str,
    topic: &'a str,
    holders: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
    opensea: String,
}

#[derive(Serialize)]
struct ExportableOwner<'a> {
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    balance: u64,
}

fn write_json<T: Serialize>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(rows)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

pub fn write_holders(path: &Path, holders: &[&HolderSummary]) -> anyhow::Result<usize> {
    let rows: Vec<ExportableHolder> = holders
        .iter()
        .enumerate()
        .map(|(index, holder)| ExportableHolder {
            rank: index + 1,
            address: format_address(&holder.holder),
            name: holder.name.as_deref(),
            total_count: holder.total_count,
            tokens: holder
                .token_balances
                .iter()
                .map(|t| ExportableBalance {
                    token_id: &t.token_id,
                    balance: t.balance,
                })
                .collect(),
            polygonscan: polygonscan_url(&holder.holder),
        })
        .collect();
    write_json(path, &rows)?;
    Ok(rows.len())
}

pub fn write_tokens(path: &Path, contract: &Address, tokens: &[&TokenItem]) -> anyhow::Result<usize> {
    let rows: Vec<ExportableToken> = tokens
        .iter()
        .map(|token| ExportableToken {
            token_id: &token.token_id,
            title: &token.title,
            date: &token.date,
            topic: &token.topic,
            holders: token.holder_count,
            image: token.image.as_deref(),
            opensea: opensea_url(contract, &token.token_id),
        })
        .collect();
    write_json(path, &rows)?;
    Ok(rows.len())
}

pub fn write_owners(path: &Path, owners: &[&TokenOwner]) -> anyhow::Result<usize> {
    let rows: Vec<ExportableOwner> = owners
        .iter()
        .map(|owner| ExportableOwner {
            address: format_address(&owner.holder),
            name: owner.name.as_deref(),
            balance: owner.balance,
        })
        .collect();
    write_json(path, &rows)?;
    Ok(rows.len())
}
