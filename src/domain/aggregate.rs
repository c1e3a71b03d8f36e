//! Ownership aggregation: holder counts per token, balances per holder

use std::collections::HashMap;

use alloy_primitives::Address;

use crate::domain::models::{
    ContractOwner, HolderSummary, NamedHolder, OwnershipRecord, TokenBalance, TokenOwner,
};

/// Leaderboard ordering on the total count column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Descending,
    Ascending,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Descending => SortDirection::Ascending,
            SortDirection::Ascending => SortDirection::Descending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Descending => "▼",
            SortDirection::Ascending => "▲",
        }
    }
}

/// Flatten provider owners into one record per (holder, token) balance entry.
pub fn ownership_records(owners: &[ContractOwner]) -> Vec<OwnershipRecord> {
    owners
        .iter()
        .flat_map(|owner| {
            owner.token_balances.iter().map(move |token| OwnershipRecord {
                holder: owner.owner,
                token_id: token.token_id.clone(),
                balance: token.balance,
            })
        })
        .collect()
}

/// Number of holder entries per token id.
///
/// Every record counts once, so a holder listed twice for the same token is
/// counted twice.
pub fn count_holders_by_token(records: &[OwnershipRecord]) -> HashMap<String, u64> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for record in records {
        *counts.entry(record.token_id.clone()).or_insert(0) += 1;
    }
    counts
}

/// Per-holder totals sorted by total count, largest first.
///
/// Holders with equal totals keep the order in which they first appeared.
pub fn summarize_by_holder(records: &[OwnershipRecord]) -> Vec<HolderSummary> {
    let mut index: HashMap<Address, usize> = HashMap::new();
    let mut summaries: Vec<HolderSummary> = Vec::new();

    for record in records {
        let slot = *index.entry(record.holder).or_insert_with(|| {
            summaries.push(HolderSummary {
                holder: record.holder,
                total_count: 0,
                token_balances: Vec::new(),
                name: None,
            });
            summaries.len() - 1
        });
        let summary = &mut summaries[slot];
        summary.total_count = summary.total_count.saturating_add(record.balance);
        summary.token_balances.push(TokenBalance {
            token_id: record.token_id.clone(),
            balance: record.balance,
        });
    }

    sort_holders(&mut summaries, SortDirection::Descending);
    summaries
}

/// Stable sort on total count.
pub fn sort_holders(holders: &mut [HolderSummary], direction: SortDirection) {
    match direction {
        SortDirection::Descending => holders.sort_by(|a, b| b.total_count.cmp(&a.total_count)),
        SortDirection::Ascending => holders.sort_by(|a, b| a.total_count.cmp(&b.total_count)),
    }
}

/// Owners holding `token_id`, in provider order, with that token's balance.
pub fn owners_of_token(owners: &[ContractOwner], token_id: &str) -> Vec<TokenOwner> {
    owners
        .iter()
        .filter_map(|owner| {
            owner
                .token_balances
                .iter()
                .find(|token| token.token_id == token_id)
                .map(|token| TokenOwner {
                    holder: owner.owner,
                    balance: token.balance,
                    name: None,
                })
        })
        .collect()
}

/// Write resolved names into the rows they belong to, matched by address.
///
/// Returns how many rows were updated.
pub fn splice_names<T: NamedHolder>(rows: &mut [T], names: &[(Address, Option<String>)]) -> usize {
    if names.is_empty() {
        return 0;
    }
    let lookup: HashMap<&Address, &Option<String>> =
        names.iter().map(|(address, name)| (address, name)).collect();
    let mut updated = 0;
    for row in rows.iter_mut() {
        if let Some(name) = lookup.get(&row.holder()) {
            row.set_name((*name).clone());
            updated += 1;
        }
    }
    updated
}
