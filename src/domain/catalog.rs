//! Turn provider token payloads into display cards

use std::collections::HashMap;
use std::str::FromStr;

use alloy_primitives::U256;

use crate::domain::models::{Attribute, ContractToken, ImageUris, OwnedNft, OwnedToken, TokenItem};

pub const UNKNOWN_DATE: &str = "Unknown Date";
pub const UNKNOWN_TOPIC: &str = "Unknown Topic";

const DATE_TRAIT: &str = "Date";
const TOPIC_TRAIT: &str = "Topic";

/// Numeric value of a token id given in decimal or `0x` hex.
pub fn parse_token_id(token_id: &str) -> Option<U256> {
    U256::from_str(token_id.trim()).ok()
}

/// Decimal rendering of a token id, when it parses.
pub fn decimal_token_id(token_id: &str) -> Option<String> {
    parse_token_id(token_id).map(|value| value.to_string())
}

/// Build one collection card.
pub fn token_item(token: &ContractToken, holder_count: u64) -> TokenItem {
    TokenItem {
        token_id: token.token_id.clone(),
        title: display_title(token),
        image: display_image(&token.image),
        date: attribute(&token.attributes, DATE_TRAIT).unwrap_or_else(|| UNKNOWN_DATE.to_string()),
        topic: attribute(&token.attributes, TOPIC_TRAIT)
            .unwrap_or_else(|| UNKNOWN_TOPIC.to_string()),
        holder_count,
    }
}

/// Build every collection card, newest (highest id) first.
///
/// `on_progress(built, total)` is called after each card.
pub fn token_items<F>(
    tokens: &[ContractToken],
    holder_counts: &HashMap<String, u64>,
    mut on_progress: F,
) -> Vec<TokenItem>
where
    F: FnMut(usize, usize),
{
    let total = tokens.len();
    let mut items = Vec::with_capacity(total);
    for token in tokens {
        let holders = holder_counts.get(&token.token_id).copied().unwrap_or(0);
        items.push(token_item(token, holders));
        on_progress(items.len(), total);
    }
    sort_newest_first(&mut items);
    items
}

pub fn sort_newest_first(items: &mut [TokenItem]) {
    items.sort_by(|a, b| token_id_key(&b.token_id).cmp(&token_id_key(&a.token_id)));
}

/// Wallet cards, lowest id first.
pub fn owned_tokens(nfts: &[OwnedNft]) -> Vec<OwnedToken> {
    let mut tokens: Vec<OwnedToken> = nfts
        .iter()
        .map(|nft| OwnedToken {
            token_id: nft.token.token_id.clone(),
            title: display_title(&nft.token),
            image: display_image(&nft.token.image),
            date: attribute(&nft.token.attributes, DATE_TRAIT)
                .unwrap_or_else(|| UNKNOWN_DATE.to_string()),
            topic: attribute(&nft.token.attributes, TOPIC_TRAIT)
                .unwrap_or_else(|| UNKNOWN_TOPIC.to_string()),
            balance: nft.balance,
        })
        .collect();
    tokens.sort_by(|a, b| token_id_key(&a.token_id).cmp(&token_id_key(&b.token_id)));
    tokens
}

pub fn total_balance(tokens: &[OwnedToken]) -> u64 {
    tokens
        .iter()
        .fold(0u64, |acc, token| acc.saturating_add(token.balance))
}

// Ids that do not parse sort as zero
fn token_id_key(token_id: &str) -> U256 {
    parse_token_id(token_id).unwrap_or(U256::ZERO)
}

fn display_title(token: &ContractToken) -> String {
    token
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Token #{}", token.token_id))
}

fn display_image(image: &ImageUris) -> Option<String> {
    [&image.thumbnail, &image.cached, &image.original]
        .into_iter()
        .flatten()
        .find(|uri| !uri.trim().is_empty())
        .cloned()
}

fn attribute(attributes: &[Attribute], trait_type: &str) -> Option<String> {
    attributes
        .iter()
        .find(|attr| attr.trait_type == trait_type)
        .map(|attr| attr.value.clone())
}
