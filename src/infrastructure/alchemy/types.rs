//! Alchemy NFT API v3 response shapes and their conversion to domain payloads

use serde::Deserialize;
use serde_json::Value;

use crate::domain::address::parse_address;
use crate::domain::models::{
    Attribute, ContractOwner, ContractToken, ImageUris, OwnedNft, TokenBalance,
};
use crate::infrastructure::error::ProviderError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NftsForContractPage {
    #[serde(default)]
    pub nfts: Vec<RawNft>,
    #[serde(default)]
    pub page_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OwnersForContractPage {
    #[serde(default)]
    pub owners: Vec<RawOwner>,
    #[serde(default)]
    pub page_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NftsForOwnerPage {
    #[serde(default)]
    pub owned_nfts: Vec<RawNft>,
    #[serde(default)]
    pub page_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawNft {
    pub token_id: String,
    #[serde(default, alias = "title")]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<RawImage>,
    #[serde(default)]
    pub raw: Option<RawPayload>,
    #[serde(default)]
    pub balance: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawImage {
    #[serde(default)]
    pub cached_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub original_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPayload {
    // Token metadata is free-form JSON; only `attributes` is read
    #[serde(default)]
    pub metadata: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawOwner {
    pub owner_address: String,
    #[serde(default)]
    pub token_balances: Vec<RawTokenBalance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTokenBalance {
    pub token_id: String,
    #[serde(default)]
    pub balance: Value,
}

impl RawNft {
    pub fn into_contract_token(self) -> ContractToken {
        let image = self.image.unwrap_or_default();
        let attributes = self
            .raw
            .map(|raw| parse_attributes(&raw.metadata))
            .unwrap_or_default();
        ContractToken {
            token_id: self.token_id,
            title: self.name,
            image: ImageUris {
                thumbnail: image.thumbnail_url,
                cached: image.cached_url,
                original: image.original_url,
            },
            attributes,
        }
    }

    pub fn into_owned_nft(self) -> OwnedNft {
        let balance = parse_balance(&self.balance);
        OwnedNft {
            token: self.into_contract_token(),
            balance,
        }
    }
}

impl RawOwner {
    pub fn into_contract_owner(self) -> Result<ContractOwner, ProviderError> {
        let owner = parse_address(&self.owner_address)
            .ok_or_else(|| ProviderError::InvalidAddress(self.owner_address.clone()))?;
        Ok(ContractOwner {
            owner,
            token_balances: self
                .token_balances
                .into_iter()
                .map(|token| TokenBalance {
                    balance: parse_balance(&token.balance),
                    token_id: token.token_id,
                })
                .collect(),
        })
    }
}

/// Balance given as a number, a decimal string or a `0x` hex string.
///
/// Anything else counts as zero.
pub(crate) fn parse_balance(value: &Value) -> u64 {
    match value {
        Value::Number(number) => number.as_u64().unwrap_or(0),
        Value::String(text) => {
            let text = text.trim();
            match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                Some(hex) => u64::from_str_radix(hex, 16).unwrap_or(0),
                None => text.parse::<u64>().unwrap_or(0),
            }
        }
        _ => 0,
    }
}

fn parse_attributes(metadata: &Value) -> Vec<Attribute> {
    let Some(entries) = metadata.get("attributes").and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let trait_type = entry.get("trait_type")?.as_str()?.to_string();
            let value = match entry.get("value")? {
                Value::String(text) => text.clone(),
                Value::Null => return None,
                other => other.to_string(),
            };
            Some(Attribute { trait_type, value })
        })
        .collect()
}
