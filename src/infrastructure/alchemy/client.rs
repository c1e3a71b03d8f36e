//! Alchemy NFT API v3 client
//!
//! Every listing endpoint is cursor-paginated through `pageKey`; the client
//! follows the cursor until the provider stops returning one.

use std::time::Duration;

use alloy_primitives::Address;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use super::types::{NftsForContractPage, NftsForOwnerPage, OwnersForContractPage, RawNft};
use crate::domain::address::format_address;
use crate::domain::models::{ContractOwner, ContractToken, OwnedNft};
use crate::infrastructure::error::ProviderError;
use crate::infrastructure::provider::{CollectionProvider, WalletProvider};

const PAGE_LIMIT: &str = "100";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for one Alchemy network
#[derive(Clone)]
pub struct AlchemyClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AlchemyClient {
    /// Client for `https://{network}.g.alchemy.com`
    pub fn new(network: &str, api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_base_url(format!("https://{network}.g.alchemy.com"), api_key)
    }

    /// Client against an explicit base URL (proxies, local mocks)
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/nft/v3/{}/{}", self.base_url, self.api_key, method)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        method: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        trace!(method, params = query.len(), "alchemy request");
        let response = self.http.get(self.endpoint(method)).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ProviderError::Decode(format!("{method}: {e}")))
    }
}

#[async_trait::async_trait]
impl CollectionProvider for AlchemyClient {
    async fn tokens_for_contract(&self, contract: Address) -> Result<Vec<ContractToken>, ProviderError> {
        let mut tokens = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut query = vec![
                ("contractAddress", format_address(&contract)),
                ("withMetadata", "true".to_string()),
                ("limit", PAGE_LIMIT.to_string()),
            ];
            if let Some(key) = cursor.take() {
                query.push(("startToken", key));
            }

            let page: NftsForContractPage = self.get_json("getNFTsForContract", &query).await?;
            tokens.extend(page.nfts.into_iter().map(RawNft::into_contract_token));

            match page.page_key {
                Some(key) if !key.is_empty() => cursor = Some(key),
                _ => break,
            }
        }
        debug!(count = tokens.len(), "fetched contract tokens");
        Ok(tokens)
    }

    async fn owners_for_contract(&self, contract: Address) -> Result<Vec<ContractOwner>, ProviderError> {
        let mut owners = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut query = vec![
                ("contractAddress", format_address(&contract)),
                ("withTokenBalances", "true".to_string()),
            ];
            if let Some(key) = cursor.take() {
                query.push(("pageKey", key));
            }

            let page: OwnersForContractPage = self.get_json("getOwnersForContract", &query).await?;
            for raw in page.owners {
                owners.push(raw.into_contract_owner()?);
            }

            match page.page_key {
                Some(key) if !key.is_empty() => cursor = Some(key),
                _ => break,
            }
        }
        debug!(count = owners.len(), "fetched contract owners");
        Ok(owners)
    }
}

#[async_trait::async_trait]
impl WalletProvider for AlchemyClient {
    async fn tokens_for_owner(
        &self,
        contract: Address,
        owner: Address,
    ) -> Result<Vec<OwnedNft>, ProviderError> {
        let mut owned = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut query = vec![
                ("owner", format_address(&owner)),
                ("contractAddresses[]", format_address(&contract)),
                ("withMetadata", "true".to_string()),
                ("pageSize", PAGE_LIMIT.to_string()),
            ];
            if let Some(key) = cursor.take() {
                query.push(("pageKey", key));
            }

            let page: NftsForOwnerPage = self.get_json("getNFTsForOwner", &query).await?;
            owned.extend(page.owned_nfts.into_iter().map(RawNft::into_owned_nft));

            match page.page_key {
                Some(key) if !key.is_empty() => cursor = Some(key),
                _ => break,
            }
        }
        debug!(count = owned.len(), "fetched wallet tokens");
        Ok(owned)
    }
}
