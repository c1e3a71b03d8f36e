//! ENS lookups over a JSON-RPC endpoint

use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy_primitives::{address, Address, Bytes, B256};
use alloy_sol_types::{sol, SolCall};
use tracing::{debug, trace};

use super::namehash::{namehash, normalize_name, reverse_name};
use crate::infrastructure::error::ResolveError;
use crate::infrastructure::provider::NameResolver;

/// ENS registry, same address on every network that deploys it
pub const ENS_REGISTRY: Address = address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e");

sol! {
    function resolver(bytes32 node) external view returns (address);
    function name(bytes32 node) external view returns (string);
    function addr(bytes32 node) external view returns (address);
}

/// Name resolver backed by the ENS registry on `rpc_url`
pub struct EnsResolver {
    provider: DynProvider,
    endpoint: String,
}

impl EnsResolver {
    pub fn connect(rpc_url: &str) -> Result<Self, ResolveError> {
        let url = rpc_url
            .parse::<reqwest::Url>()
            .map_err(|e| ResolveError::InvalidEndpoint(format!("{rpc_url}: {e}")))?;
        let provider = ProviderBuilder::new().connect_http(url).erased();
        Ok(Self {
            provider,
            endpoint: rpc_url.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn eth_call(&self, to: Address, data: Vec<u8>) -> Result<Bytes, ResolveError> {
        let tx = TransactionRequest::default().to(to).input(Bytes::from(data).into());
        self.provider
            .call(tx)
            .await
            .map_err(|e| ResolveError::Rpc(e.to_string()))
    }

    /// Resolver contract registered for `node`, `None` when unset
    async fn resolver_for(&self, node: B256) -> Result<Option<Address>, ResolveError> {
        let out = self
            .eth_call(ENS_REGISTRY, resolverCall { node }.abi_encode())
            .await?;
        let resolver = resolverCall::abi_decode_returns(&out)
            .map_err(|e| ResolveError::Decode(e.to_string()))?;
        Ok((resolver != Address::ZERO).then_some(resolver))
    }

    async fn forward(&self, normalized: &str) -> Result<Option<Address>, ResolveError> {
        let node = namehash(normalized);
        let Some(resolver) = self.resolver_for(node).await? else {
            return Ok(None);
        };
        let out = self.eth_call(resolver, addrCall { node }.abi_encode()).await?;
        let target = addrCall::abi_decode_returns(&out)
            .map_err(|e| ResolveError::Decode(e.to_string()))?;
        Ok((target != Address::ZERO).then_some(target))
    }
}

#[async_trait::async_trait]
impl NameResolver for EnsResolver {
    async fn lookup_name(&self, address: Address) -> Result<Option<String>, ResolveError> {
        let node = namehash(&reverse_name(&address));
        let Some(resolver) = self.resolver_for(node).await? else {
            trace!(%address, "no reverse resolver");
            return Ok(None);
        };

        let out = self.eth_call(resolver, nameCall { node }.abi_encode()).await?;
        let name = nameCall::abi_decode_returns(&out)
            .map_err(|e| ResolveError::Decode(e.to_string()))?;
        if name.is_empty() {
            return Ok(None);
        }

        // A reverse record only counts when the name points back at the address
        let Ok(normalized) = normalize_name(&name) else {
            return Ok(None);
        };
        match self.forward(&normalized).await? {
            Some(target) if target == address => Ok(Some(name)),
            _ => {
                debug!(%address, name, "reverse record does not verify");
                Ok(None)
            }
        }
    }

    async fn resolve_name(&self, name: &str) -> Result<Option<Address>, ResolveError> {
        let normalized = normalize_name(name)?;
        self.forward(&normalized).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_rejects_bad_url() {
        assert!(matches!(
            EnsResolver::connect("not a url"),
            Err(ResolveError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_registry_call_encoding() {
        let node = namehash("eth");
        let data = resolverCall { node }.abi_encode();
        assert_eq!(&data[..4], resolverCall::SELECTOR.as_slice());
        assert_eq!(&data[4..], node.as_slice());
    }
}
