//! ENS name hashing

use alloy_primitives::{keccak256, Address, B256};

use crate::infrastructure::error::ResolveError;

/// Reverse registrar suffix
pub const REVERSE_SUFFIX: &str = "addr.reverse";

/// Lowercase, trim and check the name has no empty labels.
///
/// Full UTS-46 normalization is not applied; names with non-ASCII labels
/// are hashed as given after lowercasing.
pub fn normalize_name(name: &str) -> Result<String, ResolveError> {
    let name = name.trim().to_lowercase();
    if name.is_empty() || name.split('.').any(str::is_empty) {
        return Err(ResolveError::InvalidName(name));
    }
    Ok(name)
}

/// EIP-137 namehash of an already normalized name
pub fn namehash(name: &str) -> B256 {
    if name.is_empty() {
        return B256::ZERO;
    }
    name.rsplit('.').fold(B256::ZERO, |node, label| {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(keccak256(label.as_bytes()).as_slice());
        keccak256(buf)
    })
}

/// `<hex>.addr.reverse` node name for `address`
pub fn reverse_name(address: &Address) -> String {
    format!("{}.{}", hex::encode(address.as_slice()), REVERSE_SUFFIX)
}
