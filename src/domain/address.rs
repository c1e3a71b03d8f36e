//! Address parsing and canonical formatting

use alloy_primitives::Address;

/// True when the input is meant as a hex address rather than a name.
pub fn looks_like_address(input: &str) -> bool {
    let trimmed = input.trim();
    trimmed.starts_with("0x") || trimmed.starts_with("0X")
}

/// Parse a `0x`-prefixed, 40 hex digit address in any letter case.
pub fn parse_address(input: &str) -> Option<Address> {
    let trimmed = input.trim();
    let payload = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))?;
    if payload.len() != 40 || !payload.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let bytes = hex::decode(payload).ok()?;
    Some(Address::from_slice(&bytes))
}

/// Canonical textual form: lowercase hex with `0x`.
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}

pub fn short_addr(address: &Address) -> String {
    let full = format_address(address);
    format!("{}..{}", &full[..6], &full[full.len() - 4..])
}
